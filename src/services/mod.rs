//! Services module
//!
//! Este módulo contiene la lógica de negocio que no depende de HTTP:
//! autenticación, tokens, cálculos derivados, exportación y copias.

pub mod auth_service;
pub mod backup_service;
pub mod derivation;
pub mod export_service;
pub mod jwt_service;
pub mod snapshot_service;

pub use auth_service::{AuthService, ManagerCredentials};
pub use jwt_service::JwtService;
