//! Middleware del sistema
//!
//! Este módulo contiene la extracción de la sesión, los guards de rol,
//! CORS y rate limiting.

pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::{require_manager, require_vehicle_access};
pub use cors::cors_layer;
pub use rate_limit::{login_rate_limit, RateLimitState};
