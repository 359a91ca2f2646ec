//! Controllers
//!
//! Cada controller recibe el store compartido y aplica las reglas de
//! negocio de su recurso. Los permisos se comprueban antes, en las rutas.

pub mod backup_controller;
pub mod log_controller;
pub mod report_controller;
pub mod vehicle_controller;

pub use backup_controller::BackupController;
pub use log_controller::LogController;
pub use report_controller::ReportController;
pub use vehicle_controller::VehicleController;
