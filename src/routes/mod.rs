pub mod auth_routes;
pub mod backup_routes;
pub mod log_routes;
pub mod report_routes;
pub mod vehicle_routes;
