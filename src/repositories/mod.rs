//! Acceso al store de la flota
//!
//! `FleetStore` define las operaciones fila a fila sobre las tablas
//! vehicles, fuel_logs, maintenance_logs y backups. Hay tres backends:
//! PostgREST remoto (por defecto), PostgreSQL directo con sqlx y memoria.
//!
//! Las escrituras de vehículos son condicionales a la `version` leída:
//! si otra sesión escribió antes, el backend devuelve `AppError::Conflict`.

pub mod memory_store;
pub mod postgres_store;
pub mod rest_store;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::backup::{Backup, BackupSummary};
use crate::models::fuel_log::FuelLog;
use crate::models::maintenance::MaintenanceLog;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{not_found_error, stale_write_error, AppError, AppResult};

pub use memory_store::MemoryStore;
pub use postgres_store::PostgresStore;
pub use rest_store::RestStore;

#[async_trait]
pub trait FleetStore: Send + Sync {
    /// Nombre corto del backend para logs
    fn backend_name(&self) -> &'static str;

    // --- vehicles ---
    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>>;
    async fn find_vehicle(&self, plate: &str) -> AppResult<Option<Vehicle>>;
    async fn find_vehicle_by_driver(&self, driver: &str) -> AppResult<Option<Vehicle>>;
    /// Inserta o reemplaza la fila completa de la matrícula
    async fn upsert_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle>;
    /// Escribe `vehicle` solo si la fila sigue en `expected_version`
    async fn update_vehicle(&self, vehicle: &Vehicle, expected_version: i64) -> AppResult<Vehicle>;
    /// Devuelve true si existía la fila
    async fn delete_vehicle(&self, plate: &str) -> AppResult<bool>;

    // --- fuel_logs ---
    async fn list_fuel_logs(&self, plate: Option<&str>) -> AppResult<Vec<FuelLog>>;
    async fn find_fuel_log(&self, id: Uuid) -> AppResult<Option<FuelLog>>;
    async fn insert_fuel_log(&self, log: &FuelLog) -> AppResult<FuelLog>;
    async fn update_fuel_log(&self, log: &FuelLog) -> AppResult<FuelLog>;
    /// Borra los registros de una matrícula, o todos con `None`
    async fn delete_fuel_logs(&self, plate: Option<&str>) -> AppResult<u64>;

    // --- maintenance_logs ---
    async fn list_maintenance(&self, plate: Option<&str>) -> AppResult<Vec<MaintenanceLog>>;
    async fn insert_maintenance(&self, log: &MaintenanceLog) -> AppResult<MaintenanceLog>;
    async fn delete_maintenance(&self, plate: Option<&str>) -> AppResult<u64>;

    // --- backups ---
    async fn insert_backup(&self, backup: &Backup) -> AppResult<BackupSummary>;
    async fn list_backups(&self) -> AppResult<Vec<BackupSummary>>;
}

/// Error de un `UPDATE` condicional que no tocó ninguna fila: la versión
/// cambió si la matrícula sigue existiendo, o la fila ya fue borrada.
pub(crate) fn missed_vehicle_write(plate: &str, still_exists: bool) -> AppError {
    if still_exists {
        stale_write_error("Vehicle", plate)
    } else {
        not_found_error("Vehicle", plate)
    }
}
