//! Backend en memoria
//!
//! Tablas en `HashMap` detrás de un `RwLock` de tokio. Se usa en desarrollo
//! (`STORE_BACKEND=memory`) y en los tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{missed_vehicle_write, FleetStore};
use crate::models::backup::{Backup, BackupSummary};
use crate::models::fuel_log::FuelLog;
use crate::models::maintenance::MaintenanceLog;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Default)]
struct Tables {
    vehicles: HashMap<String, Vehicle>,
    fuel_logs: Vec<FuelLog>,
    maintenance: Vec<MaintenanceLog>,
    backups: Vec<Backup>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    /// Fuerza el fallo de la tabla backups (tests de rutas best-effort)
    backups_offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variante cuya tabla backups rechaza las escrituras
    pub fn with_backups_offline() -> Self {
        Self {
            backups_offline: true,
            ..Self::default()
        }
    }
}

fn matches_plate(row_plate: &str, plate: Option<&str>) -> bool {
    plate.map_or(true, |p| p == row_plate)
}

#[async_trait]
impl FleetStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let tables = self.tables.read().await;
        let mut vehicles: Vec<Vehicle> = tables.vehicles.values().cloned().collect();
        vehicles.sort_by(|a, b| a.plate.cmp(&b.plate));
        Ok(vehicles)
    }

    async fn find_vehicle(&self, plate: &str) -> AppResult<Option<Vehicle>> {
        Ok(self.tables.read().await.vehicles.get(plate).cloned())
    }

    async fn find_vehicle_by_driver(&self, driver: &str) -> AppResult<Option<Vehicle>> {
        let tables = self.tables.read().await;
        let mut matches: Vec<&Vehicle> = tables
            .vehicles
            .values()
            .filter(|v| v.is_driven_by(driver))
            .collect();
        matches.sort_by(|a, b| a.plate.cmp(&b.plate));
        Ok(matches.first().map(|v| (*v).clone()))
    }

    async fn upsert_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        tables.vehicles.insert(vehicle.plate.clone(), vehicle.clone());
        Ok(vehicle.clone())
    }

    async fn update_vehicle(&self, vehicle: &Vehicle, expected_version: i64) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        let current = tables
            .vehicles
            .get_mut(&vehicle.plate)
            .ok_or_else(|| missed_vehicle_write(&vehicle.plate, false))?;
        if current.version != expected_version {
            return Err(missed_vehicle_write(&vehicle.plate, true));
        }
        *current = vehicle.clone();
        Ok(vehicle.clone())
    }

    async fn delete_vehicle(&self, plate: &str) -> AppResult<bool> {
        Ok(self.tables.write().await.vehicles.remove(plate).is_some())
    }

    async fn list_fuel_logs(&self, plate: Option<&str>) -> AppResult<Vec<FuelLog>> {
        let tables = self.tables.read().await;
        Ok(tables
            .fuel_logs
            .iter()
            .filter(|l| matches_plate(&l.plate, plate))
            .cloned()
            .collect())
    }

    async fn find_fuel_log(&self, id: Uuid) -> AppResult<Option<FuelLog>> {
        let tables = self.tables.read().await;
        Ok(tables.fuel_logs.iter().find(|l| l.id == id).cloned())
    }

    async fn insert_fuel_log(&self, log: &FuelLog) -> AppResult<FuelLog> {
        self.tables.write().await.fuel_logs.push(log.clone());
        Ok(log.clone())
    }

    async fn update_fuel_log(&self, log: &FuelLog) -> AppResult<FuelLog> {
        let mut tables = self.tables.write().await;
        let row = tables
            .fuel_logs
            .iter_mut()
            .find(|l| l.id == log.id)
            .ok_or_else(|| not_found_error("Fuel log", &log.id.to_string()))?;
        *row = log.clone();
        Ok(log.clone())
    }

    async fn delete_fuel_logs(&self, plate: Option<&str>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.fuel_logs.len();
        tables.fuel_logs.retain(|l| !matches_plate(&l.plate, plate));
        Ok((before - tables.fuel_logs.len()) as u64)
    }

    async fn list_maintenance(&self, plate: Option<&str>) -> AppResult<Vec<MaintenanceLog>> {
        let tables = self.tables.read().await;
        Ok(tables
            .maintenance
            .iter()
            .filter(|m| matches_plate(&m.plate, plate))
            .cloned()
            .collect())
    }

    async fn insert_maintenance(&self, log: &MaintenanceLog) -> AppResult<MaintenanceLog> {
        self.tables.write().await.maintenance.push(log.clone());
        Ok(log.clone())
    }

    async fn delete_maintenance(&self, plate: Option<&str>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.maintenance.len();
        tables.maintenance.retain(|m| !matches_plate(&m.plate, plate));
        Ok((before - tables.maintenance.len()) as u64)
    }

    async fn insert_backup(&self, backup: &Backup) -> AppResult<BackupSummary> {
        if self.backups_offline {
            return Err(AppError::Store("backups table unavailable".to_string()));
        }
        self.tables.write().await.backups.push(backup.clone());
        Ok(BackupSummary::from(backup))
    }

    async fn list_backups(&self) -> AppResult<Vec<BackupSummary>> {
        let tables = self.tables.read().await;
        let mut backups: Vec<BackupSummary> = tables.backups.iter().map(BackupSummary::from).collect();
        backups.sort_by(|a, b| b.backup_date.cmp(&a.backup_date));
        Ok(backups)
    }
}
