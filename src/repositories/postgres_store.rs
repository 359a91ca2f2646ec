use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{missed_vehicle_write, FleetStore};
use crate::models::backup::{Backup, BackupSummary};
use crate::models::fuel_log::FuelLog;
use crate::models::maintenance::MaintenanceLog;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{AppError, AppResult};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> AppError {
    tracing::error!("❌ {}: {}", context, e);
    AppError::Database(e)
}

#[async_trait]
impl FleetStore for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY plate")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Error listing vehicles", e))
    }

    async fn find_vehicle(&self, plate: &str) -> AppResult<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE plate = $1")
            .bind(plate)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding vehicle", e))
    }

    async fn find_vehicle_by_driver(&self, driver: &str) -> AppResult<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE UPPER(TRIM(driver)) = UPPER(TRIM($1)) ORDER BY plate LIMIT 1",
        )
        .bind(driver)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error finding vehicle by driver", e))
    }

    async fn upsert_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (plate, driver, odo, trip_km, fuel_liters, location, last_updated, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (plate) DO UPDATE
            SET driver = EXCLUDED.driver, odo = EXCLUDED.odo, trip_km = EXCLUDED.trip_km,
                fuel_liters = EXCLUDED.fuel_liters, location = EXCLUDED.location,
                last_updated = EXCLUDED.last_updated, version = EXCLUDED.version
            RETURNING *
            "#,
        )
        .bind(&vehicle.plate)
        .bind(&vehicle.driver)
        .bind(vehicle.odo)
        .bind(vehicle.trip_start_odo)
        .bind(vehicle.fuel_liters)
        .bind(&vehicle.location)
        .bind(vehicle.last_updated)
        .bind(vehicle.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error upserting vehicle", e))
    }

    async fn update_vehicle(&self, vehicle: &Vehicle, expected_version: i64) -> AppResult<Vehicle> {
        let updated = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET driver = $2, odo = $3, trip_km = $4, fuel_liters = $5, location = $6,
                last_updated = $7, version = $8
            WHERE plate = $1 AND version = $9
            RETURNING *
            "#,
        )
        .bind(&vehicle.plate)
        .bind(&vehicle.driver)
        .bind(vehicle.odo)
        .bind(vehicle.trip_start_odo)
        .bind(vehicle.fuel_liters)
        .bind(&vehicle.location)
        .bind(vehicle.last_updated)
        .bind(vehicle.version)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating vehicle", e))?;

        match updated {
            Some(updated) => Ok(updated),
            None => {
                let still_exists = self.find_vehicle(&vehicle.plate).await?.is_some();
                Err(missed_vehicle_write(&vehicle.plate, still_exists))
            }
        }
    }

    async fn delete_vehicle(&self, plate: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE plate = $1")
            .bind(plate)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting vehicle", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_fuel_logs(&self, plate: Option<&str>) -> AppResult<Vec<FuelLog>> {
        sqlx::query_as::<_, FuelLog>(
            "SELECT * FROM fuel_logs WHERE ($1::TEXT IS NULL OR plate = $1) ORDER BY created_at",
        )
        .bind(plate)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error listing fuel logs", e))
    }

    async fn find_fuel_log(&self, id: Uuid) -> AppResult<Option<FuelLog>> {
        sqlx::query_as::<_, FuelLog>("SELECT * FROM fuel_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Error finding fuel log", e))
    }

    async fn insert_fuel_log(&self, log: &FuelLog) -> AppResult<FuelLog> {
        sqlx::query_as::<_, FuelLog>(
            r#"
            INSERT INTO fuel_logs (id, plate, driver, liters, price, total_cost, km_run, mileage, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(log.id)
        .bind(&log.plate)
        .bind(&log.driver)
        .bind(log.liters)
        .bind(log.price)
        .bind(log.total_cost)
        .bind(log.km_run)
        .bind(log.mileage)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error inserting fuel log", e))
    }

    async fn update_fuel_log(&self, log: &FuelLog) -> AppResult<FuelLog> {
        sqlx::query_as::<_, FuelLog>(
            "UPDATE fuel_logs SET liters = $2, price = $3, total_cost = $4 WHERE id = $1 RETURNING *",
        )
        .bind(log.id)
        .bind(log.liters)
        .bind(log.price)
        .bind(log.total_cost)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Error updating fuel log", e))?
        .ok_or_else(|| AppError::NotFound(format!("Fuel log '{}' not found", log.id)))
    }

    async fn delete_fuel_logs(&self, plate: Option<&str>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM fuel_logs WHERE ($1::TEXT IS NULL OR plate = $1)")
            .bind(plate)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting fuel logs", e))?;
        Ok(result.rows_affected())
    }

    async fn list_maintenance(&self, plate: Option<&str>) -> AppResult<Vec<MaintenanceLog>> {
        sqlx::query_as::<_, MaintenanceLog>(
            "SELECT * FROM maintenance_logs WHERE ($1::TEXT IS NULL OR plate = $1) ORDER BY date, created_at",
        )
        .bind(plate)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error listing maintenance", e))
    }

    async fn insert_maintenance(&self, log: &MaintenanceLog) -> AppResult<MaintenanceLog> {
        sqlx::query_as::<_, MaintenanceLog>(
            r#"
            INSERT INTO maintenance_logs (id, plate, date, work_type, cost, notes, odo, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(log.id)
        .bind(&log.plate)
        .bind(log.date)
        .bind(&log.work_type)
        .bind(log.cost)
        .bind(&log.notes)
        .bind(log.odo)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error inserting maintenance", e))
    }

    async fn delete_maintenance(&self, plate: Option<&str>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM maintenance_logs WHERE ($1::TEXT IS NULL OR plate = $1)")
            .bind(plate)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Error deleting maintenance", e))?;
        Ok(result.rows_affected())
    }

    async fn insert_backup(&self, backup: &Backup) -> AppResult<BackupSummary> {
        sqlx::query_as::<_, BackupSummary>(
            r#"
            INSERT INTO backups (id, backup_date, event_type, vehicles_snapshot, fuel_snapshot, maintenance_snapshot)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, backup_date, event_type
            "#,
        )
        .bind(backup.id)
        .bind(backup.backup_date)
        .bind(&backup.event_type)
        .bind(&backup.vehicles_snapshot)
        .bind(&backup.fuel_snapshot)
        .bind(&backup.maintenance_snapshot)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Error inserting backup", e))
    }

    async fn list_backups(&self) -> AppResult<Vec<BackupSummary>> {
        sqlx::query_as::<_, BackupSummary>(
            "SELECT id, backup_date, event_type FROM backups ORDER BY backup_date DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Error listing backups", e))
    }
}
