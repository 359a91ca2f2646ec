//! Cliente HTTP para el store remoto (PostgREST)
//!
//! Cada operación es un request/response contra `/rest/v1/<tabla>` con
//! filtros `eq.` por matrícula o id. No hay reintentos: el error de
//! transporte se devuelve tal cual como `AppError::Store`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use super::{missed_vehicle_write, FleetStore};
use crate::models::backup::{Backup, BackupSummary};
use crate::models::fuel_log::FuelLog;
use crate::models::maintenance::MaintenanceLog;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{not_found_error, AppError, AppResult};

const VEHICLES: &str = "vehicles";
const FUEL_LOGS: &str = "fuel_logs";
const MAINTENANCE: &str = "maintenance_logs";
const BACKUPS: &str = "backups";

const RETURN_ROWS: &str = "return=representation";
const UPSERT_ROWS: &str = "resolution=merge-duplicates,return=representation";

/// Cliente del store remoto
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    /// Crear cliente con URL base y clave de acceso
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }

    /// Envía el request y decodifica el array de filas de la respuesta
    async fn rows<T: DeserializeOwned>(&self, table: &str, builder: RequestBuilder) -> AppResult<Vec<T>> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("⚠️ Store {} respondió {}: {}", table, status, body);
            return Err(match status {
                StatusCode::CONFLICT => AppError::Conflict(format!("{}: {}", table, body)),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    AppError::Store(format!("access to '{}' denied, check FLEET_STORE_KEY", table))
                }
                _ => AppError::Store(format!("HTTP {} on '{}': {}", status, table, body)),
            });
        }

        let rows = response.json::<Vec<T>>().await?;
        tracing::debug!("🔍 Store {}: {} filas", table, rows.len());
        Ok(rows)
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, filters: &[(&str, String)], order: &str) -> AppResult<Vec<T>> {
        let builder = self
            .request(Method::GET, table)
            .query(&[("select", "*"), ("order", order)])
            .query(filters);
        self.rows(table, builder).await
    }

    async fn delete_where(&self, table: &str, filters: &[(&str, String)]) -> AppResult<u64> {
        let builder = self
            .request(Method::DELETE, table)
            .header("Prefer", RETURN_ROWS)
            .query(&[("select", "id")])
            .query(filters);
        let deleted: Vec<serde_json::Value> = self.rows(table, builder).await?;
        Ok(deleted.len() as u64)
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

/// Filtro por matrícula, o "todas las filas" para borrados masivos
fn plate_filter(plate: Option<&str>) -> Vec<(&'static str, String)> {
    match plate {
        Some(p) => vec![("plate", eq(p))],
        None => vec![("id", "not.is.null".to_string())],
    }
}

fn first_row<T>(rows: Vec<T>, table: &str) -> AppResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::Store(format!("'{}' returned no row", table)))
}

#[async_trait]
impl FleetStore for RestStore {
    fn backend_name(&self) -> &'static str {
        "rest"
    }

    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        self.select(VEHICLES, &[], "plate.asc").await
    }

    async fn find_vehicle(&self, plate: &str) -> AppResult<Option<Vehicle>> {
        let rows: Vec<Vehicle> = self.select(VEHICLES, &[("plate", eq(plate))], "plate.asc").await?;
        Ok(rows.into_iter().next())
    }

    async fn find_vehicle_by_driver(&self, driver: &str) -> AppResult<Option<Vehicle>> {
        // La tabla es pequeña y las filas antiguas no siempre están normalizadas
        let vehicles = self.list_vehicles().await?;
        Ok(vehicles.into_iter().find(|v| v.is_driven_by(driver)))
    }

    async fn upsert_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        let builder = self
            .request(Method::POST, VEHICLES)
            .header("Prefer", UPSERT_ROWS)
            .query(&[("on_conflict", "plate")])
            .json(&[vehicle]);
        first_row(self.rows(VEHICLES, builder).await?, VEHICLES)
    }

    async fn update_vehicle(&self, vehicle: &Vehicle, expected_version: i64) -> AppResult<Vehicle> {
        let builder = self
            .request(Method::PATCH, VEHICLES)
            .header("Prefer", RETURN_ROWS)
            .query(&[("plate", eq(&vehicle.plate)), ("version", eq(expected_version))])
            .json(vehicle);
        let rows: Vec<Vehicle> = self.rows(VEHICLES, builder).await?;

        match rows.into_iter().next() {
            Some(updated) => Ok(updated),
            None => {
                let still_exists = self.find_vehicle(&vehicle.plate).await?.is_some();
                Err(missed_vehicle_write(&vehicle.plate, still_exists))
            }
        }
    }

    async fn delete_vehicle(&self, plate: &str) -> AppResult<bool> {
        let builder = self
            .request(Method::DELETE, VEHICLES)
            .header("Prefer", RETURN_ROWS)
            .query(&[("plate", eq(plate)), ("select", "plate".to_string())]);
        let deleted: Vec<serde_json::Value> = self.rows(VEHICLES, builder).await?;
        Ok(!deleted.is_empty())
    }

    async fn list_fuel_logs(&self, plate: Option<&str>) -> AppResult<Vec<FuelLog>> {
        let filters: Vec<(&str, String)> = plate.map(|p| vec![("plate", eq(p))]).unwrap_or_default();
        self.select(FUEL_LOGS, &filters, "created_at.asc").await
    }

    async fn find_fuel_log(&self, id: Uuid) -> AppResult<Option<FuelLog>> {
        let rows: Vec<FuelLog> = self.select(FUEL_LOGS, &[("id", eq(id))], "created_at.asc").await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_fuel_log(&self, log: &FuelLog) -> AppResult<FuelLog> {
        let builder = self
            .request(Method::POST, FUEL_LOGS)
            .header("Prefer", RETURN_ROWS)
            .json(&[log]);
        first_row(self.rows(FUEL_LOGS, builder).await?, FUEL_LOGS)
    }

    async fn update_fuel_log(&self, log: &FuelLog) -> AppResult<FuelLog> {
        let builder = self
            .request(Method::PATCH, FUEL_LOGS)
            .header("Prefer", RETURN_ROWS)
            .query(&[("id", eq(log.id))])
            .json(&json!({
                "liters": log.liters,
                "price": log.price,
                "total_cost": log.total_cost,
            }));
        let rows: Vec<FuelLog> = self.rows(FUEL_LOGS, builder).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| not_found_error("Fuel log", &log.id.to_string()))
    }

    async fn delete_fuel_logs(&self, plate: Option<&str>) -> AppResult<u64> {
        self.delete_where(FUEL_LOGS, &plate_filter(plate)).await
    }

    async fn list_maintenance(&self, plate: Option<&str>) -> AppResult<Vec<MaintenanceLog>> {
        let filters: Vec<(&str, String)> = plate.map(|p| vec![("plate", eq(p))]).unwrap_or_default();
        self.select(MAINTENANCE, &filters, "date.asc").await
    }

    async fn insert_maintenance(&self, log: &MaintenanceLog) -> AppResult<MaintenanceLog> {
        let builder = self
            .request(Method::POST, MAINTENANCE)
            .header("Prefer", RETURN_ROWS)
            .json(&[log]);
        first_row(self.rows(MAINTENANCE, builder).await?, MAINTENANCE)
    }

    async fn delete_maintenance(&self, plate: Option<&str>) -> AppResult<u64> {
        self.delete_where(MAINTENANCE, &plate_filter(plate)).await
    }

    async fn insert_backup(&self, backup: &Backup) -> AppResult<BackupSummary> {
        let builder = self
            .request(Method::POST, BACKUPS)
            .header("Prefer", RETURN_ROWS)
            .query(&[("select", "id,backup_date,event_type")])
            .json(&[backup]);
        first_row(self.rows(BACKUPS, builder).await?, BACKUPS)
    }

    async fn list_backups(&self) -> AppResult<Vec<BackupSummary>> {
        let builder = self
            .request(Method::GET, BACKUPS)
            .query(&[("select", "id,backup_date,event_type"), ("order", "backup_date.desc")]);
        self.rows(BACKUPS, builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let store = RestStore::new("https://fleet.example.co/", "key", Duration::from_secs(5)).unwrap();
        assert_eq!(store.table_url("vehicles"), "https://fleet.example.co/rest/v1/vehicles");
    }

    #[test]
    fn test_plate_filter() {
        assert_eq!(plate_filter(Some("KA01")), vec![("plate", "eq.KA01".to_string())]);
        assert_eq!(plate_filter(None), vec![("id", "not.is.null".to_string())]);
    }

    #[test]
    fn test_vehicle_row_from_store_json() {
        let row = serde_json::json!({
            "plate": "KA01AB1234",
            "driver": "RAVI",
            "odo": 150,
            "trip_km": 0,
            "fuel_liters": 25.0,
            "location": null,
            "last_updated": "2026-10-18T08:30:00.123456+00:00",
            "version": 3
        });
        let vehicle: Vehicle = serde_json::from_value(row).unwrap();
        assert_eq!(vehicle.trip_start_odo, 0.0);
        assert_eq!(vehicle.mileage(), 6.0);
        assert_eq!(vehicle.version, 3);
    }
}
