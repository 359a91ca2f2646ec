use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::fuel_log::FuelLog;
use crate::models::outcome::{BackupOutcome, StepOutcome};
use crate::models::vehicle::Vehicle;

// Request para matricular un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct EnrollVehicleRequest {
    #[validate(length(min = 1, max = 32))]
    pub plate: String,
    #[validate(length(min = 1, max = 100))]
    pub driver: String,
}

// Request de edición directa del manager
#[derive(Debug, Deserialize, Validate)]
pub struct EditVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub driver: Option<String>,
    #[validate(range(min = 0.0))]
    pub odo: Option<f64>,
}

// Nueva lectura del odómetro
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOdometerRequest {
    #[validate(range(min = 0.0))]
    pub odo: f64,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

// Carga de combustible; el precio es opcional
#[derive(Debug, Deserialize)]
pub struct LogFuelRequest {
    pub liters: f64,
    pub price: Option<Decimal>,
}

// Response de vehículo con los campos derivados
#[derive(Debug, Serialize, Deserialize)]
pub struct VehicleResponse {
    pub plate: String,
    pub driver: String,
    pub odo: f64,
    pub trip_km: f64,
    pub fuel_liters: f64,
    pub trip_distance: f64,
    pub mileage: f64,
    pub location: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub version: i64,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            trip_distance: vehicle.trip_distance(),
            mileage: vehicle.mileage(),
            plate: vehicle.plate,
            driver: vehicle.driver,
            odo: vehicle.odo,
            trip_km: vehicle.trip_start_odo,
            fuel_liters: vehicle.fuel_liters,
            location: vehicle.location,
            last_updated: vehicle.last_updated,
            version: vehicle.version,
        }
    }
}

// Response de una carga: vehículo actualizado + registro opcional
#[derive(Debug, Serialize)]
pub struct FuelFillResponse {
    pub vehicle: VehicleResponse,
    pub fuel_log: Option<FuelLog>,
    pub log_outcome: StepOutcome,
}

// Response de borrado con el detalle de la cascada
#[derive(Debug, Serialize)]
pub struct DeleteVehicleResponse {
    pub plate: String,
    pub backup: BackupOutcome,
    pub fuel_logs: StepOutcome,
    pub maintenance: StepOutcome,
}
