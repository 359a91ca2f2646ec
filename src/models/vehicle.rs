//! Modelo de Vehicle
//!
//! Una fila por autobús. Mapea a la tabla `vehicles`, con la matrícula
//! como primary key y un contador `version` para escrituras optimistas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::services::derivation;

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub plate: String,
    pub driver: String,
    /// Odómetro total en km
    pub odo: f64,
    /// Lectura del odómetro en la última carga de combustible
    #[serde(rename = "trip_km")]
    #[sqlx(rename = "trip_km")]
    pub trip_start_odo: f64,
    /// Litros cargados en la última carga
    pub fuel_liters: f64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    #[serde(default = "initial_version")]
    pub version: i64,
}

fn initial_version() -> i64 {
    1
}

impl Vehicle {
    /// Vehículo recién matriculado, contadores a cero
    pub fn enrolled(plate: String, driver: String) -> Self {
        Self {
            plate,
            driver,
            odo: 0.0,
            trip_start_odo: 0.0,
            fuel_liters: 0.0,
            location: None,
            last_updated: Utc::now(),
            version: initial_version(),
        }
    }

    /// Distancia del viaje actual (desde la última carga)
    pub fn trip_distance(&self) -> f64 {
        derivation::trip_distance(self.odo, self.trip_start_odo)
    }

    /// Rendimiento km/l del viaje actual
    pub fn mileage(&self) -> f64 {
        derivation::mileage(self.odo, self.trip_start_odo, self.fuel_liters)
    }

    /// Copia lista para escribir: sube la versión y el timestamp
    pub fn next_revision(&self) -> Self {
        Self {
            version: self.version + 1,
            last_updated: Utc::now(),
            ..self.clone()
        }
    }

    /// Compara conductor sin distinguir mayúsculas
    pub fn is_driven_by(&self, name: &str) -> bool {
        self.driver.trim().eq_ignore_ascii_case(name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrolled_vehicle_is_zeroed() {
        let v = Vehicle::enrolled("KA01AB1234".into(), "RAVI".into());
        assert_eq!(v.odo, 0.0);
        assert_eq!(v.trip_start_odo, 0.0);
        assert_eq!(v.fuel_liters, 0.0);
        assert_eq!(v.version, 1);
        assert_eq!(v.mileage(), 0.0);
    }

    #[test]
    fn test_serializes_marker_as_trip_km() {
        let mut v = Vehicle::enrolled("KA01AB1234".into(), "RAVI".into());
        v.trip_start_odo = 42.0;
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["trip_km"], 42.0);
        assert!(json.get("trip_start_odo").is_none());
    }

    #[test]
    fn test_next_revision_bumps_version() {
        let v = Vehicle::enrolled("KA01AB1234".into(), "RAVI".into());
        let next = v.next_revision();
        assert_eq!(next.version, 2);
        assert_eq!(next.plate, v.plate);
    }

    #[test]
    fn test_is_driven_by_ignores_case() {
        let v = Vehicle::enrolled("KA01AB1234".into(), "RAVI".into());
        assert!(v.is_driven_by(" ravi "));
        assert!(!v.is_driven_by("ravikumar"));
    }
}
