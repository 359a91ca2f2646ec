//! Registro de cargas de combustible (append-only)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::derivation;

/// Fila de la tabla fuel_logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FuelLog {
    pub id: Uuid,
    pub plate: String,
    pub driver: String,
    pub liters: f64,
    pub price: Decimal,
    pub total_cost: Decimal,
    /// Km recorridos en el viaje que cierra esta carga
    pub km_run: f64,
    pub mileage: f64,
    pub created_at: DateTime<Utc>,
}

impl FuelLog {
    pub fn new(
        plate: String,
        driver: String,
        liters: f64,
        price: Decimal,
        km_run: f64,
        mileage: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            plate,
            driver,
            liters,
            price,
            total_cost: derivation::fuel_cost(liters, price),
            km_run,
            mileage,
            created_at: Utc::now(),
        }
    }

    /// Corrección del manager: recalcula el coste total
    pub fn corrected(&self, liters: Option<f64>, price: Option<Decimal>) -> Self {
        let liters = liters.unwrap_or(self.liters);
        let price = price.unwrap_or(self.price);
        Self {
            liters,
            price,
            total_cost: derivation::fuel_cost(liters, price),
            ..self.clone()
        }
    }
}
