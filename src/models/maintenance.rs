//! Registro de mantenimiento por vehículo

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fila de la tabla maintenance_logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MaintenanceLog {
    pub id: Uuid,
    pub plate: String,
    pub date: NaiveDate,
    pub work_type: String,
    pub cost: Decimal,
    pub notes: Option<String>,
    pub odo: Option<f64>,
    pub created_at: DateTime<Utc>,
}
