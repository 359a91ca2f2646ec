use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

// Filtro opcional por matrícula en los listados
#[derive(Debug, Default, Deserialize)]
pub struct PlateFilter {
    pub plate: Option<String>,
}

// Corrección de un registro de combustible (solo manager)
#[derive(Debug, Deserialize)]
pub struct CorrectFuelLogRequest {
    pub liters: Option<f64>,
    pub price: Option<Decimal>,
}

// Request para registrar un mantenimiento
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    #[validate(length(min = 1, max = 32))]
    pub plate: String,
    #[validate(length(min = 1, max = 100))]
    pub work_type: String,
    pub cost: Decimal,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[validate(range(min = 0.0))]
    pub odo: Option<f64>,
}

// Mes del informe en formato YYYY-MM
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: String,
}

// Request de copia de seguridad manual
#[derive(Debug, Default, Deserialize)]
pub struct BackupRequest {
    pub event_type: Option<String>,
}
