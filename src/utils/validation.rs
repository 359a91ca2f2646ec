//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para normalizar y validar
//! los datos que llegan desde los formularios antes de tocar el store.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::utils::errors::{validation_error, AppError};

lazy_static! {
    /// Matrícula ya normalizada: letras, dígitos y guiones
    static ref PLATE_RE: Regex = Regex::new(r"^[A-Z0-9][A-Z0-9-]{2,14}$").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Normaliza una matrícula: mayúsculas y sin espacios ("ka 01 ab 1234" -> "KA01AB1234")
pub fn normalize_plate(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), "").to_uppercase()
}

/// Normaliza el nombre del conductor: mayúsculas, espacios simples
pub fn normalize_driver(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").to_uppercase()
}

/// Normaliza y valida una matrícula en un solo paso
pub fn parse_plate(raw: &str) -> Result<String, AppError> {
    let plate = normalize_plate(raw);
    if plate.is_empty() {
        return Err(validation_error("plate", "plate is required"));
    }
    if !PLATE_RE.is_match(&plate) {
        return Err(validation_error("plate", "plate must be 3-15 letters, digits or dashes"));
    }
    Ok(plate)
}

/// Normaliza y valida el nombre de un conductor
pub fn parse_driver(raw: &str) -> Result<String, AppError> {
    let driver = normalize_driver(raw);
    if driver.is_empty() {
        return Err(validation_error("driver", "driver name is required"));
    }
    if driver.chars().count() > 100 {
        return Err(validation_error("driver", "driver name is too long"));
    }
    Ok(driver)
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que una cantidad sea finita y estrictamente positiva
pub fn ensure_positive(field: &'static str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(validation_error(field, "must be a positive number"));
    }
    Ok(())
}

/// Validar que una lectura sea finita y no negativa
pub fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(validation_error(field, "must be zero or greater"));
    }
    Ok(())
}

/// Validar un importe monetario (precio o coste)
pub fn ensure_amount(field: &'static str, value: Decimal, allow_zero: bool) -> Result<(), AppError> {
    if value.is_sign_negative() || (!allow_zero && value.is_zero()) {
        return Err(validation_error(field, "amount out of range"));
    }
    Ok(())
}

/// Parsear un mes en formato YYYY-MM y devolver el rango [inicio, fin)
pub fn parse_month(value: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid month '{}', expected YYYY-MM", value)))?;
    let end = start
        .checked_add_months(chrono::Months::new(1))
        .ok_or_else(|| AppError::BadRequest(format!("Month '{}' out of range", value)))?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate(" ka 01 ab 1234 "), "KA01AB1234");
        assert_eq!(parse_plate("ka01ab1234").unwrap(), "KA01AB1234");
    }

    #[test]
    fn test_parse_plate_rejects_garbage() {
        assert!(parse_plate("").is_err());
        assert!(parse_plate("   ").is_err());
        assert!(parse_plate("A!").is_err());
        assert!(parse_plate("-AB123").is_err());
    }

    #[test]
    fn test_normalize_driver() {
        assert_eq!(normalize_driver("  ravi   kumar "), "RAVI KUMAR");
        assert!(parse_driver("  ").is_err());
    }

    #[test]
    fn test_quantities() {
        assert!(ensure_positive("liters", 20.0).is_ok());
        assert!(ensure_positive("liters", 0.0).is_err());
        assert!(ensure_positive("liters", f64::NAN).is_err());
        assert!(ensure_non_negative("odo", 0.0).is_ok());
        assert!(ensure_non_negative("odo", -1.0).is_err());
        assert!(ensure_amount("cost", Decimal::ZERO, true).is_ok());
        assert!(ensure_amount("price", Decimal::ZERO, false).is_err());
        assert!(ensure_amount("price", Decimal::new(-5, 0), false).is_err());
    }

    #[test]
    fn test_parse_month() {
        let (start, end) = parse_month("2026-12").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
        assert!(parse_month("2026-13").is_err());
        assert!(parse_month("october").is_err());
    }
}
