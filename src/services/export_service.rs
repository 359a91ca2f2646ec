//! Exportación CSV
//!
//! Serializa el snapshot actual (o el agregado mensual) a CSV con los
//! nombres de columna del store. `read_vehicles_csv` lee el mismo formato.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::fuel_log::FuelLog;
use crate::models::vehicle::Vehicle;
use crate::services::derivation::MonthlyReport;
use crate::utils::errors::{AppError, AppResult};

/// Fila exportada de la tabla vehicles, con los derivados al final
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleCsvRow {
    pub plate: String,
    pub driver: String,
    pub odo: f64,
    pub trip_km: f64,
    pub fuel_liters: f64,
    pub trip_distance: f64,
    pub mileage: f64,
}

impl From<&Vehicle> for VehicleCsvRow {
    fn from(v: &Vehicle) -> Self {
        Self {
            plate: v.plate.clone(),
            driver: v.driver.clone(),
            odo: v.odo,
            trip_km: v.trip_start_odo,
            fuel_liters: v.fuel_liters,
            trip_distance: v.trip_distance(),
            mileage: v.mileage(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FuelLogCsvRow<'a> {
    date: String,
    plate: &'a str,
    driver: &'a str,
    liters: f64,
    price: Decimal,
    total_cost: Decimal,
    km_run: f64,
    mileage: f64,
}

fn write_rows<T: Serialize>(rows: impl IntoIterator<Item = T>) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV is not UTF-8: {}", e)))
}

pub fn vehicles_csv(vehicles: &[Vehicle]) -> AppResult<String> {
    write_rows(vehicles.iter().map(VehicleCsvRow::from))
}

pub fn fuel_logs_csv(logs: &[FuelLog]) -> AppResult<String> {
    write_rows(logs.iter().map(|l| FuelLogCsvRow {
        date: l.created_at.format("%Y-%m-%d %H:%M").to_string(),
        plate: &l.plate,
        driver: &l.driver,
        liters: l.liters,
        price: l.price,
        total_cost: l.total_cost,
        km_run: l.km_run,
        mileage: l.mileage,
    }))
}

pub fn monthly_csv(report: &MonthlyReport) -> AppResult<String> {
    write_rows(report.rows.iter())
}

/// Lee un CSV generado por `vehicles_csv`
pub fn read_vehicles_csv(data: &str) -> AppResult<Vec<VehicleCsvRow>> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::derivation::MonthlyRow;

    fn vehicle(plate: &str, driver: &str, odo: f64, trip: f64, liters: f64) -> Vehicle {
        let mut v = Vehicle::enrolled(plate.into(), driver.into());
        v.odo = odo;
        v.trip_start_odo = trip;
        v.fuel_liters = liters;
        v
    }

    #[test]
    fn test_vehicles_csv_round_trip() {
        let snapshot = vec![
            vehicle("KA01AB1234", "RAVI", 150.0, 0.0, 25.0),
            vehicle("KA02CD5678", "ANIL KUMAR", 1234.5, 1000.25, 0.0),
        ];

        let csv = vehicles_csv(&snapshot).unwrap();
        assert!(csv.starts_with("plate,driver,odo,trip_km,fuel_liters,trip_distance,mileage\n"));

        let mut read = read_vehicles_csv(&csv).unwrap();
        read.sort_by(|a, b| b.plate.cmp(&a.plate));
        let mut expected: Vec<VehicleCsvRow> = snapshot.iter().map(VehicleCsvRow::from).collect();
        expected.sort_by(|a, b| b.plate.cmp(&a.plate));
        assert_eq!(read, expected);
        assert_eq!(read[1].mileage, 6.0);
    }

    #[test]
    fn test_empty_snapshot_exports_nothing() {
        assert_eq!(vehicles_csv(&[]).unwrap(), "");
    }

    #[test]
    fn test_monthly_csv_header() {
        let report = MonthlyReport {
            month: "2026-10".into(),
            rows: vec![MonthlyRow {
                plate: "KA01".into(),
                liters: 10.0,
                fuel_cost: Decimal::new(95000, 2),
                km_run: 120.0,
                mileage: 12.0,
                maintenance_cost: Decimal::ZERO,
            }],
            total_liters: 10.0,
            total_fuel_cost: Decimal::new(95000, 2),
            total_maintenance_cost: Decimal::ZERO,
        };
        let csv = monthly_csv(&report).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("plate,liters,fuel_cost,km_run,mileage,maintenance_cost"));
        assert!(lines.next().unwrap().starts_with("KA01,"));
        assert_eq!(lines.next(), None);
    }
}
