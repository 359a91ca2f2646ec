//! Cálculos derivados
//!
//! Funciones puras que convierten las filas almacenadas en distancias,
//! rendimientos y costes. Nada de esto se persiste: se recalcula en cada
//! lectura a partir del snapshot más reciente.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::fuel_log::FuelLog;
use crate::models::maintenance::MaintenanceLog;
use crate::models::vehicle::Vehicle;

/// Distancia del viaje actual. Puede salir negativa si un manager corrige
/// el odómetro por debajo de la marca; se devuelve tal cual.
pub fn trip_distance(odo: f64, trip_start_odo: f64) -> f64 {
    odo - trip_start_odo
}

/// km/l del viaje actual; 0 cuando no hay litros registrados
pub fn mileage(odo: f64, trip_start_odo: f64, fuel_liters: f64) -> f64 {
    ratio(trip_distance(odo, trip_start_odo), fuel_liters)
}

/// División con la política de "0 si el divisor es 0"
pub fn ratio(distance: f64, liters: f64) -> f64 {
    if liters == 0.0 {
        0.0
    } else {
        distance / liters
    }
}

/// Coste de una carga: litros × precio, redondeado a céntimos
pub fn fuel_cost(liters: f64, price: Decimal) -> Decimal {
    let liters = Decimal::from_f64_retain(liters).unwrap_or(Decimal::ZERO);
    (liters * price).round_dp(2)
}

/// Suma de costes de mantenimiento por matrícula
pub fn maintenance_totals(logs: &[MaintenanceLog]) -> HashMap<String, Decimal> {
    let mut totals: HashMap<String, Decimal> = HashMap::new();
    for log in logs {
        *totals.entry(log.plate.clone()).or_insert(Decimal::ZERO) += log.cost;
    }
    totals
}

/// Litros que pagaron el viaje cerrado por una carga.
///
/// `km_run` de un registro se recorrió con los litros de la carga anterior,
/// no con los suyos; se recuperan de `mileage = km_run / litros anteriores`.
/// 0 cuando el registro no tiene rendimiento.
pub fn trip_liters(log: &FuelLog) -> f64 {
    ratio(log.km_run, log.mileage)
}

/// Totales de combustible por matrícula
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelTotals {
    pub liters: f64,
    pub cost: Decimal,
    pub km_run: f64,
    /// Km y litros de los viajes con rendimiento conocido
    pub rated_km: f64,
    pub trip_liters: f64,
}

impl FuelTotals {
    /// km/l agregado, coherente con el `mileage` de cada registro
    pub fn mileage(&self) -> f64 {
        ratio(self.rated_km, self.trip_liters)
    }
}

pub fn fuel_totals(logs: &[FuelLog]) -> HashMap<String, FuelTotals> {
    let mut totals: HashMap<String, FuelTotals> = HashMap::new();
    for log in logs {
        let entry = totals.entry(log.plate.clone()).or_default();
        entry.liters += log.liters;
        entry.cost += log.total_cost;
        entry.km_run += log.km_run;

        let behind = trip_liters(log);
        if behind != 0.0 {
            entry.rated_km += log.km_run;
            entry.trip_liters += behind;
        }
    }
    totals
}

/// Fila del informe de rendimiento de la flota
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePerformance {
    pub plate: String,
    pub driver: String,
    pub odo: f64,
    pub trip_distance: f64,
    pub mileage: f64,
    pub fuel_liters_total: f64,
    pub fuel_cost: Decimal,
    pub maintenance_cost: Decimal,
    pub total_cost: Decimal,
}

/// Informe completo de la flota con totales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetReport {
    pub vehicles: Vec<VehiclePerformance>,
    pub total_fuel_cost: Decimal,
    pub total_maintenance_cost: Decimal,
    pub total_cost: Decimal,
    pub total_trip_distance: f64,
    /// Rendimiento medio de los vehículos con litros registrados
    pub average_mileage: f64,
}

/// Une vehículos con sus sumas de combustible y mantenimiento.
/// Las matrículas sin registros quedan a 0.
pub fn fleet_report(
    vehicles: &[Vehicle],
    fuel_logs: &[FuelLog],
    maintenance: &[MaintenanceLog],
) -> FleetReport {
    let fuel = fuel_totals(fuel_logs);
    let maint = maintenance_totals(maintenance);

    let mut rows: Vec<VehiclePerformance> = vehicles
        .iter()
        .map(|v| {
            let f = fuel.get(&v.plate).copied().unwrap_or_default();
            let m = maint.get(&v.plate).copied().unwrap_or(Decimal::ZERO);
            VehiclePerformance {
                plate: v.plate.clone(),
                driver: v.driver.clone(),
                odo: v.odo,
                trip_distance: v.trip_distance(),
                mileage: v.mileage(),
                fuel_liters_total: f.liters,
                fuel_cost: f.cost,
                maintenance_cost: m,
                total_cost: f.cost + m,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.plate.cmp(&b.plate));

    let total_fuel_cost = rows.iter().map(|r| r.fuel_cost).sum::<Decimal>();
    let total_maintenance_cost = rows.iter().map(|r| r.maintenance_cost).sum::<Decimal>();
    let fuelled: Vec<f64> = vehicles
        .iter()
        .filter(|v| v.fuel_liters > 0.0)
        .map(|v| v.mileage())
        .collect();

    FleetReport {
        total_trip_distance: rows.iter().map(|r| r.trip_distance).sum(),
        average_mileage: ratio(fuelled.iter().sum(), fuelled.len() as f64),
        total_fuel_cost,
        total_maintenance_cost,
        total_cost: total_fuel_cost + total_maintenance_cost,
        vehicles: rows,
    }
}

/// Fila del agregado mensual por matrícula. `mileage` divide los km entre
/// los litros que los pagaron, no entre los cargados en el mes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRow {
    pub plate: String,
    pub liters: f64,
    pub fuel_cost: Decimal,
    pub km_run: f64,
    pub mileage: f64,
    pub maintenance_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub month: String,
    pub rows: Vec<MonthlyRow>,
    pub total_liters: f64,
    pub total_fuel_cost: Decimal,
    pub total_maintenance_cost: Decimal,
}

/// Agrega los registros de combustible y mantenimiento cuyo día cae en [start, end)
pub fn monthly_report(
    month: &str,
    start: NaiveDate,
    end: NaiveDate,
    fuel_logs: &[FuelLog],
    maintenance: &[MaintenanceLog],
) -> MonthlyReport {
    let in_month = |d: NaiveDate| d >= start && d < end;

    let fuel: Vec<FuelLog> = fuel_logs
        .iter()
        .filter(|l| in_month(l.created_at.date_naive()))
        .cloned()
        .collect();
    let maint: Vec<MaintenanceLog> = maintenance
        .iter()
        .filter(|m| in_month(m.date))
        .cloned()
        .collect();

    let fuel_by_plate = fuel_totals(&fuel);
    let maint_by_plate = maintenance_totals(&maint);

    let mut plates: BTreeMap<&str, ()> = BTreeMap::new();
    for plate in fuel_by_plate.keys().chain(maint_by_plate.keys()) {
        plates.insert(plate.as_str(), ());
    }

    let rows: Vec<MonthlyRow> = plates
        .keys()
        .map(|plate| {
            let f = fuel_by_plate.get(*plate).copied().unwrap_or_default();
            MonthlyRow {
                plate: plate.to_string(),
                liters: f.liters,
                fuel_cost: f.cost,
                km_run: f.km_run,
                mileage: f.mileage(),
                maintenance_cost: maint_by_plate.get(*plate).copied().unwrap_or(Decimal::ZERO),
            }
        })
        .collect();

    MonthlyReport {
        month: month.to_string(),
        total_liters: rows.iter().map(|r| r.liters).sum(),
        total_fuel_cost: rows.iter().map(|r| r.fuel_cost).sum(),
        total_maintenance_cost: rows.iter().map(|r| r.maintenance_cost).sum(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn vehicle(plate: &str, odo: f64, trip: f64, liters: f64) -> Vehicle {
        let mut v = Vehicle::enrolled(plate.to_string(), "RAVI".to_string());
        v.odo = odo;
        v.trip_start_odo = trip;
        v.fuel_liters = liters;
        v
    }

    fn maintenance(plate: &str, day: u32, cost: i64) -> MaintenanceLog {
        MaintenanceLog {
            id: Uuid::new_v4(),
            plate: plate.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            work_type: "Oil change".to_string(),
            cost: Decimal::new(cost, 0),
            notes: None,
            odo: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_mileage_with_fuel() {
        assert_eq!(mileage(150.0, 0.0, 25.0), 6.0);
        assert_eq!(mileage(1300.0, 1000.0, 20.0), 15.0);
    }

    #[test]
    fn test_mileage_zero_fuel_is_zero() {
        assert_eq!(mileage(150.0, 0.0, 0.0), 0.0);
        assert_eq!(mileage(0.0, 0.0, 0.0), 0.0);
        assert!(!mileage(10.0, 5.0, 0.0).is_nan());
    }

    #[test]
    fn test_negative_trip_distance_is_reported() {
        assert_eq!(trip_distance(90.0, 100.0), -10.0);
        assert_eq!(mileage(90.0, 100.0, 5.0), -2.0);
    }

    #[test]
    fn test_fuel_cost() {
        assert_eq!(fuel_cost(20.0, Decimal::new(9450, 2)), Decimal::new(189000, 2));
        assert_eq!(fuel_cost(12.5, Decimal::new(100, 0)), Decimal::new(1250, 0));
        assert_eq!(fuel_cost(0.0, Decimal::new(95, 0)), Decimal::ZERO);
    }

    #[test]
    fn test_fleet_report_left_join_fills_zero() {
        let vehicles = vec![vehicle("KA01", 150.0, 0.0, 25.0), vehicle("KA02", 50.0, 50.0, 0.0)];
        let fuel = vec![FuelLog::new("KA01".into(), "RAVI".into(), 25.0, Decimal::new(100, 0), 0.0, 0.0)];
        let maint = vec![maintenance("KA01", 3, 500), maintenance("KA01", 4, 250)];

        let report = fleet_report(&vehicles, &fuel, &maint);

        assert_eq!(report.vehicles.len(), 2);
        let ka01 = &report.vehicles[0];
        assert_eq!(ka01.plate, "KA01");
        assert_eq!(ka01.mileage, 6.0);
        assert_eq!(ka01.fuel_cost, Decimal::new(2500, 0));
        assert_eq!(ka01.maintenance_cost, Decimal::new(750, 0));
        assert_eq!(ka01.total_cost, Decimal::new(3250, 0));

        let ka02 = &report.vehicles[1];
        assert_eq!(ka02.fuel_cost, Decimal::ZERO);
        assert_eq!(ka02.maintenance_cost, Decimal::ZERO);
        assert_eq!(ka02.mileage, 0.0);

        assert_eq!(report.total_cost, Decimal::new(3250, 0));
        assert_eq!(report.average_mileage, 6.0);
    }

    #[test]
    fn test_monthly_report_filters_by_month() {
        let mut october = FuelLog::new("KA01".into(), "RAVI".into(), 10.0, Decimal::new(100, 0), 120.0, 12.0);
        october.created_at = Utc.with_ymd_and_hms(2026, 10, 5, 8, 0, 0).unwrap();
        let mut september = october.clone();
        september.created_at = Utc.with_ymd_and_hms(2026, 9, 30, 23, 0, 0).unwrap();
        let maint = vec![maintenance("KA02", 12, 300)];

        let start = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let report = monthly_report("2026-10", start, end, &[october, september], &maint);

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].plate, "KA01");
        assert_eq!(report.rows[0].liters, 10.0);
        assert_eq!(report.rows[0].mileage, 12.0);
        assert_eq!(report.rows[1].plate, "KA02");
        assert_eq!(report.rows[1].maintenance_cost, Decimal::new(300, 0));
        assert_eq!(report.total_fuel_cost, Decimal::new(1000, 0));
    }

    #[test]
    fn test_monthly_mileage_uses_liters_behind_each_trip() {
        let at = Utc.with_ymd_and_hms(2026, 10, 9, 8, 0, 0).unwrap();
        // 20 L, 240 km, carga de 30 L: el registro guarda 240 / 20 = 12
        let mut first = FuelLog::new("KA01".into(), "RAVI".into(), 30.0, Decimal::new(9550, 2), 240.0, 12.0);
        first.created_at = at;
        // 30 L, 100 km, carga de 25 L: 100 / 30
        let mut second = FuelLog::new("KA01".into(), "RAVI".into(), 25.0, Decimal::new(9550, 2), 100.0, 100.0 / 30.0);
        second.created_at = at;

        let start = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();

        let single = monthly_report("2026-10", start, end, &[first.clone()], &[]);
        assert_eq!(single.rows[0].liters, 30.0);
        assert_eq!(single.rows[0].mileage, first.mileage);

        let both = monthly_report("2026-10", start, end, &[first, second], &[]);
        let row = &both.rows[0];
        assert_eq!(row.km_run, 340.0);
        assert_eq!(row.liters, 55.0);
        assert!((row.mileage - 340.0 / 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_fill_has_no_trip_liters() {
        let log = FuelLog::new("KA01".into(), "RAVI".into(), 20.0, Decimal::new(100, 0), 0.0, 0.0);
        assert_eq!(trip_liters(&log), 0.0);
        let totals = fuel_totals(&[log]);
        assert_eq!(totals["KA01"].mileage(), 0.0);
        assert_eq!(totals["KA01"].liters, 20.0);
    }
}
