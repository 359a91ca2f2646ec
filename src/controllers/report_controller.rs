//! Informes y exportaciones
//!
//! Todo se calcula sobre el snapshot leído en la misma request.

use std::sync::Arc;

use crate::repositories::FleetStore;
use crate::services::derivation::{self, FleetReport, MonthlyReport};
use crate::services::export_service;
use crate::services::snapshot_service::load_snapshot;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_month;

pub struct ReportController {
    store: Arc<dyn FleetStore>,
}

impl ReportController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn fleet(&self) -> Result<FleetReport, AppError> {
        let snapshot = load_snapshot(self.store.as_ref()).await?;
        Ok(derivation::fleet_report(
            &snapshot.vehicles,
            &snapshot.fuel_logs,
            &snapshot.maintenance,
        ))
    }

    pub async fn monthly(&self, month: &str) -> Result<MonthlyReport, AppError> {
        let (start, end) = parse_month(month)?;
        let (fuel_logs, maintenance) = futures::try_join!(
            self.store.list_fuel_logs(None),
            self.store.list_maintenance(None),
        )?;
        Ok(derivation::monthly_report(
            &start.format("%Y-%m").to_string(),
            start,
            end,
            &fuel_logs,
            &maintenance,
        ))
    }

    pub async fn vehicles_csv(&self) -> Result<String, AppError> {
        let vehicles = self.store.list_vehicles().await?;
        export_service::vehicles_csv(&vehicles)
    }

    pub async fn fuel_logs_csv(&self) -> Result<String, AppError> {
        let mut logs = self.store.list_fuel_logs(None).await?;
        logs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        export_service::fuel_logs_csv(&logs)
    }

    pub async fn monthly_csv(&self, month: &str) -> Result<String, AppError> {
        let report = self.monthly(month).await?;
        export_service::monthly_csv(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fuel_log::FuelLog;
    use crate::models::vehicle::Vehicle;
    use crate::repositories::MemoryStore;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_fleet_report_fills_missing_sums() {
        let store = MemoryStore::new();
        for (plate, driver) in [("KA01AB1234", "RAVI"), ("KA02CD5678", "ANIL")] {
            store
                .upsert_vehicle(&Vehicle::enrolled(plate.into(), driver.into()))
                .await
                .unwrap();
        }
        let log = FuelLog::new("KA01AB1234".into(), "RAVI".into(), 10.0, Decimal::new(100, 0), 0.0, 0.0);
        store.insert_fuel_log(&log).await.unwrap();

        let report = ReportController::new(Arc::new(store)).fleet().await.unwrap();
        assert_eq!(report.vehicles.len(), 2);
        assert_eq!(report.vehicles[0].fuel_cost, Decimal::new(1000, 0));
        assert_eq!(report.vehicles[1].fuel_cost, Decimal::ZERO);
        assert_eq!(report.vehicles[1].maintenance_cost, Decimal::ZERO);
        assert_eq!(report.total_cost, Decimal::new(1000, 0));
    }

    #[tokio::test]
    async fn test_monthly_rejects_bad_month() {
        let controller = ReportController::new(Arc::new(MemoryStore::new()));
        assert!(matches!(controller.monthly("2026-13").await, Err(AppError::BadRequest(_))));
        let report = controller.monthly("2026-10").await.unwrap();
        assert!(report.rows.is_empty());
    }
}
