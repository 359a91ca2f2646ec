//! Registros de combustible y mantenimiento

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::log_dto::{CorrectFuelLogRequest, CreateMaintenanceRequest};
use crate::dto::ApiResponse;
use crate::models::fuel_log::FuelLog;
use crate::models::maintenance::MaintenanceLog;
use crate::repositories::FleetStore;
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::validation::{ensure_amount, ensure_non_negative, ensure_positive, parse_plate};

pub struct LogController {
    store: Arc<dyn FleetStore>,
}

impl LogController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Cargas de una matrícula (o todas), de la más reciente a la más antigua
    pub async fn list_fuel_logs(&self, plate: Option<&str>) -> Result<Vec<FuelLog>, AppError> {
        let plate = plate.map(parse_plate).transpose()?;
        let mut logs = self.store.list_fuel_logs(plate.as_deref()).await?;
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(logs)
    }

    pub async fn correct_fuel_log(
        &self,
        id: Uuid,
        request: CorrectFuelLogRequest,
    ) -> Result<ApiResponse<FuelLog>, AppError> {
        if let Some(liters) = request.liters {
            ensure_positive("liters", liters)?;
        }
        if let Some(price) = request.price {
            ensure_amount("price", price, false)?;
        }

        let current = self
            .store
            .find_fuel_log(id)
            .await?
            .ok_or_else(|| not_found_error("Fuel log", &id.to_string()))?;

        let corrected = self
            .store
            .update_fuel_log(&current.corrected(request.liters, request.price))
            .await?;
        info!("✏️ Carga {} corregida: total {}", corrected.id, corrected.total_cost);

        Ok(ApiResponse::success_with_message(
            corrected,
            "Fuel log corrected".to_string(),
        ))
    }

    pub async fn list_maintenance(&self, plate: Option<&str>) -> Result<Vec<MaintenanceLog>, AppError> {
        let plate = plate.map(parse_plate).transpose()?;
        let mut logs = self.store.list_maintenance(plate.as_deref()).await?;
        logs.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(logs)
    }

    pub async fn log_maintenance(
        &self,
        request: CreateMaintenanceRequest,
    ) -> Result<ApiResponse<MaintenanceLog>, AppError> {
        request.validate()?;
        ensure_amount("cost", request.cost, true)?;
        if let Some(odo) = request.odo {
            ensure_non_negative("odo", odo)?;
        }

        let plate = parse_plate(&request.plate)?;
        if self.store.find_vehicle(&plate).await?.is_none() {
            return Err(not_found_error("Vehicle", &plate));
        }

        let now = Utc::now();
        let log = MaintenanceLog {
            id: Uuid::new_v4(),
            plate,
            date: request.date.unwrap_or_else(|| now.date_naive()),
            work_type: request.work_type.trim().to_string(),
            cost: request.cost,
            notes: request.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            odo: request.odo,
            created_at: now,
        };

        let stored = self.store.insert_maintenance(&log).await?;
        info!("🔧 Mantenimiento '{}' registrado para {}", stored.work_type, stored.plate);

        Ok(ApiResponse::success_with_message(
            stored,
            "Maintenance logged".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::Vehicle;
    use crate::repositories::MemoryStore;
    use rust_decimal::Decimal;

    async fn setup() -> (LogController, MemoryStore) {
        let store = MemoryStore::new();
        store
            .upsert_vehicle(&Vehicle::enrolled("KA01AB1234".into(), "RAVI".into()))
            .await
            .unwrap();
        (LogController::new(Arc::new(store.clone())), store)
    }

    fn maintenance(plate: &str, cost: Decimal) -> CreateMaintenanceRequest {
        CreateMaintenanceRequest {
            plate: plate.into(),
            work_type: "Oil change".into(),
            cost,
            date: None,
            notes: Some("  ".into()),
            odo: None,
        }
    }

    #[tokio::test]
    async fn test_maintenance_defaults_to_today() {
        let (controller, _) = setup().await;
        let log = controller
            .log_maintenance(maintenance("ka01ab1234", Decimal::new(1500, 0)))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(log.plate, "KA01AB1234");
        assert_eq!(log.date, Utc::now().date_naive());
        assert!(log.notes.is_none());
    }

    #[tokio::test]
    async fn test_maintenance_requires_known_plate_and_valid_cost() {
        let (controller, _) = setup().await;
        assert!(matches!(
            controller.log_maintenance(maintenance("KA09ZZ0000", Decimal::ONE)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            controller.log_maintenance(maintenance("KA01AB1234", Decimal::new(-1, 0))).await,
            Err(AppError::Validation(_))
        ));
        assert!(controller.log_maintenance(maintenance("KA01AB1234", Decimal::ZERO)).await.is_ok());
    }

    #[tokio::test]
    async fn test_correct_fuel_log_recomputes_total() {
        let (controller, store) = setup().await;
        let log = FuelLog::new("KA01AB1234".into(), "RAVI".into(), 10.0, Decimal::new(100, 0), 0.0, 0.0);
        store.insert_fuel_log(&log).await.unwrap();

        let corrected = controller
            .correct_fuel_log(
                log.id,
                CorrectFuelLogRequest {
                    liters: Some(12.0),
                    price: None,
                },
            )
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(corrected.total_cost, Decimal::new(1200, 0));

        assert!(matches!(
            controller
                .correct_fuel_log(Uuid::new_v4(), CorrectFuelLogRequest { liters: None, price: None })
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
