use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::dto::vehicle_dto::{
    DeleteVehicleResponse, EditVehicleRequest, EnrollVehicleRequest, FuelFillResponse, LogFuelRequest,
    UpdateOdometerRequest, VehicleResponse,
};
use crate::dto::ApiResponse;
use crate::models::fuel_log::FuelLog;
use crate::models::outcome::StepOutcome;
use crate::models::vehicle::Vehicle;
use crate::repositories::FleetStore;
use crate::services::backup_service::{take_backup, VEHICLE_DELETED};
use crate::services::derivation;
use crate::utils::errors::{not_found_error, validation_error, AppError};
use crate::utils::validation::{ensure_amount, ensure_non_negative, ensure_positive, parse_driver, parse_plate};

pub struct VehicleController {
    store: Arc<dyn FleetStore>,
}

impl VehicleController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    async fn load(&self, plate: &str) -> Result<Vehicle, AppError> {
        self.store
            .find_vehicle(plate)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", plate))
    }

    /// El conductor inicia sesión por nombre, así que no puede llevar dos vehículos
    async fn ensure_driver_free(&self, driver: &str, plate: &str) -> Result<(), AppError> {
        match self.store.find_vehicle_by_driver(driver).await? {
            Some(other) if other.plate != plate => Err(AppError::Conflict(format!(
                "Driver '{}' is already assigned to vehicle '{}'",
                driver, other.plate
            ))),
            _ => Ok(()),
        }
    }

    pub async fn list(&self) -> Result<Vec<VehicleResponse>, AppError> {
        let vehicles = self.store.list_vehicles().await?;
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn get(&self, plate: &str) -> Result<VehicleResponse, AppError> {
        let plate = parse_plate(plate)?;
        Ok(self.load(&plate).await?.into())
    }

    /// Matricula un vehículo con los contadores a cero. Si la matrícula ya
    /// existe la fila se reinicia y su versión avanza.
    pub async fn enroll(&self, request: EnrollVehicleRequest) -> Result<ApiResponse<VehicleResponse>, AppError> {
        request.validate()?;
        let plate = parse_plate(&request.plate)?;
        let driver = parse_driver(&request.driver)?;
        self.ensure_driver_free(&driver, &plate).await?;

        let mut vehicle = Vehicle::enrolled(plate, driver);
        if let Some(existing) = self.store.find_vehicle(&vehicle.plate).await? {
            vehicle.version = existing.version + 1;
            info!("♻️ Re-matriculando {} (versión {})", vehicle.plate, vehicle.version);
        }

        let stored = self.store.upsert_vehicle(&vehicle).await?;
        info!("🚌 Vehículo {} matriculado para {}", stored.plate, stored.driver);

        Ok(ApiResponse::success_with_message(
            stored.into(),
            "Vehicle enrolled".to_string(),
        ))
    }

    /// Sobrescritura directa del manager, sin comprobar monotonía
    pub async fn edit(&self, plate: &str, request: EditVehicleRequest) -> Result<ApiResponse<VehicleResponse>, AppError> {
        request.validate()?;
        let plate = parse_plate(plate)?;
        let current = self.load(&plate).await?;

        let mut next = current.next_revision();
        if let Some(driver) = request.driver.as_deref() {
            next.driver = parse_driver(driver)?;
            self.ensure_driver_free(&next.driver, &plate).await?;
        }
        if let Some(odo) = request.odo {
            ensure_non_negative("odo", odo)?;
            next.odo = odo;
        }

        let stored = self.store.update_vehicle(&next, current.version).await?;
        info!("✏️ Vehículo {} editado (versión {})", stored.plate, stored.version);

        Ok(ApiResponse::success_with_message(
            stored.into(),
            "Vehicle updated".to_string(),
        ))
    }

    /// Nueva lectura del odómetro; nunca puede retroceder
    pub async fn update_odometer(
        &self,
        plate: &str,
        request: UpdateOdometerRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        request.validate()?;
        ensure_non_negative("odo", request.odo)?;
        let plate = parse_plate(plate)?;
        let current = self.load(&plate).await?;

        if request.odo < current.odo {
            return Err(validation_error("odo", "odometer reading cannot go backwards"));
        }

        let mut next = current.next_revision();
        next.odo = request.odo;
        if let Some(location) = request.location.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()) {
            next.location = Some(location);
        }

        let stored = self.store.update_vehicle(&next, current.version).await?;
        info!("📍 Odómetro de {}: {} km", stored.plate, stored.odo);

        Ok(ApiResponse::success(stored.into()))
    }

    /// Registra una carga: cierra el viaje actual y abre uno nuevo desde el
    /// odómetro actual. Con precio se añade además una fila a fuel_logs.
    pub async fn log_fuel(&self, plate: &str, request: LogFuelRequest) -> Result<ApiResponse<FuelFillResponse>, AppError> {
        ensure_positive("liters", request.liters)?;
        if let Some(price) = request.price {
            ensure_amount("price", price, false)?;
        }
        let plate = parse_plate(plate)?;
        let current = self.load(&plate).await?;

        let km_run = current.trip_distance();
        let closed_mileage = derivation::ratio(km_run, current.fuel_liters);

        let mut next = current.next_revision();
        next.fuel_liters = request.liters;
        next.trip_start_odo = current.odo;

        let stored = self.store.update_vehicle(&next, current.version).await?;
        info!("⛽ {} cargó {} l en {} (viaje cerrado: {} km)", stored.driver, request.liters, stored.plate, km_run);

        let (fuel_log, log_outcome) = match request.price {
            Some(price) => {
                let log = FuelLog::new(
                    stored.plate.clone(),
                    stored.driver.clone(),
                    request.liters,
                    price,
                    km_run,
                    closed_mileage,
                );
                match self.store.insert_fuel_log(&log).await {
                    Ok(inserted) => (Some(inserted), StepOutcome::Done { rows: 1 }),
                    Err(e) => (None, StepOutcome::from_result("fuel_log", Err(e))),
                }
            }
            None => (None, StepOutcome::Skipped),
        };

        Ok(ApiResponse::success(FuelFillResponse {
            vehicle: stored.into(),
            fuel_log,
            log_outcome,
        }))
    }

    /// Borra el vehículo y, sin atomicidad, sus registros relacionados
    pub async fn delete(&self, plate: &str) -> Result<ApiResponse<DeleteVehicleResponse>, AppError> {
        let plate = parse_plate(plate)?;
        self.load(&plate).await?;

        let backup = take_backup(self.store.as_ref(), VEHICLE_DELETED).await;

        if !self.store.delete_vehicle(&plate).await? {
            return Err(not_found_error("Vehicle", &plate));
        }

        let fuel_logs = StepOutcome::from_result("fuel_logs", self.store.delete_fuel_logs(Some(&plate)).await);
        let maintenance = StepOutcome::from_result("maintenance_logs", self.store.delete_maintenance(Some(&plate)).await);
        info!("🗑️ Vehículo {} eliminado", plate);

        Ok(ApiResponse::success_with_message(
            DeleteVehicleResponse {
                plate,
                backup,
                fuel_logs,
                maintenance,
            },
            "Vehicle deleted".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;
    use rust_decimal::Decimal;

    async fn controller_with(plate: &str, driver: &str) -> (VehicleController, MemoryStore) {
        let store = MemoryStore::new();
        let controller = VehicleController::new(Arc::new(store.clone()));
        controller
            .enroll(EnrollVehicleRequest {
                plate: plate.into(),
                driver: driver.into(),
            })
            .await
            .unwrap();
        (controller, store)
    }

    fn odometer(odo: f64) -> UpdateOdometerRequest {
        UpdateOdometerRequest { odo, location: None }
    }

    #[tokio::test]
    async fn test_enroll_normalizes_and_zeroes() {
        let (controller, store) = controller_with("ka01 ab1234", " ravi ").await;
        let rows = store.list_vehicles().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].plate, "KA01AB1234");
        assert_eq!(rows[0].driver, "RAVI");

        let v = controller.get("KA01AB1234").await.unwrap();
        assert_eq!((v.odo, v.trip_km, v.fuel_liters, v.mileage), (0.0, 0.0, 0.0, 0.0));
    }

    #[tokio::test]
    async fn test_re_enroll_resets_counters() {
        let (controller, _) = controller_with("KA01AB1234", "RAVI").await;
        controller.update_odometer("KA01AB1234", odometer(500.0)).await.unwrap();

        let again = controller
            .enroll(EnrollVehicleRequest {
                plate: "KA01AB1234".into(),
                driver: "SURESH".into(),
            })
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(again.odo, 0.0);
        assert_eq!(again.driver, "SURESH");
        assert_eq!(again.version, 3);
    }

    #[tokio::test]
    async fn test_odometer_cannot_go_backwards() {
        let (controller, _) = controller_with("KA01AB1234", "RAVI").await;
        controller.update_odometer("KA01AB1234", odometer(150.0)).await.unwrap();

        let result = controller.update_odometer("KA01AB1234", odometer(100.0)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(controller.get("KA01AB1234").await.unwrap().odo, 150.0);
    }

    #[tokio::test]
    async fn test_fuel_fill_resets_trip() {
        let (controller, store) = controller_with("KA01AB1234", "RAVI").await;
        controller.update_odometer("KA01AB1234", odometer(150.0)).await.unwrap();

        let fill = controller
            .log_fuel("KA01AB1234", LogFuelRequest { liters: 25.0, price: None })
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(fill.vehicle.trip_distance, 0.0);
        assert_eq!(fill.vehicle.trip_km, 150.0);
        assert_eq!(fill.vehicle.fuel_liters, 25.0);
        assert_eq!(fill.log_outcome, StepOutcome::Skipped);
        assert!(store.list_fuel_logs(None).await.unwrap().is_empty());

        controller.update_odometer("KA01AB1234", odometer(300.0)).await.unwrap();
        assert_eq!(controller.get("KA01AB1234").await.unwrap().mileage, 6.0);
    }

    #[tokio::test]
    async fn test_priced_fill_appends_log_for_closed_trip() {
        let (controller, _) = controller_with("KA01AB1234", "RAVI").await;
        controller.log_fuel("KA01AB1234", LogFuelRequest { liters: 20.0, price: None }).await.unwrap();
        controller.update_odometer("KA01AB1234", odometer(240.0)).await.unwrap();

        let fill = controller
            .log_fuel(
                "KA01AB1234",
                LogFuelRequest {
                    liters: 30.0,
                    price: Some(Decimal::new(9550, 2)),
                },
            )
            .await
            .unwrap()
            .data
            .unwrap();

        let log = fill.fuel_log.unwrap();
        assert_eq!(log.km_run, 240.0);
        assert_eq!(log.mileage, 12.0);
        assert_eq!(log.total_cost, Decimal::new(286500, 2));
        assert!(fill.log_outcome.is_done());
    }

    #[tokio::test]
    async fn test_invalid_fuel_is_rejected() {
        let (controller, _) = controller_with("KA01AB1234", "RAVI").await;
        for liters in [0.0, -5.0, f64::NAN] {
            let result = controller.log_fuel("KA01AB1234", LogFuelRequest { liters, price: None }).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        let result = controller
            .log_fuel(
                "KA01AB1234",
                LogFuelRequest {
                    liters: 10.0,
                    price: Some(Decimal::ZERO),
                },
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_manager_edit_skips_monotonic_check() {
        let (controller, _) = controller_with("KA01AB1234", "RAVI").await;
        controller.update_odometer("KA01AB1234", odometer(500.0)).await.unwrap();
        controller.log_fuel("KA01AB1234", LogFuelRequest { liters: 10.0, price: None }).await.unwrap();

        let edited = controller
            .edit(
                "KA01AB1234",
                EditVehicleRequest {
                    driver: Some("anil".into()),
                    odo: Some(400.0),
                },
            )
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(edited.driver, "ANIL");
        assert_eq!(edited.trip_distance, -100.0);
    }

    #[tokio::test]
    async fn test_driver_cannot_hold_two_vehicles() {
        let (controller, store) = controller_with("KA01AB1234", "RAVI").await;
        let second = controller
            .enroll(EnrollVehicleRequest {
                plate: "KA02CD5678".into(),
                driver: " Ravi".into(),
            })
            .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(store.list_vehicles().await.unwrap().len(), 1);

        controller
            .enroll(EnrollVehicleRequest {
                plate: "KA02CD5678".into(),
                driver: "ANIL".into(),
            })
            .await
            .unwrap();
        let edit = controller
            .edit(
                "KA02CD5678",
                EditVehicleRequest {
                    driver: Some("ravi".into()),
                    odo: None,
                },
            )
            .await;
        assert!(matches!(edit, Err(AppError::Conflict(_))));
        assert_eq!(controller.get("KA02CD5678").await.unwrap().driver, "ANIL");
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let (controller, store) = controller_with("KA01AB1234", "RAVI").await;
        controller
            .log_fuel(
                "KA01AB1234",
                LogFuelRequest {
                    liters: 10.0,
                    price: Some(Decimal::new(100, 0)),
                },
            )
            .await
            .unwrap();

        let deleted = controller.delete("KA01AB1234").await.unwrap().data.unwrap();
        assert_eq!(deleted.fuel_logs, StepOutcome::Done { rows: 1 });
        assert_eq!(deleted.maintenance, StepOutcome::Done { rows: 0 });
        assert!(deleted.backup.is_stored());
        assert!(store.find_vehicle("KA01AB1234").await.unwrap().is_none());

        assert!(matches!(controller.delete("KA01AB1234").await, Err(AppError::NotFound(_))));
    }
}
