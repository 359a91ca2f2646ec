//! Copias de seguridad y cierre de mes

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::dto::ApiResponse;
use crate::models::backup::BackupSummary;
use crate::models::outcome::{BackupOutcome, StepOutcome};
use crate::repositories::FleetStore;
use crate::services::backup_service::{take_backup, MANUAL_BACKUP, MONTHLY_RESET};
use crate::utils::errors::AppError;

/// Resultado del cierre de mes
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub backup: BackupOutcome,
    pub fuel_logs: StepOutcome,
    pub maintenance: StepOutcome,
}

pub struct BackupController {
    store: Arc<dyn FleetStore>,
}

impl BackupController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Nunca falla: un backup no guardado vuelve como `skipped`
    pub async fn backup(&self, event_type: Option<String>) -> ApiResponse<BackupOutcome> {
        let event_type = event_type
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| MANUAL_BACKUP.to_string());

        let outcome = take_backup(self.store.as_ref(), &event_type).await;
        let message = match &outcome {
            BackupOutcome::Stored { .. } => "Backup stored",
            BackupOutcome::Skipped { .. } => "Backup skipped",
        };
        ApiResponse::success_with_message(outcome, message.to_string())
    }

    pub async fn list(&self) -> Result<Vec<BackupSummary>, AppError> {
        self.store.list_backups().await
    }

    /// Cierre de mes: los registros solo se purgan si la copia quedó guardada
    pub async fn reset(&self) -> Result<ApiResponse<ResetResponse>, AppError> {
        let backup = take_backup(self.store.as_ref(), MONTHLY_RESET).await;
        if let BackupOutcome::Skipped { reason } = &backup {
            return Err(AppError::Conflict(format!(
                "Monthly reset aborted, backup was not stored: {}",
                reason
            )));
        }

        let fuel_logs = StepOutcome::from_result("fuel_logs", self.store.delete_fuel_logs(None).await);
        let maintenance = StepOutcome::from_result("maintenance_logs", self.store.delete_maintenance(None).await);
        info!("🧹 Cierre de mes completado: cargas {:?}, mantenimiento {:?}", fuel_logs, maintenance);

        Ok(ApiResponse::success_with_message(
            ResetResponse {
                backup,
                fuel_logs,
                maintenance,
            },
            "Monthly reset completed".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fuel_log::FuelLog;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_reset_purges_logs_after_backup() {
        let store = crate::repositories::MemoryStore::new();
        let log = FuelLog::new("KA01AB1234".into(), "RAVI".into(), 10.0, Decimal::new(100, 0), 0.0, 0.0);
        store.insert_fuel_log(&log).await.unwrap();

        let controller = BackupController::new(Arc::new(store.clone()));
        let reset = controller.reset().await.unwrap().data.unwrap();
        assert!(reset.backup.is_stored());
        assert_eq!(reset.fuel_logs, StepOutcome::Done { rows: 1 });
        assert!(store.list_fuel_logs(None).await.unwrap().is_empty());
        assert_eq!(controller.list().await.unwrap()[0].event_type, MONTHLY_RESET);
    }

    #[tokio::test]
    async fn test_reset_aborts_without_backup() {
        let store = crate::repositories::MemoryStore::with_backups_offline();
        let log = FuelLog::new("KA01AB1234".into(), "RAVI".into(), 10.0, Decimal::new(100, 0), 0.0, 0.0);
        store.insert_fuel_log(&log).await.unwrap();

        let controller = BackupController::new(Arc::new(store.clone()));
        assert!(matches!(controller.reset().await, Err(AppError::Conflict(_))));
        assert_eq!(store.list_fuel_logs(None).await.unwrap().len(), 1);

        let manual = controller.backup(None).await;
        assert!(matches!(manual.data, Some(BackupOutcome::Skipped { .. })));
    }
}
