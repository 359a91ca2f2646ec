//! Copias de seguridad
//!
//! Guarda el snapshot completo como texto JSON en la tabla backups.
//! Es best-effort: cualquier fallo se registra y se devuelve como
//! `BackupOutcome::Skipped`, nunca como error.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::backup::Backup;
use crate::models::outcome::BackupOutcome;
use crate::repositories::FleetStore;
use crate::services::snapshot_service::{load_snapshot, Snapshot};
use crate::utils::errors::{AppError, AppResult};

pub const MANUAL_BACKUP: &str = "manual";
pub const MONTHLY_RESET: &str = "monthly_reset";
pub const VEHICLE_DELETED: &str = "vehicle_deleted";

/// Serializa el snapshot en una fila de backup
pub fn build_backup(event_type: &str, snapshot: &Snapshot) -> AppResult<Backup> {
    let to_json = |value: serde_json::Result<String>| {
        value.map_err(|e| AppError::Internal(format!("Snapshot serialization failed: {}", e)))
    };

    Ok(Backup {
        id: Uuid::new_v4(),
        backup_date: Utc::now(),
        event_type: event_type.to_string(),
        vehicles_snapshot: to_json(serde_json::to_string(&snapshot.vehicles))?,
        fuel_snapshot: to_json(serde_json::to_string(&snapshot.fuel_logs))?,
        maintenance_snapshot: to_json(serde_json::to_string(&snapshot.maintenance))?,
    })
}

/// Toma y guarda una copia del estado actual
pub async fn take_backup(store: &dyn FleetStore, event_type: &str) -> BackupOutcome {
    match try_backup(store, event_type).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("⚠️ Backup '{}' omitido: {}", event_type, e);
            BackupOutcome::Skipped { reason: e.to_string() }
        }
    }
}

async fn try_backup(store: &dyn FleetStore, event_type: &str) -> AppResult<BackupOutcome> {
    let snapshot = load_snapshot(store).await?;
    let backup = build_backup(event_type, &snapshot)?;
    let stored = store.insert_backup(&backup).await?;

    info!(
        "💾 Backup {} ({}) guardado: {} vehículos",
        stored.id,
        stored.event_type,
        snapshot.vehicles.len()
    );
    Ok(BackupOutcome::Stored {
        id: stored.id,
        event_type: stored.event_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::Vehicle;
    use crate::repositories::MemoryStore;

    #[tokio::test]
    async fn test_backup_stores_snapshot() {
        let store = MemoryStore::new();
        store
            .upsert_vehicle(&Vehicle::enrolled("KA01AB1234".into(), "RAVI".into()))
            .await
            .unwrap();

        let outcome = take_backup(&store, MANUAL_BACKUP).await;
        assert!(outcome.is_stored());

        let backups = store.list_backups().await.unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].event_type, MANUAL_BACKUP);
    }

    #[tokio::test]
    async fn test_backup_failure_is_swallowed() {
        let store = MemoryStore::with_backups_offline();
        let outcome = take_backup(&store, MANUAL_BACKUP).await;
        assert!(matches!(outcome, BackupOutcome::Skipped { .. }));
    }

    #[test]
    fn test_build_backup_serializes_tables() {
        let snapshot = Snapshot {
            vehicles: vec![Vehicle::enrolled("KA01AB1234".into(), "RAVI".into())],
            ..Snapshot::default()
        };
        let backup = build_backup(MONTHLY_RESET, &snapshot).unwrap();
        let vehicles: Vec<Vehicle> = serde_json::from_str(&backup.vehicles_snapshot).unwrap();
        assert_eq!(vehicles, snapshot.vehicles);
        assert_eq!(backup.fuel_snapshot, "[]");
    }
}
