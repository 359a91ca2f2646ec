//! Copias de seguridad serializadas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fila de la tabla backups; los snapshots son JSON en texto plano
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Backup {
    pub id: Uuid,
    pub backup_date: DateTime<Utc>,
    pub event_type: String,
    pub vehicles_snapshot: String,
    pub fuel_snapshot: String,
    pub maintenance_snapshot: String,
}

/// Metadatos de una copia, sin los snapshots
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BackupSummary {
    pub id: Uuid,
    pub backup_date: DateTime<Utc>,
    pub event_type: String,
}

impl From<&Backup> for BackupSummary {
    fn from(backup: &Backup) -> Self {
        Self {
            id: backup.id,
            backup_date: backup.backup_date,
            event_type: backup.event_type.clone(),
        }
    }
}
