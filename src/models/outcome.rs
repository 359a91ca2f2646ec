//! Resultados etiquetados para pasos best-effort
//!
//! Los borrados en cascada, los registros de combustible y las copias de
//! seguridad no abortan la operación principal si fallan: devuelven uno de
//! estos valores para que el llamador decida si mostrarlo, registrarlo o
//! ignorarlo.

use serde::Serialize;
use uuid::Uuid;

use crate::utils::errors::AppResult;

/// Resultado de un paso secundario
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Done { rows: u64 },
    Failed { reason: String },
    Skipped,
}

impl StepOutcome {
    /// Convierte el resultado de un paso; los errores se registran con warn
    pub fn from_result(step: &str, result: AppResult<u64>) -> Self {
        match result {
            Ok(rows) => StepOutcome::Done { rows },
            Err(e) => {
                tracing::warn!("⚠️ Paso '{}' falló: {}", step, e);
                StepOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Done { .. })
    }
}

/// Resultado de una copia de seguridad
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackupOutcome {
    Stored { id: Uuid, event_type: String },
    Skipped { reason: String },
}

impl BackupOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, BackupOutcome::Stored { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::AppError;

    #[test]
    fn test_from_result() {
        assert_eq!(StepOutcome::from_result("fuel_logs", Ok(3)), StepOutcome::Done { rows: 3 });
        let failed = StepOutcome::from_result("fuel_logs", Err(AppError::Store("timeout".into())));
        assert!(!failed.is_done());
        assert_eq!(
            serde_json::to_value(&failed).unwrap()["status"],
            serde_json::json!("failed")
        );
    }
}
