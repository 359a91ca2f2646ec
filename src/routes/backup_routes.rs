use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::backup_controller::{BackupController, ResetResponse};
use crate::dto::log_dto::BackupRequest;
use crate::dto::ApiResponse;
use crate::middleware::require_manager;
use crate::models::auth::Session;
use crate::models::backup::BackupSummary;
use crate::models::outcome::BackupOutcome;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_backup_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_backups).post(create_backup))
        .route("/reset", post(monthly_reset))
}

async fn list_backups(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<BackupSummary>>, AppError> {
    require_manager(&session, "list backups")?;
    let controller = BackupController::new(state.store.clone());
    Ok(Json(controller.list().await?))
}

/// El body es opcional; sin `event_type` la copia es "manual"
async fn create_backup(
    State(state): State<AppState>,
    session: Session,
    request: Option<Json<BackupRequest>>,
) -> Result<Json<ApiResponse<BackupOutcome>>, AppError> {
    require_manager(&session, "create backup")?;
    let event_type = request.and_then(|Json(r)| r.event_type);
    let controller = BackupController::new(state.store.clone());
    Ok(Json(controller.backup(event_type).await))
}

async fn monthly_reset(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ApiResponse<ResetResponse>>, AppError> {
    require_manager(&session, "reset month")?;
    let controller = BackupController::new(state.store.clone());
    Ok(Json(controller.reset().await?))
}
