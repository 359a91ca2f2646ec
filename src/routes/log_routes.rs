use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::LogController;
use crate::dto::log_dto::{CorrectFuelLogRequest, CreateMaintenanceRequest, PlateFilter};
use crate::dto::ApiResponse;
use crate::middleware::{require_manager, require_vehicle_access};
use crate::models::auth::Session;
use crate::models::fuel_log::FuelLog;
use crate::models::maintenance::MaintenanceLog;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, AppError};
use crate::utils::validation::normalize_plate;

pub fn create_fuel_log_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_fuel_logs))
        .route("/:id", put(correct_fuel_log))
}

pub fn create_maintenance_router() -> Router<AppState> {
    Router::new().route("/", get(list_maintenance).post(log_maintenance))
}

/// El conductor solo ve las cargas de su propio vehículo
async fn list_fuel_logs(
    State(state): State<AppState>,
    session: Session,
    Query(filter): Query<PlateFilter>,
) -> Result<Json<Vec<FuelLog>>, AppError> {
    let plate = match (session.is_manager(), filter.plate) {
        (true, plate) => plate,
        (false, Some(plate)) => Some(normalize_plate(&plate)),
        (false, None) => Some(
            session
                .plate
                .clone()
                .ok_or_else(|| forbidden_error("list fuel logs", "no vehicle assigned to this session"))?,
        ),
    };
    if let Some(plate) = plate.as_deref().filter(|_| !session.is_manager()) {
        require_vehicle_access(state.store.as_ref(), &session, plate, "list fuel logs").await?;
    }

    let controller = LogController::new(state.store.clone());
    Ok(Json(controller.list_fuel_logs(plate.as_deref()).await?))
}

async fn correct_fuel_log(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(request): Json<CorrectFuelLogRequest>,
) -> Result<Json<ApiResponse<FuelLog>>, AppError> {
    require_manager(&session, "correct fuel log")?;
    let controller = LogController::new(state.store.clone());
    Ok(Json(controller.correct_fuel_log(id, request).await?))
}

async fn list_maintenance(
    State(state): State<AppState>,
    session: Session,
    Query(filter): Query<PlateFilter>,
) -> Result<Json<Vec<MaintenanceLog>>, AppError> {
    require_manager(&session, "list maintenance")?;
    let controller = LogController::new(state.store.clone());
    Ok(Json(controller.list_maintenance(filter.plate.as_deref()).await?))
}

async fn log_maintenance(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CreateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceLog>>, AppError> {
    require_manager(&session, "log maintenance")?;
    let controller = LogController::new(state.store.clone());
    Ok(Json(controller.log_maintenance(request).await?))
}
