use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::VehicleController;
use crate::dto::vehicle_dto::{
    DeleteVehicleResponse, EditVehicleRequest, EnrollVehicleRequest, FuelFillResponse, LogFuelRequest,
    UpdateOdometerRequest, VehicleResponse,
};
use crate::dto::ApiResponse;
use crate::middleware::{require_manager, require_vehicle_access};
use crate::models::auth::Session;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, AppError};
use crate::utils::validation::normalize_plate;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(enroll_vehicle))
        .route("/me", get(my_vehicle))
        .route("/:plate", get(get_vehicle).put(edit_vehicle).delete(delete_vehicle))
        .route("/:plate/odometer", post(update_odometer))
        .route("/:plate/fuel", post(log_fuel))
}

async fn list_vehicles(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    require_manager(&session, "list vehicles")?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.list().await?))
}

async fn enroll_vehicle(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<EnrollVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    require_manager(&session, "enroll vehicle")?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.enroll(request).await?))
}

/// Métricas personales del conductor
async fn my_vehicle(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<VehicleResponse>, AppError> {
    let plate = session
        .plate
        .as_deref()
        .ok_or_else(|| forbidden_error("view own vehicle", "no vehicle assigned to this session"))?;
    require_vehicle_access(state.store.as_ref(), &session, plate, "view own vehicle").await?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.get(plate).await?))
}

async fn get_vehicle(
    State(state): State<AppState>,
    session: Session,
    Path(plate): Path<String>,
) -> Result<Json<VehicleResponse>, AppError> {
    require_vehicle_access(state.store.as_ref(), &session, &normalize_plate(&plate), "view vehicle").await?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.get(&plate).await?))
}

async fn edit_vehicle(
    State(state): State<AppState>,
    session: Session,
    Path(plate): Path<String>,
    Json(request): Json<EditVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    require_manager(&session, "edit vehicle")?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.edit(&plate, request).await?))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    session: Session,
    Path(plate): Path<String>,
) -> Result<Json<ApiResponse<DeleteVehicleResponse>>, AppError> {
    require_manager(&session, "delete vehicle")?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.delete(&plate).await?))
}

async fn update_odometer(
    State(state): State<AppState>,
    session: Session,
    Path(plate): Path<String>,
    Json(request): Json<UpdateOdometerRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    require_vehicle_access(state.store.as_ref(), &session, &normalize_plate(&plate), "update odometer").await?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.update_odometer(&plate, request).await?))
}

async fn log_fuel(
    State(state): State<AppState>,
    session: Session,
    Path(plate): Path<String>,
    Json(request): Json<LogFuelRequest>,
) -> Result<Json<ApiResponse<FuelFillResponse>>, AppError> {
    require_vehicle_access(state.store.as_ref(), &session, &normalize_plate(&plate), "log fuel").await?;
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.log_fuel(&plate, request).await?))
}
