use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::controllers::ReportController;
use crate::dto::log_dto::MonthQuery;
use crate::middleware::require_manager;
use crate::models::auth::Session;
use crate::services::derivation::{FleetReport, MonthlyReport};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_report_router() -> Router<AppState> {
    Router::new()
        .route("/fleet", get(fleet_report))
        .route("/monthly", get(monthly_report))
}

pub fn create_export_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles.csv", get(export_vehicles))
        .route("/fuel-logs.csv", get(export_fuel_logs))
        .route("/monthly.csv", get(export_monthly))
}

fn csv_response(filename: &str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
}

async fn fleet_report(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<FleetReport>, AppError> {
    require_manager(&session, "view fleet report")?;
    let controller = ReportController::new(state.store.clone());
    Ok(Json(controller.fleet().await?))
}

async fn monthly_report(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyReport>, AppError> {
    require_manager(&session, "view monthly report")?;
    let controller = ReportController::new(state.store.clone());
    Ok(Json(controller.monthly(&query.month).await?))
}

async fn export_vehicles(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&session, "export vehicles")?;
    let controller = ReportController::new(state.store.clone());
    Ok(csv_response("vehicles.csv", controller.vehicles_csv().await?))
}

async fn export_fuel_logs(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&session, "export fuel logs")?;
    let controller = ReportController::new(state.store.clone());
    Ok(csv_response("fuel_logs.csv", controller.fuel_logs_csv().await?))
}

async fn export_monthly(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&session, "export monthly report")?;
    let controller = ReportController::new(state.store.clone());
    let body = controller.monthly_csv(&query.month).await?;
    Ok(csv_response(&format!("monthly_{}.csv", query.month.trim()), body))
}
