use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::dto::ApiResponse;
use crate::middleware::rate_limit::login_rate_limit;
use crate::models::auth::Session;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de autenticación; el login lleva su propio rate limit
pub fn create_auth_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            post(login).route_layer(middleware::from_fn_with_state(state, login_rate_limit)),
        )
        .route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    request.validate()?;
    let response = state.auth.login(&request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn me(session: Session) -> Json<ApiResponse<Session>> {
    Json(ApiResponse::success(session))
}
