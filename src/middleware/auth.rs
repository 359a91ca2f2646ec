//! Autenticación por request
//!
//! `Session` se extrae del header Authorization en cada handler protegido.
//! Los guards de rol devuelven `403` con el motivo.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use tracing::warn;

use crate::models::auth::Session;
use crate::repositories::FleetStore;
use crate::services::jwt_service::extract_token_from_header;
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, not_found_error, AppError, AppResult};

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

        let token = extract_token_from_header(auth_header)?;
        state.jwt.verify(token)
    }
}

/// Solo el manager
pub fn require_manager(session: &Session, operation: &str) -> AppResult<()> {
    if session.is_manager() {
        Ok(())
    } else {
        Err(forbidden_error(operation, "manager role required"))
    }
}

/// Manager, o el conductor asignado hoy a la matrícula.
///
/// El claim `plate` del token solo acota la matrícula: la fila del vehículo
/// decide, así que un token emitido antes de reasignar el conductor (o de
/// borrar y volver a matricular) deja de servir.
pub async fn require_vehicle_access(
    store: &dyn FleetStore,
    session: &Session,
    plate: &str,
    operation: &str,
) -> AppResult<()> {
    if session.is_manager() {
        return Ok(());
    }
    if !session.can_operate(plate) {
        return Err(forbidden_error(operation, "vehicle is assigned to another driver"));
    }

    let vehicle = store
        .find_vehicle(plate)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", plate))?;

    if vehicle.is_driven_by(&session.username) {
        Ok(())
    } else {
        warn!("🚫 Token de {} rechazado: {} ya tiene otro conductor", session.username, plate);
        Err(forbidden_error(operation, "vehicle is assigned to another driver"))
    }
}
