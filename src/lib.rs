//! School fleet tracker
//!
//! Servicio HTTP para el seguimiento de una flota de autobuses escolares:
//! sesiones de manager y conductor, odómetro y combustible por vehículo,
//! mantenimiento, informes y copias de seguridad.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Construye el router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", routes::auth_routes::create_auth_router(state.clone()))
        .nest("/api/vehicle", routes::vehicle_routes::create_vehicle_router())
        .nest("/api/fuel-logs", routes::log_routes::create_fuel_log_router())
        .nest("/api/maintenance", routes::log_routes::create_maintenance_router())
        .nest("/api/reports", routes::report_routes::create_report_router())
        .nest("/api/export", routes::report_routes::create_export_router())
        .nest("/api/backup", routes::backup_routes::create_backup_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
