use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use school_fleet::config::database::DatabaseConfig;
use school_fleet::config::{EnvironmentConfig, StoreBackend};
use school_fleet::database::DatabaseConnection;
use school_fleet::repositories::{FleetStore, MemoryStore, PostgresStore, RestStore};
use school_fleet::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging (RUST_LOG, por defecto info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚌 School Fleet Tracker");
    info!("=======================");

    let config = match EnvironmentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuración inválida: {}", e);
            return Err(anyhow::anyhow!("Error de configuración: {}", e));
        }
    };

    let store = match build_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("❌ Error inicializando el store: {}", e);
            return Err(e);
        }
    };
    info!("✅ Store '{}' listo", store.backend_name());

    let addr: SocketAddr = config.server_url().parse()?;
    let app = school_fleet::create_app(AppState::new(store, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔐 POST /api/auth/login · GET /api/auth/me");
    info!("🚗 /api/vehicle · /api/fuel-logs · /api/maintenance");
    info!("📊 /api/reports · /api/export · /api/backup");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // La dirección del peer identifica al cliente en el rate limiting del login
    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Servidor terminó con error: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

async fn build_store(config: &EnvironmentConfig) -> Result<Arc<dyn FleetStore>> {
    let store: Arc<dyn FleetStore> = match &config.store {
        StoreBackend::Rest { url, api_key } => {
            info!("☁️ Store remoto en {}", url);
            Arc::new(RestStore::new(url, api_key, config.store_timeout)?)
        }
        StoreBackend::Postgres { database_url } => {
            let connection = DatabaseConnection::connect(&DatabaseConfig::new(database_url.clone())).await?;
            Arc::new(PostgresStore::new(connection.pool().clone()))
        }
        StoreBackend::Memory => {
            if !config.is_development() {
                warn!("⚠️ Store en memoria fuera de desarrollo: los datos se pierden al reiniciar");
            }
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
