//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. No hay sesión global: cada request trae
//! su propio token.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::repositories::FleetStore;
use crate::services::{AuthService, JwtService, ManagerCredentials};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FleetStore>,
    pub config: EnvironmentConfig,
    pub jwt: JwtService,
    pub auth: Arc<AuthService>,
    pub rate_limit: RateLimitState,
}

impl AppState {
    pub fn new(store: Arc<dyn FleetStore>, config: EnvironmentConfig) -> Self {
        let jwt = JwtService::from_config(&config);
        let manager = ManagerCredentials {
            username: config.manager_username.clone(),
            password_hash: config.manager_password_hash.clone(),
        };
        let auth = Arc::new(AuthService::new(store.clone(), jwt.clone(), manager));
        let rate_limit = RateLimitState::new(&config);

        Self {
            store,
            config,
            jwt,
            auth,
            rate_limit,
        }
    }
}
