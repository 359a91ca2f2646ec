use std::sync::Arc;

use tracing::info;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::models::auth::UserRole;
use crate::repositories::FleetStore;
use crate::services::jwt_service::JwtService;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::normalize_driver;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Credenciales del manager: usuario y hash bcrypt
#[derive(Debug, Clone)]
pub struct ManagerCredentials {
    pub username: String,
    pub password_hash: String,
}

/// Servicio de autenticación
pub struct AuthService {
    store: Arc<dyn FleetStore>,
    jwt: JwtService,
    manager: ManagerCredentials,
}

impl AuthService {
    pub fn new(store: Arc<dyn FleetStore>, jwt: JwtService, manager: ManagerCredentials) -> Self {
        Self { store, jwt, manager }
    }

    /// Autentica un usuario (manager o conductor)
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let username = request.username.trim();

        if username.eq_ignore_ascii_case(&self.manager.username) {
            self.authenticate_manager(request.password.as_deref()).await
        } else {
            self.authenticate_driver(username).await
        }
    }

    async fn authenticate_manager(&self, password: Option<&str>) -> AppResult<LoginResponse> {
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?
            .to_string();
        let hash = self.manager.password_hash.clone();

        // bcrypt es costoso, fuera del runtime async
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password check aborted: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))?;

        if !valid {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let (token, session) = self.jwt.issue(UserRole::Manager.as_str(), UserRole::Manager, None)?;
        info!("🔐 Manager autenticado");
        Ok(LoginResponse::new(token, session))
    }

    /// El conductor se identifica por el nombre registrado en su vehículo
    async fn authenticate_driver(&self, username: &str) -> AppResult<LoginResponse> {
        let vehicle = self
            .store
            .find_vehicle_by_driver(username)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let driver = normalize_driver(&vehicle.driver);
        let (token, session) = self.jwt.issue(&driver, UserRole::Driver, Some(vehicle.plate.clone()))?;
        info!("🔐 Conductor {} autenticado para {}", driver, vehicle.plate);
        Ok(LoginResponse::new(token, session))
    }
}
