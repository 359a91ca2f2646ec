//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Los secretos del store
//! (URL y clave) son obligatorios para el backend remoto: si faltan o son
//! inválidos el arranque falla.

use std::collections::HashMap;
use std::time::Duration;

use crate::utils::errors::{AppError, AppResult};

/// Backend de almacenamiento seleccionado
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    /// Database-as-a-service remoto (PostgREST)
    Rest { url: String, api_key: String },
    /// PostgreSQL directo con migraciones sqlx
    Postgres { database_url: String },
    /// Tablas en memoria, solo desarrollo
    Memory,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub store: StoreBackend,
    pub store_timeout: Duration,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub manager_username: String,
    pub manager_password_hash: String,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    /// Solo detrás de un proxy propio se cree en `x-forwarded-for`
    pub trust_proxy: bool,
}

impl EnvironmentConfig {
    /// Leer la configuración del entorno del proceso
    pub fn from_env() -> AppResult<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Construir la configuración a partir de un mapa de variables
    pub fn from_vars(vars: HashMap<String, String>) -> AppResult<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| get(key).ok_or_else(|| AppError::Config(format!("{} must be set", key)));

        let store = match get("STORE_BACKEND").as_deref().unwrap_or("rest") {
            "rest" => {
                let url = require("FLEET_STORE_URL")?;
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(AppError::Config("FLEET_STORE_URL must be an http(s) URL".to_string()));
                }
                StoreBackend::Rest {
                    url,
                    api_key: require("FLEET_STORE_KEY")?,
                }
            }
            "postgres" => StoreBackend::Postgres {
                database_url: require("DATABASE_URL")?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::Config(format!(
                    "STORE_BACKEND '{}' is not one of rest, postgres, memory",
                    other
                )))
            }
        };

        let jwt_secret = require("JWT_SECRET")?;
        if jwt_secret.len() < 16 {
            return Err(AppError::Config("JWT_SECRET must be at least 16 characters".to_string()));
        }

        let manager_password_hash = require("MANAGER_PASSWORD_HASH")?;
        if !manager_password_hash.starts_with("$2") {
            return Err(AppError::Config("MANAGER_PASSWORD_HASH must be a bcrypt hash".to_string()));
        }

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: parse_or(&get("PORT"), "PORT", 3000)?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            store,
            store_timeout: Duration::from_secs(parse_or(&get("STORE_TIMEOUT_SECS"), "STORE_TIMEOUT_SECS", 30)?),
            jwt_secret,
            jwt_expiration: parse_or(&get("JWT_EXPIRATION"), "JWT_EXPIRATION", 43_200)?,
            manager_username: get("MANAGER_USERNAME").unwrap_or_else(|| "manager".to_string()),
            manager_password_hash,
            cors_origins: get("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            rate_limit_requests: parse_or(&get("RATE_LIMIT_REQUESTS"), "RATE_LIMIT_REQUESTS", 20)?,
            rate_limit_window: parse_or(&get("RATE_LIMIT_WINDOW"), "RATE_LIMIT_WINDOW", 60)?,
            trust_proxy: parse_or(&get("TRUST_PROXY"), "TRUST_PROXY", false)?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(value: &Option<String>, key: &str, default: T) -> AppResult<T> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        [
            ("FLEET_STORE_URL", "https://fleet.example.co"),
            ("FLEET_STORE_KEY", "service-key"),
            ("JWT_SECRET", "a-very-long-test-secret"),
            ("MANAGER_PASSWORD_HASH", "$2b$04$abcdefghijklmnopqrstuv"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_defaults_with_rest_backend() {
        let config = EnvironmentConfig::from_vars(base_vars()).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.manager_username, "manager");
        assert_eq!(config.store_timeout, Duration::from_secs(30));
        assert!(config.cors_origins.is_empty());
        assert!(!config.trust_proxy);
        assert!(matches!(config.store, StoreBackend::Rest { .. }));
    }

    #[test]
    fn test_missing_store_secret_is_fatal() {
        let mut vars = base_vars();
        vars.remove("FLEET_STORE_KEY");
        let err = EnvironmentConfig::from_vars(vars).unwrap_err();
        assert!(err.to_string().contains("FLEET_STORE_KEY"));
    }

    #[test]
    fn test_invalid_store_url_is_fatal() {
        let mut vars = base_vars();
        vars.insert("FLEET_STORE_URL".into(), "fleet.example.co".into());
        assert!(EnvironmentConfig::from_vars(vars).is_err());
    }

    #[test]
    fn test_memory_backend_needs_no_store_secrets() {
        let mut vars = base_vars();
        vars.remove("FLEET_STORE_URL");
        vars.remove("FLEET_STORE_KEY");
        vars.insert("STORE_BACKEND".into(), "memory".into());
        vars.insert("CORS_ORIGINS".into(), "http://a.test, http://b.test".into());
        let config = EnvironmentConfig::from_vars(vars).unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let mut vars = base_vars();
        vars.insert("PORT".into(), "eighty".into());
        assert!(EnvironmentConfig::from_vars(vars).is_err());
    }

    #[test]
    fn test_trust_proxy_flag() {
        let mut vars = base_vars();
        vars.insert("TRUST_PROXY".into(), "true".into());
        assert!(EnvironmentConfig::from_vars(vars.clone()).unwrap().trust_proxy);

        vars.insert("TRUST_PROXY".into(), "yes".into());
        let err = EnvironmentConfig::from_vars(vars).unwrap_err();
        assert!(err.to_string().contains("TRUST_PROXY"));
    }
}
