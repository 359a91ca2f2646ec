use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Roles del sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Manager,
    Driver,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Manager => "manager",
            UserRole::Driver => "driver",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "manager" => Some(UserRole::Manager),
            "driver" => Some(UserRole::Driver),
            _ => None,
        }
    }
}

/// Claims del JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // manager o nombre del conductor
    pub role: String,
    pub plate: Option<String>, // Solo para conductores
    pub exp: i64,
    pub iat: i64,
}

/// Sesión explícita de cada request, decodificada del token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: UserRole,
    pub plate: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }

    /// Managers operan sobre cualquier vehículo, conductores solo sobre el suyo
    pub fn can_operate(&self, plate: &str) -> bool {
        match self.role {
            UserRole::Manager => true,
            UserRole::Driver => self.plate.as_deref() == Some(plate),
        }
    }
}
