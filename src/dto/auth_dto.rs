use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::auth::{Session, UserRole};

// Login request: el password solo se exige al manager
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(max = 100))]
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: UserRole,
    pub plate: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl LoginResponse {
    pub fn new(token: String, session: Session) -> Self {
        Self {
            token,
            username: session.username,
            role: session.role,
            plate: session.plate,
            expires_at: session.expires_at,
        }
    }
}
