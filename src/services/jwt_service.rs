use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::environment::EnvironmentConfig;
use crate::models::auth::{JwtClaims, Session, UserRole};
use crate::utils::errors::{AppError, AppResult};

/// Servicio JWT: emite y valida los tokens de sesión
#[derive(Clone)]
pub struct JwtService {
    algorithm: Algorithm,
    session_duration: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            session_duration: Duration::seconds(expiration_secs as i64),
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expiration)
    }

    /// Genera el token de una sesión nueva
    pub fn issue(&self, username: &str, role: UserRole, plate: Option<String>) -> AppResult<(String, Session)> {
        let now = Utc::now();
        let expires_at = now + self.session_duration;

        let claims = JwtClaims {
            sub: username.to_string(),
            role: role.as_str().to_string(),
            plate: plate.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Jwt(format!("Error generating token: {}", e)))?;

        let session = Session {
            username: username.to_string(),
            role,
            plate,
            expires_at: timestamp(claims.exp)?,
        };
        Ok((token, session))
    }

    /// Valida y decodifica un token en una sesión
    pub fn verify(&self, token: &str) -> AppResult<Session> {
        let validation = Validation::new(self.algorithm);
        let claims = decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))?
            .claims;

        let role = UserRole::from_str(&claims.role)
            .ok_or_else(|| AppError::Jwt(format!("Unknown role '{}'", claims.role)))?;

        Ok(Session {
            username: claims.sub,
            role,
            plate: claims.plate,
            expires_at: timestamp(claims.exp)?,
        })
    }
}

fn timestamp(secs: i64) -> AppResult<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| AppError::Jwt("Invalid expiration".to_string()))
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> AppResult<&str> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization header must start with 'Bearer '".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Token cannot be empty".to_string()));
    }
    Ok(token)
}
