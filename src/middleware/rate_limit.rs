//! Middleware de Rate Limiting
//!
//! Limita los intentos de login por dirección de cliente dentro de una
//! ventana fija.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::EnvironmentConfig;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Contador por cliente dentro de la ventana actual
#[derive(Debug, Clone)]
struct RateLimitInfo {
    requests: u32,
    window_start: Instant,
}

/// Estado compartido del rate limiting
#[derive(Clone)]
pub struct RateLimitState {
    requests: Arc<RwLock<HashMap<String, RateLimitInfo>>>,
    max_requests: u32,
    window_duration: Duration,
    trust_proxy: bool,
}

impl RateLimitState {
    pub fn new(config: &EnvironmentConfig) -> Self {
        let mut state = Self::with_limits(config.rate_limit_requests, Duration::from_secs(config.rate_limit_window));
        state.trust_proxy = config.trust_proxy;
        state
    }

    pub fn with_limits(max_requests: u32, window_duration: Duration) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window_duration,
            trust_proxy: false,
        }
    }

    /// Registra un intento; devuelve false si el cliente superó el límite
    pub async fn check(&self, client: &str) -> bool {
        let mut requests = self.requests.write().await;
        let now = Instant::now();

        // Limpiar ventanas expiradas
        requests.retain(|_, info| now.duration_since(info.window_start) < self.window_duration);

        let info = requests.entry(client.to_string()).or_insert(RateLimitInfo {
            requests: 0,
            window_start: now,
        });

        if info.requests >= self.max_requests {
            return false;
        }

        info.requests += 1;
        true
    }
}

/// Dirección del cliente.
///
/// Se usa la IP del peer TCP (`ConnectInfo`); `x-forwarded-for` solo cuenta
/// con `TRUST_PROXY`, porque cualquier cliente puede escribir ese header.
fn client_key(request: &Request, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| {
            request
                .headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.split(',').next())
                .map(|ip| ip.trim().to_string())
                .filter(|ip| !ip.is_empty())
        })
        .flatten();

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware para endpoints sensibles (login)
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_key(&request, state.rate_limit.trust_proxy);

    if !state.rate_limit.check(&client).await {
        tracing::warn!("🚫 Rate limit de login superado para {}", client);
        return Err(AppError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn login_request(peer: &str, forwarded_for: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/auth/login");
        if let Some(value) = forwarded_for {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    }

    #[test]
    fn test_client_key_uses_peer_address() {
        let request = login_request("10.0.0.7:51000", Some("203.0.113.9"));
        assert_eq!(client_key(&request, false), "10.0.0.7");
        assert_eq!(client_key(&request, true), "203.0.113.9");

        let direct = login_request("10.0.0.7:51000", None);
        assert_eq!(client_key(&direct, true), "10.0.0.7");
    }

    #[tokio::test]
    async fn test_limit_per_client() {
        let limiter = RateLimitState::with_limits(2, Duration::from_secs(60));
        assert!(limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.1").await);
        assert!(!limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_window_expires() {
        let limiter = RateLimitState::with_limits(1, Duration::from_millis(20));
        assert!(limiter.check("10.0.0.1").await);
        assert!(!limiter.check("10.0.0.1").await);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(limiter.check("10.0.0.1").await);
    }
}
