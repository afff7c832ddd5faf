use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID carried through request extensions and echoed on the response.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Accepts the caller's `x-request-id` or mints a fresh UUIDv4.
///
/// The ID is stored as a [`RequestId`] extension for handlers and set on the
/// outgoing response so clients can correlate logs.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = match req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(supplied) => supplied.to_owned(),
        None => Uuid::new_v4().to_string(),
    };
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Bearer-token auth over the configured `LHX_API_KEYS` list.
///
/// An empty key list disables auth, which only development tolerates; any
/// other environment refuses to start without at least one token.
#[derive(Clone)]
pub struct AuthState {
    accepted: Arc<HashSet<String>>,
}

impl AuthState {
    pub fn new(keys: &[String], is_development: bool) -> anyhow::Result<Self> {
        let accepted: HashSet<String> = keys
            .iter()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if accepted.is_empty() {
            if !is_development {
                anyhow::bail!(
                    "LHX_API_KEYS must provide at least one bearer token outside development"
                );
            }
            tracing::warn!("LHX_API_KEYS empty; bearer auth disabled for development");
        }

        Ok(Self {
            accepted: Arc::new(accepted),
        })
    }

    /// True when no keys are configured and every request passes.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Middleware rejecting protected requests without a configured bearer token.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if auth.disabled() {
        return next.run(req).await;
    }

    let authorized = bearer_token(req.headers().get(AUTHORIZATION))
        .is_some_and(|token| auth.accepted.contains(token));
    if authorized {
        next.run(req).await
    } else {
        reject(&req, "unauthorized", "missing or invalid bearer token")
    }
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

struct Window {
    opened: Instant,
    served: usize,
}

/// Fixed-window request budget shared by all protected routes.
#[derive(Clone)]
pub struct RateLimiter {
    limit: usize,
    per: Duration,
    window: Arc<Mutex<Window>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(limit: usize, per: Duration) -> Self {
        Self {
            limit,
            per,
            window: Arc::new(Mutex::new(Window {
                opened: Instant::now(),
                served: 0,
            })),
        }
    }

    /// Counts one request against the current window, rolling the window over
    /// once it has expired. Returns `false` when the budget is spent.
    async fn try_acquire(&self) -> bool {
        let mut window = self.window.lock().await;
        if window.opened.elapsed() >= self.per {
            window.opened = Instant::now();
            window.served = 0;
        }
        if window.served >= self.limit {
            return false;
        }
        window.served += 1;
        true
    }
}

/// Middleware shedding requests beyond the fixed-window budget.
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    if limiter.try_acquire().await {
        next.run(req).await
    } else {
        reject(&req, "rate_limited", "rate limit exceeded")
    }
}

/// Builds an envelope rejection carrying the request's correlation ID.
fn reject(req: &Request, code: &str, message: &str) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    ApiError::new(request_id, code, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn bearer_token_rejects_non_bearer_scheme() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(bearer_token(Some(&header)), None);
    }

    #[test]
    fn bearer_token_rejects_blank_token() {
        let header = HeaderValue::from_static("Bearer   ");
        assert_eq!(bearer_token(Some(&header)), None);
    }

    #[test]
    fn auth_disabled_without_keys_in_development() {
        let auth = AuthState::new(&[], true).expect("development tolerates empty keys");
        assert!(auth.disabled());
    }

    #[test]
    fn auth_required_outside_development() {
        assert!(AuthState::new(&[], false).is_err());
    }

    #[test]
    fn auth_enabled_with_keys() {
        let auth = AuthState::new(&["secret".to_string()], false).expect("keys accepted");
        assert!(!auth.disabled());
    }

    #[tokio::test]
    async fn rate_limiter_exhausts_then_rolls_over() {
        let limiter = RateLimiter::new(2, Duration::from_millis(20));
        assert!(limiter.try_acquire().await);
        assert!(limiter.try_acquire().await);
        assert!(!limiter.try_acquire().await);

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(limiter.try_acquire().await);
    }
}
