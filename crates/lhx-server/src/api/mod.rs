mod concierge;
mod explore;
mod search;
mod similar;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use lhx_core::AppConfig;
use lhx_providers::{ChatProvider, EmbeddingProvider, ProviderError, SearchProvider, VectorIndex};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimiter, RequestId,
};

const REQUESTS_PER_MINUTE: usize = 120;

/// Shared handler state: configuration plus the once-per-process provider
/// clients. A `None` provider means its API key is not configured and the
/// corresponding route degrades gracefully.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub search: Option<Arc<dyn SearchProvider>>,
    pub embeddings: Option<Arc<dyn EmbeddingProvider>>,
    pub chat: Option<Arc<dyn ChatProvider>>,
    pub vectors: Option<Arc<dyn VectorIndex>>,
}

/// Success envelope: payload under `data`, correlation info under `meta`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub(crate) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

/// Error envelope mirroring [`ApiResponse`], mapped to a status by its code.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_page(page: Option<usize>) -> usize {
    page.unwrap_or(1).max(1)
}

pub(super) fn normalize_per_page(per_page: Option<usize>) -> usize {
    per_page.unwrap_or(12).clamp(1, 50)
}

pub(super) fn map_provider_error(request_id: String, error: &ProviderError) -> ApiError {
    tracing::error!(error = %error, "provider request failed");
    ApiError::new(request_id, "upstream_error", "provider request failed")
}

#[must_use]
pub fn default_rate_limiter() -> RateLimiter {
    RateLimiter::new(REQUESTS_PER_MINUTE, Duration::from_secs(60))
}

pub fn build_app(state: AppState, auth: AuthState, rate_limiter: RateLimiter) -> Router {
    let protected = Router::new()
        .route("/api/v1/search", get(search::search_listings))
        .route("/api/v1/explore", get(explore::list_categories))
        .route("/api/v1/similar", get(similar::find_similar))
        .route("/api/v1/similar/index", post(similar::index_listing))
        .route("/api/v1/concierge", post(concierge::concierge))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limiter,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        );

    // Health stays public so load balancers can probe without credentials.
    Router::new()
        .route("/api/v1/health", get(health))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    search: &'static str,
    concierge: &'static str,
    similarity: &'static str,
}

fn provider_status(configured: bool) -> &'static str {
    if configured {
        "configured"
    } else {
        "disabled"
    }
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<HealthData>> {
    let data = HealthData {
        status: "ok",
        search: provider_status(state.search.is_some()),
        concierge: provider_status(state.chat.is_some()),
        similarity: provider_status(state.embeddings.is_some() && state.vectors.is_some()),
    };
    Json(ApiResponse::new(data, req_id.0))
}


#[cfg(test)]
mod tests {
    use super::test_support::{bare_state, test_app};
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn normalize_page_applies_defaults_and_floor() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some(0)), 1);
        assert_eq!(normalize_page(Some(7)), 7);
    }

    #[test]
    fn normalize_per_page_applies_defaults_and_bounds() {
        assert_eq!(normalize_per_page(None), 12);
        assert_eq!(normalize_per_page(Some(0)), 1);
        assert_eq!(normalize_per_page(Some(1_000)), 50);
        assert_eq!(normalize_per_page(Some(24)), 24);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_upstream_error_maps_to_bad_gateway() {
        let response = ApiError::new("req-1", "upstream_error", "provider down").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_reports_disabled_providers() {
        let app = test_app(bare_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["search"], "disabled");
        assert_eq!(json["data"]["concierge"], "disabled");
        assert_eq!(json["data"]["similarity"], "disabled");
    }

    #[tokio::test]
    async fn responses_carry_request_id_header_and_meta() {
        let app = test_app(bare_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-fixture-1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
            Some("req-fixture-1")
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["meta"]["request_id"], "req-fixture-1");
    }

    #[tokio::test]
    async fn protected_route_rejects_bad_token_when_auth_enabled() {
        let auth = AuthState::new(&["right-key".to_string()], true).expect("auth");
        let app = build_app(bare_state(), auth, default_rate_limiter());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/explore")
                    .header("authorization", "Bearer wrong-key")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["error"]["code"], "unauthorized");
    }

    #[tokio::test]
    async fn health_stays_public_when_auth_enabled() {
        let auth = AuthState::new(&["right-key".to_string()], true).expect("auth");
        let app = build_app(bare_state(), auth, default_rate_limiter());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
