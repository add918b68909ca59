//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/auth/register`, `/auth/login` - 회원가입/로그인 (요청 제한 적용)
//! - `/profile` - 인증된 사용자 프로필
//! - `/metrics` - Prometheus 메트릭
//! - `/api-docs/openapi.json` - OpenAPI 문서

pub mod auth;
pub mod health;
pub mod profile;

pub use auth::auth_router;
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use profile::profile_router;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Prometheus 메트릭 렌더링.
///
/// GET /metrics
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}

/// OpenAPI 문서.
///
/// GET /api-docs/openapi.json
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// 전체 API 라우터 생성.
///
/// 상태의 Rate Limiter 설정에 따라 `/auth` 하위 라우트에 요청 제한이 적용됩니다.
pub fn create_api_router(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/auth", auth_router(state.rate_limiter.clone()))
        .merge(profile_router())
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(openapi_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = Arc::new(create_test_state());
        create_api_router(&state).with_state(state)
    }

    async fn get_status(uri: &str) -> (StatusCode, String) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_routes_are_mounted() {
        assert_eq!(get_status("/health").await.0, StatusCode::OK);
        assert_eq!(get_status("/health/ready").await.0, StatusCode::OK);
        assert_eq!(get_status("/metrics").await.0, StatusCode::OK);
        assert_eq!(get_status("/profile").await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(get_status("/nope").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_openapi_served() {
        let (status, body) = get_status("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/auth/register"));
        assert!(body.contains("/profile"));
    }
}
