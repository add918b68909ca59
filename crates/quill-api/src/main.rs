//! Quill API 서버 진입점.
//!
//! 설정 로드, 로깅/메트릭 초기화, 데이터베이스 준비 후 HTTP 서버를 시작합니다.
//!
//! `--export-openapi` 인자 또는 `EXPORT_OPENAPI=1`이 주어지면 OpenAPI 문서를
//! stdout으로 출력하고 종료합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;

use quill_api::auth::TokenIssuer;
use quill_api::db::{connect_pool, prepare_schema};
use quill_api::metrics::setup_metrics_recorder;
use quill_api::middleware::{metrics_layer, RateLimitConfig, RateLimiter};
use quill_api::openapi::ApiDoc;
use quill_api::repository::PgUserStore;
use quill_api::routes::create_api_router;
use quill_api::state::AppState;
use quill_core::{init_logging, AppConfig, LogConfig, ServerConfig};

/// OpenAPI 내보내기 요청 여부.
fn export_openapi_requested() -> bool {
    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    export_flag || export_env
}

/// CORS 레이어 생성.
///
/// `server.cors_origins`가 비어 있으면 모든 origin을 허용합니다 (개발 모드).
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        warn!("CORS origins not configured, allowing any origin (development mode)");
        layer.allow_origin(AllowOrigin::any())
    } else {
        info!("CORS configured with {} allowed origins", origins.len());
        // 자격 증명은 명시적 origin 목록에서만 허용
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// 라우터 생성.
fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    create_api_router(&state)
        .with_state(state)
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(cors_layer(config))
}

/// 애플리케이션 상태 생성.
async fn create_app_state(
    config: &AppConfig,
    metrics_handle: PrometheusHandle,
) -> anyhow::Result<AppState> {
    let pool = connect_pool(&config.database)
        .await
        .context("database connection")?;
    prepare_schema(&pool).await.context("database schema")?;

    let tokens = TokenIssuer::from_config(&config.auth)?;

    let mut state = AppState::new(Arc::new(PgUserStore::new(pool)), Arc::new(tokens))
        .with_metrics(metrics_handle);

    if config.rate_limit.enabled {
        let limiter_config = RateLimitConfig::from(&config.rate_limit);
        info!(
            requests_per_second = limiter_config.requests_per_second,
            burst = limiter_config.burst,
            "Rate limiting enabled for /auth"
        );
        state = state.with_rate_limiter(RateLimiter::new(limiter_config));
    } else {
        warn!("Rate limiting DISABLED");
    }

    Ok(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    if export_openapi_requested() {
        println!("{}", serde_json::to_string_pretty(&ApiDoc::openapi())?);
        return Ok(());
    }

    let config = AppConfig::load()?;
    config.validate()?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("logging init failed: {}", e))?;

    info!("Starting Quill API server...");

    // Prometheus 메트릭 레코더 설정
    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let state = Arc::new(create_app_state(&config, metrics_handle).await?);
    info!(
        version = %state.version,
        rate_limited = state.rate_limiter.is_some(),
        "Application state initialized"
    );

    let app = create_router(state, &config.server);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {}", addr))?;

    info!(%addr, "API server listening");
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown completed");
    Ok(())
}

/// 종료 시그널 대기 (Ctrl+C, SIGTERM).
///
/// 핸들러 설치에 실패한 시그널은 무시하고 나머지 시그널만 기다립니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
