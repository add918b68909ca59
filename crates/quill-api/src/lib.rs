//! 사용자 인증 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (회원가입, 로그인, 프로필)
//! - JWT Bearer 인증
//! - 클라이언트 주소별 요청 제한
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 비밀번호 해싱, 토큰 발급/검증, 인증 추출기
//! - [`services`]: 회원가입/로그인/프로필 비즈니스 로직
//! - [`repository`]: 사용자/역할 저장소
//! - [`db`]: 연결 풀 생성, 마이그레이션, 역할 시딩
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서

pub mod auth;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod types;

pub use auth::{hash_password, verify_password, AuthUser, Claims, TokenIssuer};
pub use error::{ApiError, ApiResult, AppError};
pub use metrics::setup_metrics_recorder;
pub use middleware::{metrics_layer, RateLimiter};
pub use repository::{InMemoryUserStore, PgUserStore, StoreError, UserStore};
pub use response::ApiResponse;
pub use routes::create_api_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
