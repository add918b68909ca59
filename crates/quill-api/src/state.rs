//! 애플리케이션 공유 상태.
//!
//! 모든 핸들러가 `State<Arc<AppState>>`로 접근합니다.
//! 생성 이후 변경되지 않으며, 내부 동기화가 필요한 자원(DB 풀, Rate Limiter)은
//! 각 타입이 직접 관리합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::auth::TokenIssuer;
use crate::middleware::RateLimiter;
use crate::repository::UserStore;
use crate::services::{AuthService, ProfileService};

/// 애플리케이션 상태.
pub struct AppState {
    /// 회원가입/로그인 서비스
    pub auth: AuthService,

    /// 프로필 조회 서비스
    pub profiles: ProfileService,

    /// 토큰 발급기 (인증 추출기에서 검증용으로 사용)
    pub tokens: Arc<TokenIssuer>,

    /// 사용자 저장소 (헬스 체크용)
    pub store: Arc<dyn UserStore>,

    /// `/auth/*` 요청 제한 (비활성화 시 None)
    pub rate_limiter: Option<RateLimiter>,

    /// Prometheus 렌더링 핸들
    pub metrics: Option<PrometheusHandle>,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 저장소와 토큰 발급기로 상태 생성.
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            auth: AuthService::new(store.clone(), tokens.clone()),
            profiles: ProfileService::new(store.clone()),
            tokens,
            store,
            rate_limiter: None,
            metrics: None,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Rate Limiter 설정.
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Prometheus 핸들 설정.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}

/// 테스트용 상태 생성.
///
/// 기본 역할이 시딩된 인메모리 저장소를 사용하며 요청 제한은 꺼져 있습니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use crate::metrics::detached_metrics_handle;
    use crate::repository::InMemoryUserStore;

    let tokens = TokenIssuer::new(
        "test-secret-key-for-quill-api-tests-0123456789",
        chrono::Duration::hours(crate::auth::DEFAULT_TOKEN_TTL_HOURS),
    )
    .expect("test secret is non-empty");

    AppState::new(Arc::new(InMemoryUserStore::seeded()), Arc::new(tokens))
        .with_metrics(detached_metrics_handle())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_defaults() {
        let state = create_test_state();
        assert!(state.rate_limiter.is_none());
        assert!(state.metrics.is_some());
        assert!(state.uptime_secs() >= 0);
        assert!(state.is_store_healthy().await);
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
    }
}
