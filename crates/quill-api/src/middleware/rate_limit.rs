//! Rate limiting middleware.
//!
//! 클라이언트 주소별 Token Bucket. 버킷은 용량이 제한된 LRU에 보관되며,
//! 오래 사용되지 않은 버킷은 요청 처리 중에 함께 정리됩니다.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lru::LruCache;
use quill_core::RateLimitSettings;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::metrics::record_rate_limit;

/// Rate Limiter 설정.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// 초당 리필되는 토큰 수
    pub requests_per_second: u32,
    /// 버킷 용량 (연속으로 허용되는 최대 요청 수)
    pub burst: u32,
    /// 동시에 추적하는 최대 클라이언트 수
    pub max_tracked_clients: usize,
    /// 이 시간 동안 요청이 없던 버킷은 제거
    pub idle_ttl: Duration,
    /// 전달 헤더를 신뢰할 프록시 주소
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::from(&RateLimitSettings::default())
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            requests_per_second: settings.requests_per_second,
            burst: settings.burst,
            max_tracked_clients: settings.max_tracked_clients,
            idle_ttl: Duration::from_secs(settings.idle_ttl_secs),
            trusted_proxies: settings.trusted_proxies.clone(),
        }
    }
}

/// Token Bucket 구조체.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    max_tokens: f64,
    refill_rate: f64,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig, now: Instant) -> Self {
        // 버스트 0이어도 최소 1개 요청은 허용
        let max_tokens = f64::from(config.burst.max(1));

        Self {
            tokens: max_tokens,
            last_refill: now,
            max_tokens,
            refill_rate: f64::from(config.requests_per_second),
        }
    }

    /// 토큰 소비 시도.
    fn try_acquire(&mut self, now: Instant) -> bool {
        self.refill(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
    }

    /// 다음 토큰까지 대기 시간 (초, 최소 1).
    fn retry_after_secs(&self) -> u64 {
        if self.refill_rate <= 0.0 {
            return 1;
        }
        (((1.0 - self.tokens) / self.refill_rate).ceil() as u64).max(1)
    }
}

/// Rate Limit 확인 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// 요청 허용됨
    Allowed,
    /// Rate limit 초과
    Limited {
        /// 재시도까지 대기 시간 (초)
        retry_after: u64,
    },
}

/// Rate Limiter.
///
/// 클라이언트 IP별 버킷을 최대 `max_tracked_clients`개까지 유지합니다.
/// 상한을 넘으면 가장 오래 사용되지 않은 버킷이 제거됩니다.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<Mutex<LruCache<IpAddr, TokenBucket>>>,
}

impl RateLimiter {
    /// 새 Rate Limiter 생성.
    pub fn new(config: RateLimitConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_tracked_clients).unwrap_or(NonZeroUsize::MIN);

        Self {
            config,
            buckets: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// 기본 설정으로 생성.
    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default())
    }

    /// 요청 허용 여부 확인.
    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        self.check_at(ip, Instant::now()).await
    }

    /// 지정한 시각 기준으로 요청 허용 여부 확인.
    pub async fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitResult {
        let mut buckets = self.buckets.lock().await;

        Self::evict_idle(&mut buckets, now, self.config.idle_ttl);

        if !buckets.contains(&ip) {
            // 용량이 차 있으면 LRU 항목이 밀려남
            buckets.put(ip, TokenBucket::new(&self.config, now));
        }

        let Some(bucket) = buckets.get_mut(&ip) else {
            return RateLimitResult::Allowed;
        };

        if bucket.try_acquire(now) {
            RateLimitResult::Allowed
        } else {
            RateLimitResult::Limited {
                retry_after: bucket.retry_after_secs(),
            }
        }
    }

    /// LRU 끝에서부터 유휴 버킷 제거.
    fn evict_idle(buckets: &mut LruCache<IpAddr, TokenBucket>, now: Instant, ttl: Duration) {
        while let Some((_, bucket)) = buckets.peek_lru() {
            if now.saturating_duration_since(bucket.last_refill) < ttl {
                break;
            }
            buckets.pop_lru();
        }
    }

    /// 요청의 클라이언트 IP.
    pub fn client_ip(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> IpAddr {
        client_ip(headers, peer, &self.config.trusted_proxies)
    }

    /// 현재 추적 중인 클라이언트 수.
    pub async fn tracked_clients(&self) -> usize {
        self.buckets.lock().await.len()
    }
}

/// Rate Limiting 미들웨어 함수.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = limiter.client_ip(
        request.headers(),
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr),
    );

    match limiter.check(ip).await {
        RateLimitResult::Allowed => {
            record_rate_limit("allowed");
            next.run(request).await
        }
        RateLimitResult::Limited { retry_after } => {
            record_rate_limit("limited");
            tracing::warn!(client_ip = %ip, retry_after, "Rate limit exceeded");

            let mut response = AppError::RateLimited.into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}

/// 클라이언트 IP 결정.
///
/// 소켓 주소가 신뢰 프록시일 때만 `X-Forwarded-For`의 첫 주소, `X-Real-IP` 순으로
/// 헤더를 확인합니다. 그 외에는 소켓 주소를 사용합니다.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trusted: &[IpAddr]) -> IpAddr {
    let peer_ip = peer.map(|addr| addr.ip());

    let from_trusted_proxy = peer_ip.is_some_and(|ip| trusted.contains(&ip));
    if !from_trusted_proxy {
        return peer_ip.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    let forwarded: Option<IpAddr> = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());

    let real_ip = || -> Option<IpAddr> {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    };

    forwarded
        .or_else(real_ip)
        .or(peer_ip)
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
