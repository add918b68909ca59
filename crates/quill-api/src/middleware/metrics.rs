//! 요청 단위 HTTP 메트릭 수집.
//!
//! 라벨의 경로 값은 매칭된 라우트 템플릿(`/auth/login`)만 사용합니다.
//! 매칭되지 않은 요청은 모두 [`UNMATCHED_ROUTE`] 하나로 묶여 시계열 수가 라우트 수로 제한됩니다.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::metrics::{record_http_duration, record_http_request, record_http_response};

/// 라우트에 매칭되지 않은 요청의 경로 라벨.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// 요청의 경로 라벨.
fn route_label(request: &Request) -> &str {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or(UNMATCHED_ROUTE)
}

/// 모든 요청에 대해 요청 수, 상태별 응답 수, 처리 시간을 기록합니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let method = request.method().as_str().to_owned();
    let route = route_label(&request).to_owned();
    record_http_request(&method, &route);

    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed = started.elapsed();

    record_http_response(&method, &route, response.status().as_u16());
    record_http_duration(&method, &route, elapsed.as_secs_f64());

    response
}
