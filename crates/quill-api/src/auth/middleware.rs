//! Bearer 토큰 인증 추출기.
//!
//! 보호된 핸들러는 [`AuthUser`]를 인자로 받아 인증된 사용자 ID를 얻습니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::TokenError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// 인증 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn profile(AuthUser(user_id): AuthUser) -> impl IntoResponse {
///     format!("Authenticated user: {}", user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

/// 인증 실패.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing or invalid token")]
    MissingToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    InvalidToken,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ApiResponse::error(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            Some(json!(self.to_string())),
        );
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// `Authorization` 헤더에서 Bearer 토큰 부분을 꺼냅니다.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;

        let claims = state.tokens.validate(token).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            AuthError::from(e)
        })?;

        Ok(AuthUser(claims.user_id))
    }
}
