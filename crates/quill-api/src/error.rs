//! API 에러 타입.
//!
//! 서비스 계층의 실패는 모두 [`AppError`]로 표현되며, 핸들러에서
//! 엔드포인트별 메시지와 함께 공통 envelope 응답으로 변환됩니다.
//!
//! | 에러                       | 상태 코드 |
//! |----------------------------|-----------|
//! | `Validation`, `InvalidRoles` | 400     |
//! | `InvalidCredentials`, `Token` | 401    |
//! | `UserNotFound`             | 404       |
//! | `EmailAlreadyRegistered`   | 409       |
//! | `RateLimited`              | 429       |
//! | `Config`, `Persistence`, `Password`, 토큰 발급 실패 | 500 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::auth::{PasswordError, TokenError};
use crate::repository::StoreError;
use crate::response::ApiResponse;

/// 로그인 실패 메시지. 존재하지 않는 이메일과 잘못된 비밀번호가 같은 응답을 받습니다.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid email or password";

/// 내부 오류 시 클라이언트에게 노출되는 메시지.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// 서비스 에러.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 요청 필드 검증 실패 (필드별 메시지)
    #[error("요청 검증 실패: {0:?}")]
    Validation(Vec<String>),

    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error("email already registered")]
    EmailAlreadyRegistered,

    #[error("role IDs are invalid")]
    InvalidRoles,

    #[error("user not found")]
    UserNotFound,

    #[error("설정 에러: {0}")]
    Config(#[from] quill_core::ConfigError),

    #[error("토큰 에러: {0}")]
    Token(#[from] TokenError),

    #[error("비밀번호 처리 에러: {0}")]
    Password(#[from] PasswordError),

    #[error("저장소 에러: {0}")]
    Persistence(#[from] StoreError),

    #[error("Too many requests. Please try again later.")]
    RateLimited,
}

impl AppError {
    /// 에러에 대응하는 HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidRoles => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            // 토큰 발급 실패는 서버 문제
            AppError::Token(TokenError::Encoding(_) | TokenError::ExpiryOutOfRange) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyRegistered => StatusCode::CONFLICT,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Config(_) | AppError::Password(_) | AppError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// envelope의 `errors` 필드 값.
    ///
    /// 서버 내부 에러의 상세 내용은 노출하지 않습니다.
    pub fn details(&self) -> Option<Value> {
        match self {
            AppError::Validation(fields) => Some(json!(fields)),
            AppError::EmailAlreadyRegistered => {
                Some(json!({ "email": "Email already registered" }))
            }
            AppError::RateLimited => None,
            err if err.status_code().is_server_error() => Some(json!(INTERNAL_ERROR_MESSAGE)),
            err => Some(json!(err.to_string())),
        }
    }

    /// 엔드포인트 메시지를 붙여 응답 가능한 에러로 변환.
    pub fn with_message(self, message: &'static str) -> ApiError {
        ApiError {
            message,
            error: self,
        }
    }
}

/// 엔드포인트 메시지가 붙은 에러 응답.
#[derive(Debug)]
pub struct ApiError {
    message: &'static str,
    error: AppError,
}

impl ApiError {
    pub fn error(&self) -> &AppError {
        &self.error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self.error, message = self.message, "Request failed");
        }

        let body = ApiResponse::error(status, self.message, self.error.details());
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::RateLimited => "Too many requests. Please try again later.",
            AppError::Token(TokenError::Expired | TokenError::Invalid) => "Unauthorized",
            _ => "Request failed",
        };
        self.with_message(message).into_response()
    }
}

/// 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::InvalidRoles.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Token(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::EmailAlreadyRegistered.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Persistence(StoreError::Database(sqlx::Error::PoolTimedOut)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Config(quill_core::ConfigError::Missing("JWT_SECRET")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_body() {
        let response = AppError::EmailAlreadyRegistered
            .with_message("Register account failed")
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = body_json(response).await;
        assert_eq!(json["meta"]["code"], 409);
        assert_eq!(json["meta"]["status"], "error");
        assert_eq!(json["meta"]["message"], "Register account failed");
        assert_eq!(json["errors"]["email"], "Email already registered");
    }

    #[tokio::test]
    async fn test_persistence_detail_is_hidden() {
        let response = AppError::Persistence(StoreError::Database(sqlx::Error::PoolTimedOut))
            .with_message("Register account failed")
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["errors"], INTERNAL_ERROR_MESSAGE);
        assert!(!json.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_validation_errors_listed() {
        let response = AppError::Validation(vec![
            "Field email failed on the 'email' tag".to_string(),
        ])
        .with_message("Login failed")
        .into_response();

        let json = body_json(response).await;
        assert_eq!(json["errors"][0], "Field email failed on the 'email' tag");
    }

    #[tokio::test]
    async fn test_invalid_credentials_message() {
        let json = body_json(
            AppError::InvalidCredentials
                .with_message("Login failed")
                .into_response(),
        )
        .await;
        assert_eq!(json["errors"], "invalid email or password");
    }

    #[tokio::test]
    async fn test_rate_limited_body() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let json = body_json(response).await;
        assert_eq!(
            json["meta"]["message"],
            "Too many requests. Please try again later."
        );
        assert!(json.get("errors").is_none());
    }
}
