//! 공통 응답 envelope.
//!
//! 인증/프로필 엔드포인트는 모두 같은 형식으로 응답합니다:
//!
//! ```json
//! {
//!   "meta": { "code": 201, "status": "success", "message": "Account registered successfully" },
//!   "data": { ... }
//! }
//! ```
//!
//! 실패 시 `data` 대신 `errors`가 채워집니다.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// 성공 상태 문자열.
pub const STATUS_SUCCESS: &str = "success";
/// 실패 상태 문자열.
pub const STATUS_ERROR: &str = "error";

/// 응답 메타데이터.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Meta {
    /// HTTP 상태 코드
    pub code: u16,
    /// "success" 또는 "error"
    pub status: String,
    /// 사람이 읽을 수 있는 메시지
    pub message: String,
}

/// 페이지네이션 메타데이터.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub limit: u32,
    pub total_items: i64,
}

impl PaginationMeta {
    /// 전체 항목 수와 페이지 크기로 페이지 수를 계산합니다.
    pub fn new(current_page: u32, limit: u32, total_items: i64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            let items = total_items.max(0) as u64;
            items.div_ceil(u64::from(limit)) as u32
        };

        Self {
            current_page,
            total_pages,
            limit,
            total_items,
        }
    }
}

/// 응답 envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl<T> ApiResponse<T> {
    fn meta(status_code: StatusCode, status: &str, message: impl Into<String>) -> Meta {
        Meta {
            code: status_code.as_u16(),
            status: status.to_string(),
            message: message.into(),
        }
    }

    /// 성공 응답.
    pub fn success(status_code: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            meta: Self::meta(status_code, STATUS_SUCCESS, message),
            data: Some(data),
            pagination: None,
            errors: None,
        }
    }

    /// 페이지네이션 정보를 포함한 성공 응답.
    pub fn paginated(
        status_code: StatusCode,
        message: impl Into<String>,
        data: T,
        pagination: PaginationMeta,
    ) -> Self {
        Self {
            meta: Self::meta(status_code, STATUS_SUCCESS, message),
            data: Some(data),
            pagination: Some(pagination),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    /// 실패 응답. `errors`가 `None`이면 필드가 생략됩니다.
    pub fn error(status_code: StatusCode, message: impl Into<String>, errors: Option<Value>) -> Self {
        Self {
            meta: Self::meta(status_code, STATUS_ERROR, message),
            data: None,
            pagination: None,
            errors,
        }
    }
}
