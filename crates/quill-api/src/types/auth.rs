//! 인증 요청/응답 타입.

use quill_core::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

/// 최소 비밀번호 길이.
pub const MIN_PASSWORD_LENGTH: u64 = 6;

// ==================== 커스텀 검증 함수 ====================

/// 필수 + 이메일 형식
fn validate_email_address(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("required"));
    }
    if !value.validate_email() {
        return Err(ValidationError::new("email"));
    }
    Ok(())
}

/// 필수 + 최소 길이
fn validate_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("required"));
    }
    if (value.chars().count() as u64) < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new("min"));
    }
    Ok(())
}

/// 역할 ID는 모두 양수여야 함
fn validate_role_ids(ids: &[i64]) -> Result<(), ValidationError> {
    if ids.iter().any(|id| *id <= 0) {
        return Err(ValidationError::new("gt"));
    }
    Ok(())
}

// ==================== 요청 타입 ====================

/// 회원가입 요청.
///
/// 누락된 필드는 빈 값으로 채워진 뒤 검증 단계에서 `required`로 거부됩니다.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,

    #[validate(custom(function = "validate_email_address"))]
    pub email: String,

    #[validate(custom(function = "validate_password"))]
    pub password: String,

    /// 부여할 역할 ID 목록 (1개 이상)
    #[validate(
        length(min = 1, code = "required"),
        custom(function = "validate_role_ids")
    )]
    pub role_ids: Vec<i64>,
}

/// 로그인 요청.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,

    #[validate(length(min = 1, code = "required"))]
    pub password: String,
}

// ==================== 응답 타입 ====================

/// 로그인 성공 응답.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer 토큰
    pub token: String,
    pub user: User,
}

/// 검증 에러를 필드별 메시지로 변환합니다.
///
/// 필드당 첫 번째 실패만 보고하며, 결과는 필드 이름 순으로 정렬됩니다.
pub fn format_validation_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .filter_map(|(field, errs)| {
            errs.first()
                .map(|e| format!("Field {} failed on the '{}' tag", field, e.code))
        })
        .collect();

    messages.sort();
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_register() -> RegisterRequest {
        RegisterRequest {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "secret1".to_string(),
            role_ids: vec![1],
        }
    }

    fn messages(request: &impl Validate) -> Vec<String> {
        format_validation_errors(&request.validate().unwrap_err())
    }

    #[test]
    fn test_valid_register_request() {
        assert!(valid_register().validate().is_ok());
    }

    #[test]
    fn test_short_password() {
        let request = RegisterRequest {
            password: "12345".to_string(),
            ..valid_register()
        };
        assert_eq!(
            messages(&request),
            vec!["Field password failed on the 'min' tag"]
        );
    }

    #[test]
    fn test_malformed_email() {
        let request = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid_register()
        };
        assert_eq!(
            messages(&request),
            vec!["Field email failed on the 'email' tag"]
        );
    }

    #[test]
    fn test_missing_fields_report_required_once() {
        let request: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(
            messages(&request),
            vec![
                "Field email failed on the 'required' tag",
                "Field name failed on the 'required' tag",
                "Field password failed on the 'required' tag",
                "Field role_ids failed on the 'required' tag",
            ]
        );
    }

    #[test]
    fn test_password_length_counts_characters() {
        let request = RegisterRequest {
            password: "비밀번호여섯".to_string(),
            ..valid_register()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_non_positive_role_id() {
        let request = RegisterRequest {
            role_ids: vec![1, 0],
            ..valid_register()
        };
        assert_eq!(
            messages(&request),
            vec!["Field role_ids failed on the 'gt' tag"]
        );
    }

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "ann@x.com".to_string(),
            password: "x".to_string(),
        };
        assert!(ok.validate().is_ok());

        let missing: LoginRequest = serde_json::from_str(r#"{"email":"ann@x.com"}"#).unwrap();
        assert_eq!(
            messages(&missing),
            vec!["Field password failed on the 'required' tag"]
        );
    }
}
