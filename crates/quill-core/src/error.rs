//! 공통 에러 타입.

use thiserror::Error;

/// 설정 에러.
///
/// 필수 설정 누락은 기본값으로 대체하지 않고 시작 시점에 실패로 처리합니다.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 설정 소스 로드/역직렬화 실패
    #[error("설정 로드 실패: {0}")]
    Load(#[from] config::ConfigError),

    /// 필수 설정 누락 (환경변수 이름)
    #[error("필수 설정이 없습니다: {0}")]
    Missing(&'static str),

    /// 잘못된 설정 값
    #[error("잘못된 설정 값: {0}")]
    Invalid(String),
}

/// 설정 작업을 위한 Result 타입.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_variable() {
        let err = ConfigError::Missing("JWT_SECRET");
        assert!(err.to_string().contains("JWT_SECRET"));
    }
}
