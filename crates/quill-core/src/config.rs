//! 설정 관리.
//!
//! 설정은 다음 순서로 병합됩니다 (뒤가 우선):
//!
//! 1. 코드 기본값
//! 2. `config/default.toml` (선택)
//! 3. `QUILL__` 접두사 환경변수 (예: `QUILL__RATE_LIMIT__BURST=20`)
//! 4. 관용 환경변수: `JWT_SECRET`, `DATABASE_URL`, `API_HOST`, `PORT`, `CORS_ORIGINS`

use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 토큰 유효 시간 상한 (시간, 1년).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 요청 제한 설정
    pub rate_limit: RateLimitSettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 허용할 CORS origin 목록 (쉼표 구분, 없으면 모든 origin 허용)
    pub cors_origins: Option<String>,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: None,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// `host:port` 문자열.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 10,
        }
    }
}

impl DatabaseConfig {
    /// 연결 URL 반환. 설정되지 않았으면 에러.
    pub fn url(&self) -> ConfigResult<&str> {
        self.url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

/// 인증 설정.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT 서명 비밀 키
    pub jwt_secret: Option<String>,
    /// 토큰 유효 시간 (시간)
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: 24,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// 요청 제한 설정.
///
/// 클라이언트 주소별 Token Bucket 파라미터와 추적 상한.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// 활성화 여부
    pub enabled: bool,
    /// 초당 허용 요청 수 (리필 속도)
    pub requests_per_second: u32,
    /// 버스트 허용량 (버킷 용량)
    pub burst: u32,
    /// 동시에 추적하는 최대 클라이언트 수
    pub max_tracked_clients: usize,
    /// 유휴 버킷 만료 시간 (초)
    pub idle_ttl_secs: u64,
    /// `X-Forwarded-For`/`X-Real-IP`를 신뢰할 프록시 주소 (비어 있으면 헤더 무시)
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 1,
            burst: 10,
            max_tracked_clients: 10_000,
            idle_ttl_secs: 600,
            trusted_proxies: Vec::new(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨 필터
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "quill_api=info,tower_http=debug".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 기본 경로와 프로세스 환경변수에서 설정을 로드합니다.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// 지정한 파일과 프로세스 환경변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 무시합니다.
    pub fn load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// 관용 환경변수 조회 함수를 주입하여 설정을 로드합니다.
    pub fn load_with<P, F>(path: P, lookup: F) -> ConfigResult<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("QUILL")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("rate_limit.trusted_proxies"),
            )
            .set_override_option("auth.jwt_secret", non_empty("JWT_SECRET"))?
            .set_override_option("database.url", non_empty("DATABASE_URL"))?
            .set_override_option("server.host", non_empty("API_HOST"))?
            .set_override_option("server.port", non_empty("PORT"))?
            .set_override_option("server.cors_origins", non_empty("CORS_ORIGINS"))?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// 필수 값과 범위를 검증합니다.
    pub fn validate(&self) -> ConfigResult<()> {
        self.jwt_secret()?;

        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.auth.token_ttl_hours) {
            return Err(ConfigError::Invalid(format!(
                "auth.token_ttl_hours must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_HOURS, self.auth.token_ttl_hours
            )));
        }

        if self.rate_limit.enabled {
            if self.rate_limit.requests_per_second == 0 {
                return Err(ConfigError::Invalid(
                    "rate_limit.requests_per_second must be positive".to_string(),
                ));
            }
            if self.rate_limit.max_tracked_clients == 0 {
                return Err(ConfigError::Invalid(
                    "rate_limit.max_tracked_clients must be positive".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// JWT 비밀 키 반환. 없거나 비어 있으면 에러.
    pub fn jwt_secret(&self) -> ConfigResult<&str> {
        self.auth
            .jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MISSING_FILE: &str = "config/does-not-exist.toml";

    fn load(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::load_with(MISSING_FILE, |key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = load(&[]);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.rate_limit.requests_per_second, 1);
        assert_eq!(config.rate_limit.burst, 10);
        assert!(config.database.url.is_none());
        assert!(config.server.cors_origins.is_none());
        assert_eq!(config.server.request_timeout_secs, 30);
        assert!(config.rate_limit.trusted_proxies.is_empty());
    }

    #[test]
    fn test_plain_env_overrides() {
        let config = load(&[
            ("JWT_SECRET", "super-secret"),
            ("DATABASE_URL", "postgres://localhost/quill"),
            ("PORT", "9090"),
        ]);
        assert_eq!(config.jwt_secret().unwrap(), "super-secret");
        assert_eq!(config.database.url().unwrap(), "postgres://localhost/quill");
        assert_eq!(config.server.port, 9090);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let config = load(&[]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn test_blank_secret_is_treated_as_missing() {
        let config = load(&[("JWT_SECRET", "   ")]);
        assert!(matches!(
            config.jwt_secret(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn test_invalid_ttl_rejected() {
        let mut config = load(&[("JWT_SECRET", "s")]);
        config.auth.token_ttl_hours = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let mut config = load(&[("JWT_SECRET", "s")]);

        config.auth.token_ttl_hours = MAX_TOKEN_TTL_HOURS;
        assert!(config.validate().is_ok());

        for hours in [MAX_TOKEN_TTL_HOURS + 1, i64::MAX] {
            config.auth.token_ttl_hours = hours;
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let config = load(&[("JWT_SECRET", "do-not-print")]);
        let debug = format!("{:?}", config.auth);
        assert!(!debug.contains("do-not-print"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_missing_database_url() {
        let config = load(&[]);
        assert!(matches!(
            config.database.url(),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }
}
