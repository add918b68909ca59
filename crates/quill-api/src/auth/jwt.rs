//! JWT 토큰 처리.
//!
//! HMAC 서명 Bearer 토큰의 발급/검증 로직.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use quill_core::{AuthConfig, ConfigError, MAX_TOKEN_TTL_HOURS};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// 기본 토큰 유효 시간 (시간).
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// JWT 페이로드.
///
/// 토큰은 서버 측 세션 없이 사용자 ID만 증명합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub user_id: i64,
    /// Expiration - 만료 시간 (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 발급 시각 기준으로 Claims 생성.
    ///
    /// 만료 시각이 표현 범위를 벗어나면 `None`.
    pub fn new(user_id: i64, issued_at: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        let expires_at = issued_at.checked_add_signed(ttl)?;
        Some(Self {
            user_id,
            exp: expires_at.timestamp(),
        })
    }

    /// 토큰이 만료되었는지 확인.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("토큰 만료 시각이 범위를 벗어났습니다")]
    ExpiryOutOfRange,

    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("유효하지 않은 토큰")]
    Invalid,
}

/// 토큰 발급기.
///
/// 서명 키는 프로세스 설정에서 주입되며, 없으면 생성 자체가 실패합니다.
#[derive(Debug)]
pub struct TokenIssuer {
    secret: SecretString,
    ttl: Duration,
    validation: Validation,
}

impl TokenIssuer {
    /// 새 발급기 생성.
    ///
    /// # Errors
    ///
    /// 비밀 키가 비어 있으면 `ConfigError::Missing("JWT_SECRET")`.
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Result<Self, ConfigError> {
        let secret: String = secret.into();
        if secret.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if ttl <= Duration::zero() || ttl > Duration::hours(MAX_TOKEN_TTL_HOURS) {
            return Err(ConfigError::Invalid(format!(
                "token ttl must be between 1s and {}h, got {}s",
                MAX_TOKEN_TTL_HOURS,
                ttl.num_seconds()
            )));
        }

        // HMAC 계열만 허용 (알고리즘 치환 위조 방지)
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;

        Ok(Self {
            secret: SecretString::new(secret.into()),
            ttl,
            validation,
        })
    }

    /// 인증 설정에서 생성.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let secret = config
            .jwt_secret
            .clone()
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let ttl = Duration::try_hours(config.token_ttl_hours).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "auth.token_ttl_hours out of range: {}",
                config.token_ttl_hours
            ))
        })?;
        Self::new(secret, ttl)
    }

    /// 토큰 유효 시간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 현재 시각 기준으로 토큰 발급.
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// 지정한 발급 시각 기준으로 토큰 발급.
    pub fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims =
            Claims::new(user_id, issued_at, self.ttl).ok_or(TokenError::ExpiryOutOfRange)?;

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(TokenError::from)
    }

    /// 토큰 서명 및 만료 검증.
    ///
    /// # Returns
    ///
    /// 검증된 Claims (`user_id`가 후속 처리의 주체)
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &self.validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(TEST_SECRET, Duration::hours(DEFAULT_TOKEN_TTL_HOURS)).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = issuer();
        let token = issuer.issue(42).unwrap();
        assert!(!token.is_empty());

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expiry_is_24_hours() {
        let issuer = issuer();
        let issued_at = Utc::now();
        let token = issuer.issue_at(1, issued_at).unwrap();

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.exp, (issued_at + Duration::hours(24)).timestamp());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let token = issuer
            .issue_at(1, Utc::now() - Duration::hours(24) - Duration::seconds(5))
            .unwrap();

        assert!(matches!(issuer.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let issuer = issuer();
        let token = issuer.issue(1).unwrap();

        let (unsigned, signature) = token.rsplit_once('.').unwrap();
        let first = signature.chars().next().unwrap();
        let replacement = if first == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", unsigned, replacement, &signature[1..]);

        assert!(matches!(issuer.validate(&tampered), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let issuer = issuer();
        let token = issuer.issue(1).unwrap();
        let forged_payload = issuer.issue(2).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged_payload.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(matches!(issuer.validate(&tampered), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().issue(1).unwrap();
        let other = TokenIssuer::new("another-secret-key-for-testing-32-chars", Duration::hours(1))
            .unwrap();

        assert!(matches!(other.validate(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_non_hmac_algorithms_rejected() {
        let issuer = issuer();
        let token = issuer.issue(1).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        // {"alg":"none","typ":"JWT"}
        let none_alg = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", parts[1]);
        assert!(matches!(issuer.validate(&none_alg), Err(TokenError::Invalid)));

        // {"alg":"RS256","typ":"JWT"}
        let rs256 = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}.{}", parts[1], parts[2]);
        assert!(matches!(issuer.validate(&rs256), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let issuer = issuer();
        assert!(matches!(issuer.validate("invalid.token.here"), Err(TokenError::Invalid)));
        assert!(matches!(issuer.validate(""), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        assert!(matches!(
            TokenIssuer::new("", Duration::hours(24)),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
        assert!(matches!(
            TokenIssuer::from_config(&AuthConfig::default()),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn test_from_config_uses_ttl() {
        let config = AuthConfig {
            jwt_secret: Some(TEST_SECRET.to_string()),
            token_ttl_hours: 2,
        };
        let issuer = TokenIssuer::from_config(&config).unwrap();
        assert_eq!(issuer.ttl(), Duration::hours(2));
    }

    #[test]
    fn test_out_of_range_ttl_is_config_error() {
        for hours in [MAX_TOKEN_TTL_HOURS + 1, i64::MAX / 3600, i64::MAX] {
            let config = AuthConfig {
                jwt_secret: Some(TEST_SECRET.to_string()),
                token_ttl_hours: hours,
            };
            assert!(matches!(
                TokenIssuer::from_config(&config),
                Err(ConfigError::Invalid(_))
            ));
        }
    }

    #[test]
    fn test_expiry_overflow_is_error() {
        let issuer = issuer();
        let issued_at = DateTime::<Utc>::MAX_UTC - Duration::hours(1);

        assert!(matches!(
            issuer.issue_at(1, issued_at),
            Err(TokenError::ExpiryOutOfRange)
        ));
        assert!(Claims::new(1, issued_at, issuer.ttl()).is_none());
    }

    proptest! {
        #[test]
        fn prop_validate_returns_issued_subject(user_id in 1i64..i64::MAX) {
            let issuer = issuer();
            let token = issuer.issue(user_id).unwrap();
            prop_assert_eq!(issuer.validate(&token).unwrap().user_id, user_id);
        }
    }
}
