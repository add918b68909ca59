//! 인증.
//!
//! 비밀번호 해싱과 JWT 기반 Bearer 토큰 인증을 제공합니다.
//!
//! # 구성 요소
//!
//! - [`hash_password`] / [`verify_password`]: Argon2id 비밀번호 처리
//! - [`TokenIssuer`]: 토큰 발급 및 검증
//! - [`AuthUser`]: 보호된 핸들러용 인증 추출기

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, TokenError, TokenIssuer, DEFAULT_TOKEN_TTL_HOURS};
pub use middleware::{AuthError, AuthUser};
pub use password::{hash_password, verify_password, PasswordError};
