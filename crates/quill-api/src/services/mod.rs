//! 도메인 서비스 모듈.
//!
//! 핸들러와 저장소 사이의 비즈니스 규칙을 담당합니다.

pub mod auth;
pub mod profile;

pub use auth::AuthService;
pub use profile::ProfileService;
