//! # Quill Core
//!
//! 인증 서비스의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 API 서버 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 및 역할 도메인 타입
//! - 설정 관리 (`config` + 환경변수)
//! - 로깅 인프라 (`tracing`)
//! - 설정 에러 타입

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
