//! 공용 타입 정의.
//!
//! 핸들러와 서비스가 공유하는 요청/응답 타입을 정의합니다.

pub mod auth;

pub use auth::{format_validation_errors, LoginRequest, LoginResponse, RegisterRequest};
