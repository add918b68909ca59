//! 인증/프로필 도메인 모델.

mod role;
mod user;

pub use role::*;
pub use user::*;
