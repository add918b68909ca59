//! Repository pattern for user persistence.
//!
//! 데이터베이스 접근 로직을 서비스 계층에서 분리합니다.
//! 서비스는 [`UserStore`] trait 객체만 알고 있으며, 구현체는 생성 시 주입됩니다.

mod memory;
mod seed;
mod users;

pub use memory::InMemoryUserStore;
pub use seed::seed_roles;
pub use users::{PgUserStore, UserRecord};

use async_trait::async_trait;
use quill_core::{NewUser, Role, User};

/// 저장소 에러.
///
/// 드라이버 에러는 구조화된 정보로 분류하며 메시지 문자열에 의존하지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 고유 제약 위반 (삭제되지 않은 사용자의 이메일 중복)
    #[error("고유 키 중복")]
    DuplicateKey,

    /// 대상 행 없음
    #[error("레코드를 찾을 수 없습니다")]
    NotFound,

    /// 연결하려는 역할 중 존재하지 않는 ID가 있음
    #[error("존재하지 않는 역할")]
    UnknownRoles,

    /// 그 외 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateKey
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StoreError::UnknownRoles
            }
            _ => StoreError::Database(err),
        }
    }
}

/// 저장소 작업을 위한 Result 타입.
pub type StoreResult<T> = Result<T, StoreError>;

/// 사용자/역할 저장소.
///
/// 모든 조회는 소프트 삭제된 사용자를 무시합니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 사용자 생성 (역할 없음).
    async fn create(&self, new_user: NewUser) -> StoreResult<User>;

    /// 사용자와 역할 연결을 하나의 트랜잭션으로 생성.
    ///
    /// 어느 단계든 실패하면 사용자 행도 남지 않습니다. 존재하지 않는 역할 ID가
    /// 하나라도 있으면 `StoreError::UnknownRoles`를 반환합니다 (중복 ID는 한 번으로 취급).
    async fn create_with_roles(&self, new_user: NewUser, role_ids: &[i64]) -> StoreResult<User>;

    /// 이메일로 조회 (역할 및 비밀번호 해시 포함).
    async fn find_by_email(&self, email: &str) -> StoreResult<User>;

    /// ID로 조회 (역할 포함).
    async fn find_by_id(&self, id: i64) -> StoreResult<User>;

    /// 요청한 ID 중 존재하는 역할만 반환.
    async fn roles_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Role>>;

    /// 저장소 연결 상태 확인.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
