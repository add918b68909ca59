//! User Repository
//!
//! PostgreSQL 기반 사용자/역할 저장소.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quill_core::{NewUser, Role, User};
use sqlx::{FromRow, PgExecutor, PgPool};

use super::{StoreError, StoreResult, UserStore};

// ================================================================================================
// Types
// ================================================================================================

/// 사용자 테이블 레코드 (역할 제외)
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    #[sqlx(default)]
    pub avatar: Option<String>,
    #[sqlx(default)]
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// 역할 목록과 합쳐 도메인 사용자로 변환.
    pub fn into_user(self, roles: Vec<Role>) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password: self.password,
            avatar: self.avatar,
            verified_at: self.verified_at,
            roles,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, name, email, password, avatar, verified_at, created_at, updated_at, deleted_at";

// ================================================================================================
// Repository
// ================================================================================================

/// 요청한 역할 ID를 정렬 후 중복 제거.
fn distinct_role_ids(role_ids: &[i64]) -> Vec<i64> {
    let mut ids = role_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// 사용자에 연결된 역할 조회.
///
/// 풀과 트랜잭션 연결 모두에서 사용합니다.
async fn fetch_user_roles<'e, E>(executor: E, user_id: i64) -> StoreResult<Vec<Role>>
where
    E: PgExecutor<'e>,
{
    let roles = sqlx::query_as::<_, Role>(
        r#"
        SELECT r.id, r.name, r.created_at, r.updated_at
        FROM roles r
        INNER JOIN user_role ur ON ur.role_id = r.id
        WHERE ur.user_id = $1
        ORDER BY r.id
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(roles)
}

/// PostgreSQL 사용자 저장소
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_roles(&self, record: UserRecord) -> StoreResult<User> {
        let roles = fetch_user_roles(&self.pool, record.id).await?;
        Ok(record.into_user(roles))
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        self.create_with_roles(new_user, &[]).await
    }

    async fn create_with_roles(&self, new_user: NewUser, role_ids: &[i64]) -> StoreResult<User> {
        let requested = distinct_role_ids(role_ids);
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (name, email, password, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.avatar)
        .fetch_one(&mut *tx)
        .await?;

        if !requested.is_empty() {
            let linked = sqlx::query(
                r#"
                INSERT INTO user_role (user_id, role_id)
                SELECT $1, r.id FROM roles r WHERE r.id = ANY($2)
                "#,
            )
            .bind(record.id)
            .bind(requested.as_slice())
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if linked != requested.len() as u64 {
                tx.rollback().await?;
                tracing::warn!(
                    requested = ?requested,
                    linked,
                    "User creation rolled back: unknown role ids"
                );
                return Err(StoreError::UnknownRoles);
            }
        }

        // 커밋 전에 같은 트랜잭션에서 역할을 읽어 커밋 이후 실패 경로를 없앰
        let roles = fetch_user_roles(&mut *tx, record.id).await?;
        tx.commit().await?;

        tracing::debug!(user_id = record.id, roles = roles.len(), "User created");

        Ok(record.into_user(roles))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        self.with_roles(record).await
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        if id <= 0 {
            return Err(StoreError::NotFound);
        }

        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        self.with_roles(record).await
    }

    async fn roles_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM roles
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
