//! 기본 역할 시딩.

use quill_core::SEED_ROLES;
use sqlx::PgPool;

/// 기본 역할을 멱등적으로 생성합니다.
///
/// 이미 존재하는 역할은 건드리지 않으며, 새로 생성된 역할 수를 반환합니다.
pub async fn seed_roles(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;

    for name in SEED_ROLES {
        let result = sqlx::query(
            r#"
            INSERT INTO roles (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(role = name, "Seeded role");
        }
        inserted += result.rows_affected();
    }

    Ok(inserted)
}
