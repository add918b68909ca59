//! 데이터베이스 연결 및 스키마 준비.
//!
//! 서버 시작 시 한 번 호출되어 연결 풀을 만들고 마이그레이션과
//! 기본 역할 시딩을 수행합니다.

use std::time::Duration;

use quill_core::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::repository::seed_roles;

/// 연결 준비 에러.
#[derive(Debug, thiserror::Error)]
pub enum DbSetupError {
    #[error("설정 에러: {0}")]
    Config(#[from] quill_core::ConfigError),

    #[error("데이터베이스 연결 실패: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("마이그레이션 실패: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("역할 시딩 실패: {0}")]
    Seed(#[source] sqlx::Error),
}

/// 설정으로 연결 풀을 생성하고 연결을 확인합니다.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DbSetupError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(config.url()?)
        .await
        .map_err(DbSetupError::Connect)?;

    // 연결 테스트
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(DbSetupError::Connect)?;

    info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );

    Ok(pool)
}

/// 마이그레이션을 적용하고 기본 역할을 시딩합니다.
///
/// 여러 번 실행해도 결과가 같습니다.
pub async fn prepare_schema(pool: &PgPool) -> Result<(), DbSetupError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");

    let inserted = seed_roles(pool).await.map_err(DbSetupError::Seed)?;
    info!(inserted, "Default roles seeded");

    Ok(())
}
