//! 사용자 역할.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 기본으로 시딩되는 역할 이름.
///
/// 서버 시작 시 존재하지 않으면 생성됩니다.
pub const SEED_ROLES: [&str; 2] = ["Admin", "User"];

/// 역할 레코드.
///
/// 역할 집합은 시딩/관리 도구로만 변경되며, 회원가입 시 ID로 참조됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Role {
    /// 역할 ID
    pub id: i64,
    /// 역할 이름 (고유)
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// 현재 시각으로 역할 생성 (저장소 구현용).
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
