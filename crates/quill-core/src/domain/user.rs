//! 사용자 도메인 모델.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Role;

/// 사용자.
///
/// 비밀번호 해시는 내부 검증용으로만 보관하며 외부로 직렬화되지 않습니다.
/// 이메일 고유성은 저장소(삭제되지 않은 행 기준)에서 보장합니다.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct User {
    /// 사용자 ID (시스템 할당)
    pub id: i64,
    /// 표시 이름
    pub name: String,
    /// 이메일 (저장된 그대로 대소문자 구분)
    pub email: String,
    /// 비밀번호 해시 (PHC 형식)
    #[serde(skip_serializing)]
    pub password: String,
    /// 아바타 URL
    pub avatar: Option<String>,
    /// 이메일 인증 시각
    pub verified_at: Option<DateTime<Utc>>,
    /// 보유 역할
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 소프트 삭제 시각
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// 소프트 삭제 여부.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// 특정 이름의 역할을 보유하는지 확인.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }
}

/// 새 사용자 입력.
///
/// 비밀번호는 이미 해싱된 상태여야 합니다.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            avatar: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 7,
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            avatar: None,
            verified_at: None,
            roles: vec![Role::new(2, "User")],
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_password_is_never_serialized() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(json.contains(r#""email":"ann@x.com""#));
    }

    #[test]
    fn test_live_user_omits_deleted_at() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("deleted_at").is_none());
        assert_eq!(json["roles"][0]["name"], "User");
    }

    #[test]
    fn test_has_role() {
        let user = sample_user();
        assert!(user.has_role("User"));
        assert!(!user.has_role("Admin"));
        assert!(!user.is_deleted());
    }
}
