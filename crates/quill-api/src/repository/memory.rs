//! 인메모리 사용자 저장소.
//!
//! 데이터베이스 없이 서비스와 라우터를 구동하기 위한 구현.
//! PostgreSQL 구현과 같은 규칙(삭제되지 않은 사용자 기준 이메일 고유, 원자적 역할 연결)을 따릅니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use quill_core::{NewUser, Role, User, SEED_ROLES};
use tokio::sync::RwLock;

use super::{StoreError, StoreResult, UserStore};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<i64, User>,
    roles: Vec<Role>,
    next_user_id: i64,
}

/// 인메모리 사용자 저장소.
#[derive(Debug)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserStore {
    /// 역할이 없는 빈 저장소.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_user_id: 1,
                ..Default::default()
            }),
        }
    }

    /// 기본 역할(`Admin` = 1, `User` = 2)이 시딩된 저장소.
    pub fn seeded() -> Self {
        let roles = SEED_ROLES
            .iter()
            .zip(1..)
            .map(|(name, id)| Role::new(id, *name))
            .collect();

        Self {
            inner: RwLock::new(Inner {
                roles,
                next_user_id: 1,
                ..Default::default()
            }),
        }
    }

    /// 저장된 사용자 수 (삭제된 사용자 포함).
    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// 사용자 소프트 삭제.
    pub async fn soft_delete(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&id)
            .filter(|u| !u.is_deleted())
            .ok_or(StoreError::NotFound)?;

        user.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        self.create_with_roles(new_user, &[]).await
    }

    async fn create_with_roles(&self, new_user: NewUser, role_ids: &[i64]) -> StoreResult<User> {
        // 쓰기 잠금 하나로 중복 검사와 삽입을 묶음
        let mut inner = self.inner.write().await;

        let duplicate = inner
            .users
            .values()
            .any(|u| !u.is_deleted() && u.email == new_user.email);
        if duplicate {
            return Err(StoreError::DuplicateKey);
        }

        let roles: Vec<Role> = inner
            .roles
            .iter()
            .filter(|r| role_ids.contains(&r.id))
            .cloned()
            .collect();

        let mut requested = role_ids.to_vec();
        requested.sort_unstable();
        requested.dedup();
        if roles.len() != requested.len() {
            return Err(StoreError::UnknownRoles);
        }

        let now = Utc::now();
        let id = inner.next_user_id;
        inner.next_user_id += 1;

        let user = User {
            id,
            name: new_user.name,
            email: new_user.email,
            password: new_user.password_hash,
            avatar: new_user.avatar,
            verified_at: None,
            roles,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<User> {
        self.inner
            .read()
            .await
            .users
            .values()
            .find(|u| !u.is_deleted() && u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .filter(|u| !u.is_deleted())
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn roles_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Role>> {
        Ok(self
            .inner
            .read()
            .await
            .roles
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser::new("Ann", email, "$argon2id$hash")
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryUserStore::seeded();
        let created = store
            .create_with_roles(new_user("ann@x.com"), &[1])
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert!(created.has_role("Admin"));

        let by_email = store.find_by_email("ann@x.com").await.unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.password, "$argon2id$hash");

        let by_id = store.find_by_id(created.id).await.unwrap();
        assert_eq!(by_id.email, "ann@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryUserStore::seeded();
        store.create(new_user("ann@x.com")).await.unwrap();

        let result = store.create_with_roles(new_user("ann@x.com"), &[2]).await;
        assert!(matches!(result, Err(StoreError::DuplicateKey)));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_role_rejects_whole_user() {
        let store = InMemoryUserStore::seeded();

        let result = store
            .create_with_roles(new_user("ann@x.com"), &[1, 999])
            .await;
        assert!(matches!(result, Err(StoreError::UnknownRoles)));
        assert_eq!(store.user_count().await, 0);
        assert!(matches!(
            store.find_by_email("ann@x.com").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_repeated_role_ids_link_once() {
        let store = InMemoryUserStore::seeded();
        let user = store
            .create_with_roles(new_user("ann@x.com"), &[2, 2])
            .await
            .unwrap();
        assert_eq!(user.roles.len(), 1);
        assert!(user.has_role("User"));
    }

    #[tokio::test]
    async fn test_email_is_case_sensitive() {
        let store = InMemoryUserStore::seeded();
        store.create(new_user("ann@x.com")).await.unwrap();
        assert!(store.create(new_user("Ann@x.com")).await.is_ok());
        assert!(matches!(
            store.find_by_email("ANN@X.COM").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_soft_deleted_user_is_invisible() {
        let store = InMemoryUserStore::seeded();
        let user = store.create(new_user("ann@x.com")).await.unwrap();
        store.soft_delete(user.id).await.unwrap();

        assert!(matches!(store.find_by_id(user.id).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.find_by_email("ann@x.com").await,
            Err(StoreError::NotFound)
        ));

        // 삭제된 사용자의 이메일은 재사용 가능
        let again = store.create(new_user("ann@x.com")).await.unwrap();
        assert_ne!(again.id, user.id);
    }

    #[tokio::test]
    async fn test_roles_by_ids_returns_existing_subset() {
        let store = InMemoryUserStore::seeded();
        let roles = store.roles_by_ids(&[1, 2, 99]).await.unwrap();
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Admin", "User"]);

        assert!(store.roles_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_not_found() {
        let store = InMemoryUserStore::new();
        assert!(matches!(store.find_by_id(0).await, Err(StoreError::NotFound)));
        assert!(matches!(store.find_by_id(42).await, Err(StoreError::NotFound)));
    }
}
