//! 프로필 서비스.

use std::sync::Arc;

use quill_core::User;

use crate::error::AppError;
use crate::repository::{StoreError, UserStore};

/// 인증된 사용자의 프로필 조회.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn UserStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// ID로 사용자 조회.
    ///
    /// 0 이하의 ID는 존재하지 않는 사용자로 처리합니다.
    pub async fn get_by_id(&self, user_id: i64) -> Result<User, AppError> {
        if user_id <= 0 {
            return Err(AppError::UserNotFound);
        }

        self.store.find_by_id(user_id).await.map_err(|e| match e {
            StoreError::NotFound => AppError::UserNotFound,
            other => {
                tracing::error!(user_id, error = %other, "Failed to load user profile");
                AppError::Persistence(other)
            }
        })
    }
}
