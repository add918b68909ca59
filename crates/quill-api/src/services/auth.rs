//! 인증 서비스.
//!
//! 회원가입과 로그인 흐름을 담당합니다.

use std::sync::Arc;

use quill_core::{NewUser, User};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, TokenIssuer};
use crate::error::AppError;
use crate::metrics::{record_login, record_register};
use crate::repository::{StoreError, UserStore};
use crate::types::{LoginRequest, LoginResponse, RegisterRequest};

/// 인증 서비스.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenIssuer>) -> Self {
        Self { store, tokens }
    }

    /// 회원가입.
    ///
    /// 1. 비밀번호 해싱
    /// 2. 요청한 역할이 모두 존재하는지 확인 (중복 ID도 불일치로 처리)
    /// 3. 사용자와 역할 연결을 함께 저장
    ///
    /// 입력 필드 검증은 호출자가 이미 수행했다고 가정합니다.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        let result = self.register_inner(request).await;
        record_register(match &result {
            Ok(_) => "success",
            Err(AppError::EmailAlreadyRegistered) => "duplicate",
            Err(AppError::InvalidRoles) => "invalid_roles",
            Err(_) => "error",
        });
        result
    }

    async fn register_inner(&self, request: RegisterRequest) -> Result<User, AppError> {
        let password_hash = hash_password(&request.password)?;

        if !request.role_ids.is_empty() {
            let roles = self.store.roles_by_ids(&request.role_ids).await?;
            if roles.len() != request.role_ids.len() {
                warn!(
                    requested = ?request.role_ids,
                    found = roles.len(),
                    "Registration rejected: unknown role ids"
                );
                return Err(AppError::InvalidRoles);
            }
        }

        let new_user = NewUser::new(request.name, request.email, password_hash);

        let user = self
            .store
            .create_with_roles(new_user, &request.role_ids)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey => AppError::EmailAlreadyRegistered,
                // 확인 이후 역할이 사라진 경우
                StoreError::UnknownRoles => AppError::InvalidRoles,
                other => AppError::Persistence(other),
            })?;

        info!(user_id = user.id, roles = user.roles.len(), "User registered");
        Ok(user)
    }

    /// 로그인.
    ///
    /// 존재하지 않는 이메일, 조회 실패, 비밀번호 불일치는 모두 같은
    /// [`AppError::InvalidCredentials`]로 응답합니다.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let result = self.login_inner(request).await;
        record_login(match &result {
            Ok(_) => "success",
            Err(AppError::InvalidCredentials) => "invalid_credentials",
            Err(_) => "error",
        });
        result
    }

    async fn login_inner(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = match self.store.find_by_email(&request.email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                warn!("Login rejected: unknown email");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                warn!(error = %e, "Login rejected: user lookup failed");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !verify_password(&request.password, &user.password) {
            warn!(user_id = user.id, "Login rejected: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;

        info!(user_id = user.id, "User logged in");
        Ok(LoginResponse { token, user })
    }
}
