//! 회원가입/로그인 endpoint.
//!
//! - `POST /auth/register`
//! - `POST /auth/login`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    routing::post,
    Json, Router,
};
use quill_core::User;
use validator::Validate;

use crate::error::{ApiResult, AppError};
use crate::middleware::{rate_limit_middleware, RateLimiter};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::types::{format_validation_errors, LoginRequest, LoginResponse, RegisterRequest};

const REGISTER_SUCCESS: &str = "Account registered successfully";
const REGISTER_FAILED: &str = "Register account failed";
const LOGIN_SUCCESS: &str = "Successfully logged in";
const LOGIN_FAILED: &str = "Login failed";

/// JSON 파싱과 필드 검증을 함께 수행합니다.
fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::Validation(vec![rejection.body_text()])
    })?;

    request
        .validate()
        .map_err(|errors| AppError::Validation(format_validation_errors(&errors)))?;

    Ok(request)
}

/// 회원가입.
///
/// POST /auth/register
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "가입 성공 (envelope.data = User)"),
        (status = 400, description = "검증 실패 또는 잘못된 역할"),
        (status = 409, description = "이미 등록된 이메일"),
        (status = 429, description = "요청 제한 초과")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<User>>)> {
    let request = validated(payload).map_err(|e| e.with_message(REGISTER_FAILED))?;

    let user = state
        .auth
        .register(request)
        .await
        .map_err(|e| e.with_message(REGISTER_FAILED))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            StatusCode::CREATED,
            REGISTER_SUCCESS,
            user,
        )),
    ))
}

/// 로그인.
///
/// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공 (envelope.data = LoginResponse)"),
        (status = 400, description = "검증 실패"),
        (status = 401, description = "이메일 또는 비밀번호 불일치"),
        (status = 429, description = "요청 제한 초과")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let request = validated(payload).map_err(|e| e.with_message(LOGIN_FAILED))?;

    let response = state
        .auth
        .login(request)
        .await
        .map_err(|e| e.with_message(LOGIN_FAILED))?;

    Ok(Json(ApiResponse::success(
        StatusCode::OK,
        LOGIN_SUCCESS,
        response,
    )))
}

/// 인증 라우터 생성.
///
/// Rate Limiter가 주어지면 이 라우터의 모든 요청에 적용됩니다.
pub fn auth_router(rate_limiter: Option<RateLimiter>) -> Router<Arc<AppState>> {
    let router = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    match rate_limiter {
        Some(limiter) => {
            router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
        }
        None => router,
    }
}
