//! 프로필 endpoint.
//!
//! - `GET /profile` (Bearer 인증 필요)

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use quill_core::User;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::state::AppState;

/// 인증된 사용자의 프로필 조회.
///
/// GET /profile
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "프로필 (envelope.data = User)"),
        (status = 401, description = "토큰 누락 또는 유효하지 않음"),
        (status = 404, description = "사용자를 찾을 수 없음")
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state
        .profiles
        .get_by_id(user_id)
        .await
        .map_err(|e| e.with_message("Failed to get user profile"))?;

    Ok(Json(ApiResponse::success(StatusCode::OK, "User profile", user)))
}

/// 프로필 라우터 생성.
pub fn profile_router() -> Router<Arc<AppState>> {
    Router::new().route("/profile", get(get_profile))
}
