//! OpenAPI 문서화 설정.
//!
//! utoipa로 REST API의 OpenAPI 3.0 문서를 생성하며 `/api-docs/openapi.json`에서 제공합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::response::{Meta, PaginationMeta};
use crate::routes::{ComponentHealth, ComponentStatus, HealthResponse};
use crate::types::{LoginRequest, LoginResponse, RegisterRequest};

/// Bearer 인증 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Quill API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quill Auth API",
        description = r#"
# Quill 인증 REST API

회원가입, 로그인, 프로필 조회를 제공합니다.

## 응답 형식

모든 인증/프로필 응답은 `{ meta: { code, status, message }, data?, errors? }` 형식입니다.

## 인증

`/profile`은 로그인으로 받은 토큰을 `Authorization: Bearer <token>` 헤더로 전달해야 합니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 회원가입 및 로그인"),
        (name = "profile", description = "프로필 - 인증된 사용자 정보")
    ),
    components(
        schemas(
            Meta,
            PaginationMeta,

            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            RegisterRequest,
            LoginRequest,
            LoginResponse,
            quill_core::User,
            quill_core::Role,
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        crate::routes::auth::register,
        crate::routes::auth::login,

        crate::routes::profile::get_profile,
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;
