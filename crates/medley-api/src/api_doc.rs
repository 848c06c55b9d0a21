//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::services::ingestion;
use medley_core::models;

/// Returns the OpenAPI spec.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Medley API",
        version = "0.1.0",
        description = "Media library backend: users, tags, and media uploads behind a token-authenticated, role-gated API. All endpoints live under /api/."
    ),
    paths(
        // Auth
        handlers::auth::login,
        // Users
        handlers::users::create,
        handlers::users::find_all,
        handlers::users::find_one,
        handlers::users::update,
        handlers::users::remove,
        handlers::users::user_media,
        // Tags
        handlers::tags::create,
        handlers::tags::find_all,
        handlers::tags::find_one,
        handlers::tags::update,
        handlers::tags::remove,
        // Media
        handlers::media::create,
        handlers::media::find_all,
        handlers::media::find_one,
        handlers::media::update,
        handlers::media::remove,
    ),
    components(schemas(
        models::UserResponse,
        models::UserRole,
        models::UserStatus,
        models::Tag,
        models::MediaRecord,
        models::MediaCategory,
        handlers::auth::LoginRequest,
        handlers::auth::AuthPayload,
        handlers::tags::CreateTagRequest,
        handlers::tags::UpdateTagRequest,
        handlers::users::UpdateUserRequest,
        ingestion::IngestionOutcome,
        ingestion::RejectedUpload,
        error::ErrorResponse,
        error::ErrorDetail,
    )),
    tags(
        (name = "auth", description = "Login and token issuance"),
        (name = "users", description = "User accounts"),
        (name = "tags", description = "Tag management"),
        (name = "media", description = "Media upload and retrieval")
    )
)]
pub struct ApiDoc;
