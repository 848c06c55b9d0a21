use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use medley_core::admission::admit;
use medley_core::models::{MediaCategory, MediaRecord, UserResponse};
use medley_core::{AppError, UploadCandidate};
use medley_storage::generate_storage_key;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{storage_error_to_app, ErrorResponse, HttpAppError, ValidatedJson};
use crate::extract::parse_signup;
use crate::response::ApiResponse;
use crate::services::ingestion::IngestionService;
use crate::state::AppState;

const BASE_PATH: &str = "/users";

fn item_path(id: i64) -> String {
    format!("{}/{}", BASE_PATH, id)
}

#[derive(Debug, Validate)]
struct SignupData {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8))]
    password: String,
    #[validate(length(max = 255))]
    name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub profile_image: Option<String>,
}

/// Signup: multipart form with name/email/password fields and an optional
/// `profileImage` file part, which runs through the same admission pipeline
/// as media uploads (image category only).
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid fields or duplicate email", body = ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<ApiResponse<UserResponse>, HttpAppError> {
    let form = parse_signup(multipart)
        .await
        .map_err(|e| HttpAppError::at(e, BASE_PATH))?;

    SignupData {
        email: form.email.clone(),
        password: form.password.clone(),
        name: form.name.clone(),
    }
    .validate()
    .map_err(|e| HttpAppError::at(AppError::from(e), BASE_PATH))?;

    let profile_image = match form.profile_image {
        Some(file) => {
            let candidate = UploadCandidate {
                original_name: file.original_name.clone(),
                content_type: file.content_type.clone(),
                size_bytes: file.data.len() as u64,
            };
            let admitted =
                admit(&candidate).map_err(|e| HttpAppError::at(AppError::from(e), BASE_PATH))?;
            if admitted.category != MediaCategory::Image {
                return Err(HttpAppError::at(
                    AppError::InvalidInput("Profile image must be an image file".to_string()),
                    BASE_PATH,
                ));
            }

            let storage_key = generate_storage_key(admitted.category, &admitted.extension);
            state
                .storage
                .put(&storage_key, file.data)
                .await
                .map_err(|e| HttpAppError::at(storage_error_to_app(e), BASE_PATH))?;
            Some(storage_key)
        }
        None => None,
    };

    let password_hash = bcrypt::hash(&form.password, state.config.bcrypt_cost).map_err(|e| {
        HttpAppError::at(
            AppError::Internal(format!("Password hashing failed: {}", e)),
            BASE_PATH,
        )
    })?;

    let user = match state
        .users
        .create(form.name, form.email, password_hash, profile_image.clone())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            // Don't orphan the profile image when the row was never created.
            if let Some(key) = &profile_image {
                IngestionService::new(&state).remove_object(key).await;
            }
            return Err(HttpAppError::at(e, BASE_PATH));
        }
    };

    tracing::info!(user_id = user.id, "User created");

    Ok(ApiResponse::created(
        user.into(),
        "User created successfully",
        BASE_PATH,
    ))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses((status = 200, description = "Users retrieved successfully", body = [UserResponse]))
)]
pub async fn find_all(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<UserResponse>>, HttpAppError> {
    let users = state
        .users
        .find_all()
        .await
        .map_err(|e| HttpAppError::at(e, BASE_PATH))?;

    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(ApiResponse::success(
        users,
        "Users retrieved successfully",
        BASE_PATH,
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User retrieved successfully", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn find_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<UserResponse>, HttpAppError> {
    let user = state
        .users
        .get_by_id(id)
        .await
        .map_err(|e| HttpAppError::at(e, item_path(id)))?;

    Ok(ApiResponse::success(
        user.into(),
        "User retrieved successfully",
        item_path(id),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> Result<ApiResponse<UserResponse>, HttpAppError> {
    let password_hash = match body.password {
        Some(password) => Some(bcrypt::hash(&password, state.config.bcrypt_cost).map_err(
            |e| {
                HttpAppError::at(
                    AppError::Internal(format!("Password hashing failed: {}", e)),
                    item_path(id),
                )
            },
        )?),
        None => None,
    };

    let user = state
        .users
        .update(id, body.name, body.email, password_hash, body.profile_image)
        .await
        .map_err(|e| HttpAppError::at(e, item_path(id)))?;

    Ok(ApiResponse::success(
        user.into(),
        "User updated successfully",
        item_path(id),
    ))
}

/// Delete a user. Media rows go via FK cascade; their storage objects are
/// removed best-effort afterwards.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, HttpAppError> {
    let media = state
        .media
        .find_by_user(id)
        .await
        .map_err(|e| HttpAppError::at(e, item_path(id)))?;

    state
        .users
        .delete(id)
        .await
        .map_err(|e| HttpAppError::at(e, item_path(id)))?;

    let service = IngestionService::new(&state);
    for record in &media {
        service.remove_object(&record.storage_key).await;
    }

    tracing::info!(user_id = id, media_removed = media.len(), "User deleted");

    Ok(ApiResponse::success(
        (),
        "User deleted successfully",
        item_path(id),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/media",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User media files retrieved successfully", body = [MediaRecord]),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn user_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Vec<MediaRecord>>, HttpAppError> {
    let path = format!("{}/{}/media", BASE_PATH, id);

    // 404 for unknown users, not an empty list.
    state
        .users
        .get_by_id(id)
        .await
        .map_err(|e| HttpAppError::at(e, path.clone()))?;

    let media = state
        .media
        .find_by_user(id)
        .await
        .map_err(|e| HttpAppError::at(e, path.clone()))?;

    Ok(ApiResponse::success(
        media,
        "User media files retrieved successfully",
        path,
    ))
}
