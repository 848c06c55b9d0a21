use std::sync::Arc;

use axum::extract::{Path, State};
use medley_core::models::Tag;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

const BASE_PATH: &str = "/tags";

fn item_path(id: i64) -> String {
    format!("{}/{}", BASE_PATH, id)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTagRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/tags",
    tag = "tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created successfully", body = Tag),
        (status = 400, description = "Duplicate or invalid name", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<CreateTagRequest>,
) -> Result<ApiResponse<Tag>, HttpAppError> {
    let tag = state
        .tags
        .create(body.name)
        .await
        .map_err(|e| HttpAppError::at(e, BASE_PATH))?;

    Ok(ApiResponse::created(
        tag,
        "Tag created successfully",
        BASE_PATH,
    ))
}

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    responses((status = 200, description = "Tags retrieved successfully", body = [Tag]))
)]
pub async fn find_all(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<Tag>>, HttpAppError> {
    let tags = state
        .tags
        .find_all()
        .await
        .map_err(|e| HttpAppError::at(e, BASE_PATH))?;

    Ok(ApiResponse::success(
        tags,
        "Tags retrieved successfully",
        BASE_PATH,
    ))
}

#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    tag = "tags",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag retrieved successfully", body = Tag),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    )
)]
pub async fn find_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Tag>, HttpAppError> {
    let tag = state
        .tags
        .get_by_id(id)
        .await
        .map_err(|e| HttpAppError::at(e, item_path(id)))?;

    Ok(ApiResponse::success(
        tag,
        "Tag retrieved successfully",
        item_path(id),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/tags/{id}",
    tag = "tags",
    params(("id" = i64, Path, description = "Tag id")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag updated successfully", body = Tag),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdateTagRequest>,
) -> Result<ApiResponse<Tag>, HttpAppError> {
    let tag = state
        .tags
        .update(id, body.name)
        .await
        .map_err(|e| HttpAppError::at(e, item_path(id)))?;

    Ok(ApiResponse::success(
        tag,
        "Tag updated successfully",
        item_path(id),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    tag = "tags",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag deleted successfully"),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    )
)]
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, HttpAppError> {
    state
        .tags
        .delete(id)
        .await
        .map_err(|e| HttpAppError::at(e, item_path(id)))?;

    Ok(ApiResponse::success(
        (),
        "Tag deleted successfully",
        item_path(id),
    ))
}
