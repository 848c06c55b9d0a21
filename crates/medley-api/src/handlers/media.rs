use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use medley_core::models::MediaRecord;
use medley_core::AppError;

use crate::auth::models::CurrentUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::extract::{parse_media_update, parse_media_upload};
use crate::response::ApiResponse;
use crate::services::ingestion::{IngestionOutcome, IngestionService};
use crate::state::AppState;

const BASE_PATH: &str = "/media";

fn item_path(id: i64) -> String {
    format!("{}/{}", BASE_PATH, id)
}

/// Upload a batch of media files (partial accept).
///
/// Every file is admitted and committed independently; the response reports
/// created records and per-file rejections distinctly. If no file was
/// admitted, the request fails with one error entry per file.
#[utoipa::path(
    post,
    path = "/api/media",
    tag = "media",
    responses(
        (status = 201, description = "Batch processed; created and rejected reported per file", body = IngestionOutcome),
        (status = 400, description = "Every file was rejected", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = current_user.id, operation = "upload_media"))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> Result<ApiResponse<IngestionOutcome>, HttpAppError> {
    let form = parse_media_upload(multipart)
        .await
        .map_err(|e| HttpAppError::at(e, BASE_PATH))?;

    let service = IngestionService::new(&state);
    let outcome = service
        .ingest_batch(current_user.id, form.files, &form.tag_ids)
        .await
        .map_err(|e| HttpAppError::at(e, BASE_PATH))?;

    if outcome.created.is_empty() && !outcome.rejected.is_empty() {
        let details = outcome.failure_details();
        return Err(HttpAppError::at(
            AppError::validation(format!("{} file(s) rejected", details.len()), details),
            BASE_PATH,
        ));
    }

    let message = if outcome.rejected.is_empty() {
        "Media files uploaded successfully".to_string()
    } else {
        format!(
            "{} file(s) uploaded, {} rejected",
            outcome.created.len(),
            outcome.rejected.len()
        )
    };

    Ok(ApiResponse::created(outcome, message, BASE_PATH))
}

#[utoipa::path(
    get,
    path = "/api/media",
    tag = "media",
    responses((status = 200, description = "Media files retrieved successfully", body = [MediaRecord]))
)]
pub async fn find_all(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<MediaRecord>>, HttpAppError> {
    let media = state
        .media
        .find_all()
        .await
        .map_err(|e| HttpAppError::at(e, BASE_PATH))?;

    Ok(ApiResponse::success(
        media,
        "Media files retrieved successfully",
        BASE_PATH,
    ))
}

/// Fetch one record. The view count increments exactly once per successful
/// read, atomically at the store, and the returned record reflects it.
#[utoipa::path(
    get,
    path = "/api/media/{id}",
    tag = "media",
    params(("id" = i64, Path, description = "Media id")),
    responses(
        (status = 200, description = "Media file retrieved successfully", body = MediaRecord),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
pub async fn find_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<MediaRecord>, HttpAppError> {
    let record = state
        .media
        .get_counting_view(id)
        .await
        .map_err(|e| HttpAppError::at(e, item_path(id)))?;

    Ok(ApiResponse::success(
        record,
        "Media file retrieved successfully",
        item_path(id),
    ))
}

/// Update a record: optional replacement file (re-admitted through the full
/// pipeline) and/or a new tag set. A replaced storage object is cleaned up
/// best-effort after the record update commits.
#[utoipa::path(
    patch,
    path = "/api/media/{id}",
    tag = "media",
    params(("id" = i64, Path, description = "Media id")),
    responses(
        (status = 200, description = "Media file updated successfully", body = MediaRecord),
        (status = 400, description = "Replacement file rejected", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<ApiResponse<MediaRecord>, HttpAppError> {
    let form = parse_media_update(multipart)
        .await
        .map_err(|e| HttpAppError::at(e, item_path(id)))?;

    let service = IngestionService::new(&state);

    let file_update = match form.file {
        Some(file) => Some(
            service
                .prepare_replacement(file)
                .await
                .map_err(|e| HttpAppError::at(e, item_path(id)))?,
        ),
        None => None,
    };
    let new_key = file_update.as_ref().map(|f| f.storage_key.clone());

    let (record, replaced_key) = match state
        .media
        .update(id, file_update, form.tag_ids.as_deref())
        .await
    {
        Ok(result) => result,
        Err(e) => {
            // The replacement object is already in storage; don't orphan it.
            if let Some(key) = new_key {
                service.remove_object(&key).await;
            }
            return Err(HttpAppError::at(e, item_path(id)));
        }
    };

    if let Some(key) = replaced_key {
        service.remove_object(&key).await;
    }

    Ok(ApiResponse::success(
        record,
        "Media file updated successfully",
        item_path(id),
    ))
}

/// Delete a record and its storage object. A missing object is logged and
/// tolerated; the record deletion stands either way.
#[utoipa::path(
    delete,
    path = "/api/media/{id}",
    tag = "media",
    params(("id" = i64, Path, description = "Media id")),
    responses(
        (status = 200, description = "Media file deleted successfully"),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, HttpAppError> {
    let row = state
        .media
        .delete(id)
        .await
        .map_err(|e| HttpAppError::at(e, item_path(id)))?;

    IngestionService::new(&state)
        .remove_object(&row.storage_key)
        .await;

    Ok(ApiResponse::success(
        (),
        "Media file deleted successfully",
        item_path(id),
    ))
}
