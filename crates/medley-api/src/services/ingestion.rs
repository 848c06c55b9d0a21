//! Media ingestion service
//!
//! Admission and commit for upload batches: validate → place in storage →
//! persist record + tag joins. Every file is handled independently; a failure
//! on one file never rolls back files committed before it, and the caller
//! receives each outcome distinctly.

use std::sync::Arc;

use medley_core::admission::admit;
use medley_core::models::MediaRecord;
use medley_core::{AppError, ErrorMetadata, UploadCandidate};
use medley_db::{MediaFileUpdate, MediaRepository, NewMedia};
use medley_storage::keys::{file_name_of, generate_storage_key};
use medley_storage::Storage;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::storage_error_to_app;
use crate::extract::{sanitize_filename, MultipartFile};
use crate::state::AppState;

/// One file of a batch that failed admission or commit.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RejectedUpload {
    #[serde(rename = "originalName")]
    pub original_name: String,
    pub message: String,
}

/// Batch result: committed records plus per-file rejections.
#[derive(Debug, Serialize, ToSchema)]
pub struct IngestionOutcome {
    pub created: Vec<MediaRecord>,
    pub rejected: Vec<RejectedUpload>,
}

impl IngestionOutcome {
    /// Per-file failure messages for the error envelope, used when nothing
    /// in the batch was committed.
    pub fn failure_details(&self) -> Vec<String> {
        self.rejected
            .iter()
            .map(|r| format!("{}: {}", r.original_name, r.message))
            .collect()
    }
}

/// Media ingestion service
pub struct IngestionService {
    media: MediaRepository,
    storage: Arc<dyn Storage>,
}

impl IngestionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            media: state.media.clone(),
            storage: state.storage.clone(),
        }
    }

    /// Admit and commit a batch of files for an owner. Tag ids are resolved
    /// per file against existing tags; unknown ids are dropped, not errors.
    ///
    /// Admission rejections are per-file and processing continues. A
    /// persistence failure on file N aborts the remainder: files before N
    /// stay committed, N carries the failure, and the rest are reported as
    /// not attempted. Returns Err only when the failure left nothing
    /// committed, so it surfaces as a server error rather than a rejection.
    pub async fn ingest_batch(
        &self,
        owner_id: i64,
        files: Vec<MultipartFile>,
        tag_ids: &[i64],
    ) -> Result<IngestionOutcome, AppError> {
        let mut created = Vec::new();
        let mut rejected = Vec::new();
        let mut fatal: Option<AppError> = None;

        let mut files = files.into_iter();
        while let Some(file) = files.next() {
            let original_name = file.original_name.clone();
            match self.ingest_one(owner_id, file, tag_ids).await {
                Ok(record) => created.push(record),
                Err(e) => {
                    tracing::debug!(
                        original_name = %original_name,
                        error = %e,
                        "Upload candidate rejected"
                    );
                    let is_fatal = matches!(
                        e,
                        AppError::Database(_)
                            | AppError::Storage(_)
                            | AppError::Internal(_)
                            | AppError::InternalWithSource { .. }
                    );
                    rejected.push(RejectedUpload {
                        original_name,
                        message: e.client_message(),
                    });
                    if is_fatal {
                        for rest in files.by_ref() {
                            rejected.push(RejectedUpload {
                                original_name: rest.original_name,
                                message: "not attempted: batch aborted after a persistence failure"
                                    .to_string(),
                            });
                        }
                        fatal = Some(e);
                        break;
                    }
                }
            }
        }

        if created.is_empty() {
            if let Some(e) = fatal {
                return Err(e);
            }
        }

        Ok(IngestionOutcome { created, rejected })
    }

    /// Validate one candidate and, if admitted, place its bytes and persist
    /// the record. Storage placement happens before the database write; if
    /// that write fails the orphaned object is cleaned up best-effort.
    async fn ingest_one(
        &self,
        owner_id: i64,
        file: MultipartFile,
        tag_ids: &[i64],
    ) -> Result<MediaRecord, AppError> {
        let candidate = UploadCandidate {
            original_name: file.original_name.clone(),
            content_type: file.content_type.clone(),
            size_bytes: file.data.len() as u64,
        };
        let admitted = admit(&candidate)?;
        let safe_original_name = sanitize_filename(&admitted.original_name)?;

        let storage_key = generate_storage_key(admitted.category, &admitted.extension);
        self.storage
            .put(&storage_key, file.data)
            .await
            .map_err(storage_error_to_app)?;

        let result = self
            .media
            .create(
                NewMedia {
                    user_id: owner_id,
                    file_name: file_name_of(&storage_key).to_string(),
                    original_name: safe_original_name,
                    category: admitted.category,
                    extension: admitted.extension.clone(),
                    size_bytes: admitted.size_bytes as i64,
                    storage_key: storage_key.clone(),
                },
                tag_ids,
            )
            .await;

        match result {
            Ok(record) => {
                tracing::info!(
                    media_id = record.id,
                    owner_id,
                    storage_key = %storage_key,
                    category = ?record.category,
                    "Media file ingested"
                );
                Ok(record)
            }
            Err(e) => {
                self.remove_object(&storage_key).await;
                Err(e)
            }
        }
    }

    /// Admit and store a replacement file for an update, returning the new
    /// file metadata for the record. The record update itself (and old-object
    /// cleanup) is the caller's step.
    pub async fn prepare_replacement(
        &self,
        file: MultipartFile,
    ) -> Result<MediaFileUpdate, AppError> {
        let candidate = UploadCandidate {
            original_name: file.original_name.clone(),
            content_type: file.content_type.clone(),
            size_bytes: file.data.len() as u64,
        };
        let admitted = admit(&candidate)?;
        let safe_original_name = sanitize_filename(&admitted.original_name)?;

        let storage_key = generate_storage_key(admitted.category, &admitted.extension);
        self.storage
            .put(&storage_key, file.data)
            .await
            .map_err(storage_error_to_app)?;

        Ok(MediaFileUpdate {
            file_name: file_name_of(&storage_key).to_string(),
            original_name: safe_original_name,
            category: admitted.category,
            extension: admitted.extension,
            size_bytes: admitted.size_bytes as i64,
            storage_key,
        })
    }

    /// Best-effort storage object removal. A missing object is tolerated by
    /// the backend; other failures are logged and not surfaced, since the
    /// record side has already been settled.
    pub async fn remove_object(&self, storage_key: &str) {
        if let Err(e) = self.storage.delete(storage_key).await {
            tracing::warn!(
                storage_key = %storage_key,
                error = %e,
                "Failed to remove storage object"
            );
        }
    }
}
