//! HTTP error response conversion
//!
//! Single error-to-response mapping applied uniformly at the request
//! boundary: every failure renders the envelope
//! `{statusCode, message, path, errors?, timestamp}`.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse,
//! HttpAppError>` and attach the request path with `HttpAppError::at` so the
//! envelope carries it.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use medley_core::{AppError, ErrorMetadata, LogLevel};
use medley_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub message: String,
}

/// Failure envelope. `errors` carries per-item messages (per-file upload
/// failures) and is omitted otherwise.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper type pairing an AppError with the request path it occurred on.
/// Needed because of Rust's orphan rules - we can't implement IntoResponse
/// (external trait) for AppError (external type from medley-core).
#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    pub path: Option<String>,
}

impl HttpAppError {
    pub fn at(error: impl Into<AppError>, path: impl Into<String>) -> Self {
        HttpAppError {
            error: error.into(),
            path: Some(path.into()),
        }
    }
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError {
            error: err,
            path: None,
        }
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::from(err).into()
    }
}

/// Storage failures surface as server errors; the cause is preserved for the
/// log, not the client.
pub fn storage_error_to_app(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(key) => AppError::NotFound(format!("File {} not found", key)),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        other => AppError::Storage(other.to_string()),
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        storage_error_to_app(err).into()
    }
}

/// Convert JSON body deserialization failures into a 400 with our envelope.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(format!("Invalid request body: {}", rejection.body_text())).into()
    }
}

/// JSON body extractor that deserializes and then runs validator-derive
/// checks, returning our envelope (400 + JSON) on either failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| HttpAppError {
                path: Some(path.clone()),
                ..HttpAppError::from(e)
            })?;
        inner
            .validate()
            .map_err(|e| HttpAppError::at(AppError::from(e), path))?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Request failed"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.error;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let details = app_error.details();
        let errors: Option<Vec<ErrorDetail>> = (!details.is_empty()).then(|| {
            details
                .iter()
                .map(|message| ErrorDetail {
                    message: message.clone(),
                })
                .collect()
        });

        let body = ErrorResponse {
            status_code: status.as_u16(),
            message: app_error.client_message(),
            path: self.path.unwrap_or_else(|| "/".to_string()),
            errors,
            timestamp: Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_mapping() {
        let app = storage_error_to_app(StorageError::NotFound("images/x.png".to_string()));
        assert!(matches!(app, AppError::NotFound(_)));

        let app = storage_error_to_app(StorageError::UploadFailed("disk full".to_string()));
        match app {
            AppError::Storage(msg) => assert!(msg.contains("disk full")),
            other => panic!("Expected Storage variant, got {:?}", other),
        }

        let app = storage_error_to_app(StorageError::InvalidKey("bad key".to_string()));
        assert!(matches!(app, AppError::InvalidInput(_)));
    }

    /// The failure envelope contract: statusCode, message, path, timestamp,
    /// plus errors[] only when per-item details exist.
    #[test]
    fn test_error_envelope_shape() {
        let response = ErrorResponse {
            status_code: 400,
            message: "2 files rejected".to_string(),
            path: "/media".to_string(),
            errors: Some(vec![ErrorDetail {
                message: "bad.exe: file extension 'exe' is not allowed".to_string(),
            }]),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["message"], "2 files rejected");
        assert_eq!(json["path"], "/media");
        assert_eq!(json["errors"][0]["message"].as_str().unwrap(), "bad.exe: file extension 'exe' is not allowed");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_error_envelope_omits_empty_errors() {
        let response = ErrorResponse {
            status_code: 404,
            message: "Tag with ID 9 not found".to_string(),
            path: "/tags/9".to_string(),
            errors: None,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_http_app_error_carries_path() {
        let err = HttpAppError::at(
            AppError::NotFound("Media file with ID 3 not found".to_string()),
            "/media/3",
        );
        assert_eq!(err.path.as_deref(), Some("/media/3"));
        assert_eq!(err.error.http_status_code(), 404);
    }
}
