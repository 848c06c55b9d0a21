//! Success response envelope.
//!
//! Every successful operation returns `{data, message, path, statusCode}`.
//! This shape is the externally observable contract of the API and must stay
//! stable across all endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: String,
    pub path: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_status(data, message, path, StatusCode::OK)
    }

    pub fn created(data: T, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_status(data, message, path, StatusCode::CREATED)
    }

    pub fn with_status(
        data: T,
        message: impl Into<String>,
        path: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        ApiResponse {
            data,
            message: message.into(),
            path: path.into(),
            status_code: status.as_u16(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The envelope contract: data, message, path, statusCode.
    #[test]
    fn test_success_envelope_shape() {
        let response = ApiResponse::success(vec![1, 2, 3], "Items retrieved", "/items");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["message"], "Items retrieved");
        assert_eq!(json["path"], "/items");
        assert_eq!(json["statusCode"], 200);
    }

    #[test]
    fn test_created_envelope_status() {
        let response = ApiResponse::created((), "Created", "/items");
        assert_eq!(response.status_code, 201);
    }
}
