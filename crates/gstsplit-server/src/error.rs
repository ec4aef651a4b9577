//! Error types for the gstsplit HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use gstsplit_core::{SplitError, UploadError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Upload(#[from] UploadError),

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Processing failed: {0}")]
    Processing(#[from] SplitError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Upload(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Multipart(msg) => {
                tracing::warn!("Malformed upload: {}", msg);
                (StatusCode::BAD_REQUEST, "Malformed upload".to_string())
            }
            ApiError::NotFound(name) => {
                tracing::error!("Error downloading file: {}", name);
                (StatusCode::NOT_FOUND, "File not found".to_string())
            }
            // Client mistakes that only surface once the splitter runs
            ApiError::Processing(SplitError::Upload(e)) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Processing(e) => {
                tracing::error!("Error processing file: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while processing the file".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while processing the file".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
