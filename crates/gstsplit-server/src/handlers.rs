//! HTTP handlers for the gstsplit service

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gstsplit_core::{secure_filename, split_upload_bytes, GstinFilter, UploadError, UploadKind};

use crate::error::ApiError;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("index.html");

/// Body of a successful upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<String>,
}

/// Upload form
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Accept a `.pdf` or `.zip` bundle and split it into per-invoice PDFs.
///
/// Form fields: `file` (required) and `gstin` (optional recipient filter).
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut gstin = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            // A `file` part without a filename is a plain form field, not an upload
            Some("file") if field.file_name().is_some() => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Multipart(e.to_string()))?;
                file = Some((filename, data));
            }
            Some("gstin") => {
                gstin = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Multipart(e.to_string()))?;
            }
            _ => {}
        }
    }

    let (filename, data) = file.ok_or(UploadError::NoFilePart)?;
    UploadKind::for_upload(&filename)?;

    let filter = GstinFilter::new(Some(&gstin));
    let splitter = state.splitter(filter);
    let scratch_dir = state.upload_dir().to_path_buf();
    info!(
        "Upload {} ({} bytes, GSTIN filter: {})",
        filename,
        data.len(),
        if gstin.trim().is_empty() { "none" } else { gstin.trim() }
    );

    let files = tokio::task::spawn_blocking(move || {
        split_upload_bytes(&data, &filename, &splitter, &scratch_dir)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    debug!("Split into {} files", files.len());

    Ok(Json(UploadResponse {
        message: "Files processed successfully!".to_string(),
        files: files.into_iter().map(|f| f.filename).collect(),
    }))
}

/// Return a split invoice as an attachment.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    // Only flat names the splitter could have produced
    if filename.is_empty() || secure_filename(&filename) != filename {
        return Err(ApiError::NotFound(filename));
    }

    let path = state.output_dir().join(&filename);
    let data = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::NotFound(format!("{} ({})", filename, e)))?;

    let content_type = if filename.to_ascii_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        data,
    )
        .into_response())
}
