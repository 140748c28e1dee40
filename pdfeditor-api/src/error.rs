use crate::api::{ApiResponse, FileResponse};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pdfeditor::{EditorError, EngineError};
use thiserror::Error;
use tracing::{error, warn};

/// Application-specific error types for the API
#[derive(Error, Debug)]
pub enum AppError {
    /// Failures of the document operations
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// The request body could not be read as a multipart form
    #[error("Failed to read multipart form: {0}")]
    Multipart(#[from] MultipartError),

    /// A form field carried an unusable value
    #[error("{0}")]
    BadRequest(String),

    /// The worker running the operation did not finish
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Editor(EditorError::ArtifactNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Editor(EditorError::Engine(EngineError::Unsupported { .. })) => {
                StatusCode::NOT_IMPLEMENTED
            }
            AppError::Editor(e) if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            AppError::Editor(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Multipart(e) => e.status(),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        } else {
            warn!("Request rejected with {}: {}", status, self);
        }

        let partial: Vec<FileResponse> = match &self {
            AppError::Editor(e) => e
                .partial_artifacts()
                .iter()
                .cloned()
                .map(FileResponse::from)
                .collect(),
            _ => Vec::new(),
        };
        let data = (!partial.is_empty()).then_some(partial);

        (status, Json(ApiResponse::failure(self.to_string(), data))).into_response()
    }
}
