use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::capture::CaptureError;

/// User-facing message for any failed analysis flow. Detail is logged, never shown.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "An unexpected error occurred while generating your report. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient input: {0}")]
    InsufficientInput(String),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(#[from] AnalysisError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for the presentation layer.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InsufficientInput(_) => "INSUFFICIENT_INPUT",
            AppError::Capture(_) => "CAPTURE_ERROR",
            AppError::AnalysisFailed(_) => "ANALYSIS_FAILED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The single string surfaced to the candidate. Analysis and internal
    /// failures collapse to a generic message; input errors keep theirs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::InsufficientInput(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::Capture(_) => {
                "The test image could not be loaded. Please start the test again.".to_string()
            }
            AppError::AnalysisFailed(_) => ANALYSIS_FAILED_MESSAGE.to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientInput(_) | AppError::Capture(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::AnalysisFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Flow failures are logged by the requester; only plumbing errors here.
        if let AppError::Internal(e) = &self {
            tracing::error!("Internal error: {e:?}");
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.user_message()
            }
        }));

        (self.status(), body).into_response()
    }
}
