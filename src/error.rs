//! Boundary error type for the HTTP handlers.
//!
//! Every variant renders as `{"error": <message>}`. Validation problems map
//! to 400; failures inside the aggregator or renderer map to 500 with the
//! underlying message embedded.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{analysis::AnalysisError, report::ReportError};

// ---

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No data points recorded.")]
    EmptyInput,

    #[error("{0}")]
    MissingField(&'static str),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    MalformedReportInput(String),

    #[error("Internal Server Error during analysis: {0}")]
    AnalysisFailed(String),

    #[error("Failed to generate PDF: {0}")]
    RenderFailed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        // ---
        match self {
            ApiError::EmptyInput
            | ApiError::MissingField(_)
            | ApiError::InvalidBody(_)
            | ApiError::MalformedReportInput(_) => StatusCode::BAD_REQUEST,
            ApiError::AnalysisFailed(_) | ApiError::RenderFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::EmptyInput => ApiError::EmptyInput,
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        // ---
        match err {
            ReportError::MalformedInput(_) => ApiError::MalformedReportInput(err.to_string()),
            ReportError::Pdf(msg) => ApiError::RenderFailed(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
