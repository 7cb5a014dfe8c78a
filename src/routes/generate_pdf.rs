//! `POST /api/generate-pdf`: render a previously returned analysis as PDF.
//!
//! Request body: `{"report_data": {...}}`, where `report_data` has the shape
//! of the `/api/analyze-mood` response. The document is returned as an
//! attachment named [`REPORT_FILENAME`].

use axum::{
    extract::rejection::JsonRejection,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{error::ApiError, report, MoodLog};

// ---

pub const REPORT_FILENAME: &str = "Mysa_Mood_Report.pdf";

pub fn router() -> Router<MoodLog> {
    // ---
    Router::new().route("/api/generate-pdf", post(handler).options(super::preflight))
}

#[derive(Debug, Deserialize)]
struct GeneratePdfRequest {
    report_data: Option<Value>,
}

async fn handler(
    payload: Result<Json<GeneratePdfRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    // ---
    info!("POST /api/generate-pdf");

    let Json(request) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let report_data = request
        .report_data
        .ok_or(ApiError::MissingField("Missing 'report_data' in request."))?;

    let pdf = tokio::task::spawn_blocking(move || report::render(&report_data))
        .await
        .map_err(|e| ApiError::RenderFailed(e.to_string()))??;

    info!("Rendered report ({} bytes)", pdf.len());

    let disposition = format!("attachment; filename=\"{}\"", REPORT_FILENAME);
    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}
