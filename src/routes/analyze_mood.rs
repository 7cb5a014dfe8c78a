//! `POST /api/analyze-mood`: aggregate an observation batch.
//!
//! Request body: `{"data_log": [{"expression": "...", ...}, ...]}`.
//! A missing, null or empty `data_log` is a 400. The batch is analysed on the
//! blocking pool since it also appends to the CSV history.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{analysis, error::ApiError, AggregationResult, MoodLog, Observation};

// ---

pub fn router() -> Router<MoodLog> {
    // ---
    Router::new().route("/api/analyze-mood", post(handler).options(super::preflight))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    data_log: Option<Vec<Observation>>,
}

/// JSON response body: the aggregation result plus `"success": true`.
#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    success: bool,
    #[serde(flatten)]
    result: AggregationResult,
}

async fn handler(
    State(log): State<MoodLog>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    // ---
    info!("POST /api/analyze-mood");

    let Json(request) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let batch = match request.data_log {
        Some(batch) if !batch.is_empty() => batch,
        _ => return Err(ApiError::MissingField("No valid data log received.")),
    };

    debug!("Analyzing {} observations", batch.len());

    let result = tokio::task::spawn_blocking(move || analysis::analyze(&batch, &log))
        .await
        .map_err(|e| ApiError::AnalysisFailed(e.to_string()))??;

    info!(
        "Analysis complete: {} samples, dominant mood {}",
        result.total_samples, result.dominant_mood
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        result,
    }))
}
