//! Route gateway: merges the per-endpoint subrouters and applies the layers
//! shared by every response (request tracing, permissive CORS headers).

use axum::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, StatusCode,
    },
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::MoodLog;

mod analyze_mood;
mod generate_pdf;
mod health;

pub use generate_pdf::REPORT_FILENAME;

// ---

pub fn router(log: MoodLog) -> Router {
    // ---
    Router::new()
        .merge(analyze_mood::router())
        .merge(generate_pdf::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, GET, OPTIONS"),
        ))
        .with_state(log)
}

/// Cross-origin pre-flight: empty 200.
async fn preflight() -> StatusCode {
    StatusCode::OK
}
