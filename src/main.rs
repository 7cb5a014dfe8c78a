//! Application entry point for the `mysa-mood` backend service.
//!
//! This binary orchestrates the startup sequence for the mood API:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the CSV history handle from the configured paths
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `MOOD_HOST` / `MOOD_PORT` (optional) – bind address (default: 127.0.0.1:5000)
//! - `MOOD_DATA_DIR` / `MOOD_CSV_FILE` (optional) – history log location
//! - `MOOD_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `MOOD_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, io::IsTerminal};

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use mysa_mood::{config, routes, MoodLog};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let log = MoodLog::from_config(&cfg);
    tracing::info!("Mood history will be appended to {}", log.path().display());

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(log);

    let addr = cfg.bind_addr();
    tracing::info!("Starting Mood Analysis API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Install the global compact `fmt` subscriber.
///
/// `RUST_LOG` wins over `MOOD_LOG_LEVEL`; `FORCE_COLOR` overrides TTY
/// detection and `MOOD_SPAN_EVENTS` (`full`, `enter_exit`) widens span output.
fn init_tracing() {
    // ---
    let span_events = match env::var("MOOD_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("MOOD_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},tower_http=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
