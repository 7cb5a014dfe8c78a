//! Mood analysis and PDF report service for the Mysa emoji tracker.
//!
//! The crate follows the Explicit Module Boundary Pattern (EMBP): each module
//! exposes a small surface and shared types are re-exported here, so the
//! modules under `routes/` only ever reach for `crate::X`.
//!
//! - [`analysis`] reduces an observation batch to counts, percentages, the
//!   dominant mood and a recommendation.
//! - [`mood_log`] appends each analysed batch to a CSV history file.
//! - [`report`] lays out and renders the one-page PDF report.
//! - [`routes`] exposes both operations over HTTP.

pub mod analysis;
pub mod config;
pub mod error;
pub mod models;
pub mod mood_log;
pub mod report;
pub mod routes;

pub use config::Config;
pub use models::{AggregationResult, Distribution, Observation};
pub use mood_log::MoodLog;
