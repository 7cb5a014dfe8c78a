//! Mood aggregation: counts, percentages, dominant mood and recommendation.

use std::collections::HashMap;

use thiserror::Error;

use crate::{AggregationResult, Distribution, MoodLog, Observation};

// ---

/// Categories that trigger the stress-relief recommendation.
pub const NEGATIVE_MOODS: [&str; 2] = ["sad", "drowsy"];

/// Share (in percent) the dominant negative mood must exceed.
pub const NEGATIVE_THRESHOLD: f64 = 20.0;

pub const BALANCED_MESSAGE: &str = "Your overall mood is balanced. Keep up the good work!";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("No data points recorded.")]
    EmptyInput,
}

/// Statistics for one batch, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodSummary {
    // ---
    pub total_samples: usize,
    /// Occurrences per category, in first-occurrence order.
    pub counts: Vec<(String, usize)>,
    pub distribution: Distribution,
    /// Dominant category with its original casing.
    pub dominant: String,
    pub recommendation: String,
}

/// Analyse `batch` and append it to `log` (best-effort).
///
/// A failed append is logged and otherwise ignored; the analysis result is
/// returned either way.
pub fn analyze(batch: &[Observation], log: &MoodLog) -> Result<AggregationResult, AnalysisError> {
    // ---
    let summary = summarize(batch)?;
    log.record(batch);

    Ok(AggregationResult {
        total_samples: summary.total_samples,
        dominant_mood: summary.dominant.to_uppercase(),
        report_message: summary.recommendation,
        pie_chart_data: summary.distribution,
        csv_saved_path: log.path().display().to_string(),
    })
}

/// Pure aggregation step of [`analyze`].
pub fn summarize(batch: &[Observation]) -> Result<MoodSummary, AnalysisError> {
    // ---
    if batch.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let total_samples = batch.len();
    let counts = count_expressions(batch);

    let distribution = Distribution(
        counts
            .iter()
            .map(|(label, count)| (label.clone(), percentage(*count, total_samples)))
            .collect(),
    );

    // Ties go to the category seen first.
    let mut dominant = &counts[0];
    for entry in &counts[1..] {
        if entry.1 > dominant.1 {
            dominant = entry;
        }
    }
    let share = percentage(dominant.1, total_samples);
    let dominant = dominant.0.clone();
    let recommendation = recommend(&dominant, share);

    Ok(MoodSummary {
        total_samples,
        counts,
        distribution,
        dominant,
        recommendation,
    })
}

/// Recommendation text for the dominant category and its percentage share.
pub fn recommend(dominant: &str, share: f64) -> String {
    // ---
    if NEGATIVE_MOODS.contains(&dominant) && share > NEGATIVE_THRESHOLD {
        format!(
            "Your dominant state was {}. It's a perfect time for a quick mental reset! \
             Try the Face Matching Emoji Game to shift your focus and release some stress.",
            dominant.to_uppercase()
        )
    } else {
        BALANCED_MESSAGE.to_string()
    }
}

fn count_expressions(batch: &[Observation]) -> Vec<(String, usize)> {
    // ---
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for obs in batch {
        match index.get(obs.expression()) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(obs.expression(), counts.len());
                counts.push((obs.expression().to_string(), 1));
            }
        }
    }
    counts
}

/// `count / total * 100` rounded to one decimal place.
///
/// Rounding goes through the exact decimal expansion of the binary value with
/// ties to even, so e.g. 6.25 becomes 6.2.
fn percentage(count: usize, total: usize) -> f64 {
    // ---
    let raw = (count as f64 / total as f64) * 100.0;
    format!("{:.1}", raw).parse().unwrap_or(raw)
}
