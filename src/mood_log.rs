//! Append-only CSV history of submitted observations.
//!
//! The log is a convenience side effect of analysis: it is created with a
//! header row on first write and only ever appended to afterwards. Columns
//! for each append come from that batch alone; no reconciliation is done
//! against rows written by earlier batches.

use std::{
    collections::HashSet,
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::{Config, Observation};

// ---

#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Handle on the CSV history file.
#[derive(Debug, Clone)]
pub struct MoodLog {
    // ---
    dir: PathBuf,
    path: PathBuf,
}

impl MoodLog {
    // ---
    pub fn new(dir: impl Into<PathBuf>, file_name: &str) -> Self {
        // ---
        let dir = dir.into();
        let path = dir.join(file_name);
        MoodLog { dir, path }
    }

    pub fn from_config(config: &Config) -> Self {
        MoodLog {
            dir: config.data_dir.clone(),
            path: config.csv_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `batch` to the log, writing the header first if the file is new.
    pub fn append(&self, batch: &[Observation]) -> Result<(), LogError> {
        // ---
        if batch.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(&self.dir)?;
        let write_header = !self.path.exists();
        let columns = columns(batch);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(&columns)?;
        }
        for obs in batch {
            writer.write_record(columns.iter().map(|c| cell(obs.fields().get(c))))?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Best-effort [`append`](Self::append): failures are logged, never returned.
    pub fn record(&self, batch: &[Observation]) {
        // ---
        match self.append(batch) {
            Ok(()) => debug!(
                "Appended {} observations to {}",
                batch.len(),
                self.path.display()
            ),
            Err(e) => error!("Error saving CSV to {}: {}", self.path.display(), e),
        }
    }
}

/// Union of field names across the batch, in order of first appearance.
fn columns(batch: &[Observation]) -> Vec<String> {
    // ---
    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for obs in batch {
        for key in obs.fields().keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn cell(value: Option<&Value>) -> String {
    // ---
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn obs(value: serde_json::Value) -> Observation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_two_appends_share_one_header() {
        // ---
        let tmp = tempfile::tempdir().unwrap();
        let log = MoodLog::new(tmp.path().join("mood data"), "history.csv");

        log.append(&[
            obs(json!({"expression": "happy", "ts": 1})),
            obs(json!({"expression": "sad", "ts": 2})),
        ])
        .unwrap();
        log.append(&[obs(json!({"expression": "drowsy", "ts": 3}))])
            .unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["expression,ts", "happy,1", "sad,2", "drowsy,3"]
        );
    }

    #[test]
    fn test_creates_missing_directory() {
        // ---
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("deeper");
        let log = MoodLog::new(&dir, "log.csv");

        log.append(&[Observation::new("happy")]).unwrap();

        assert!(dir.is_dir());
        assert!(log.path().is_file());
    }

    #[test]
    fn test_columns_follow_the_batch_shape() {
        // ---
        let tmp = tempfile::tempdir().unwrap();
        let log = MoodLog::new(tmp.path(), "log.csv");

        log.append(&[
            obs(json!({"expression": "happy", "face": true})),
            obs(json!({"expression": "sad, really", "note": null, "extra": [1, 2]})),
        ])
        .unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "expression,face,note,extra");
        assert_eq!(lines[1], "happy,True,,");
        assert_eq!(lines[2], "\"sad, really\",,,\"[1,2]\"");
    }

    #[test]
    fn test_later_batches_do_not_rewrite_header() {
        // ---
        let tmp = tempfile::tempdir().unwrap();
        let log = MoodLog::new(tmp.path(), "log.csv");

        log.append(&[obs(json!({"expression": "happy"}))]).unwrap();
        log.append(&[obs(json!({"expression": "sad", "ts": 9}))])
            .unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["expression", "happy", "sad,9"]);
    }

    #[test]
    fn test_columns_for_wide_batches() {
        // ---
        let batch: Vec<Observation> = (0..20_000)
            .map(|i| {
                let mut fields = serde_json::Map::new();
                fields.insert("expression".into(), json!("happy"));
                fields.insert(format!("f{}", i), json!(i));
                Observation::try_from(fields).unwrap()
            })
            .collect();

        let started = std::time::Instant::now();
        let cols = columns(&batch);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));

        assert_eq!(cols.len(), 20_001);
        assert_eq!(cols[0], "expression");
        assert_eq!(cols[1], "f0");
        assert_eq!(cols[20_000], "f19999");
    }

    #[test]
    fn test_from_config_uses_configured_path() {
        // ---
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: tmp.path().join("mood data"),
            csv_file: "history.csv".to_string(),
            ..Config::default()
        };
        let log = MoodLog::from_config(&config);

        assert_eq!(log.path(), config.csv_path());
        log.append(&[Observation::new("sad")]).unwrap();
        assert!(config.csv_path().is_file());
    }

    #[test]
    fn test_record_swallows_failures() {
        // ---
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the directory should be makes create_dir_all fail.
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let log = MoodLog::new(&blocker, "log.csv");

        assert!(log.append(&[Observation::new("happy")]).is_err());
        log.record(&[Observation::new("happy")]);
    }
}
