//! Configuration loader for the `mysa-mood` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Nothing else in the crate reads `env::var`; the
//! resulting [`Config`] is handed explicitly to whatever needs it.
//!
use std::{
    env,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use anyhow::{anyhow, Result};

/// Parse an optional environment variable into `$ty` with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! string_env {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_DIR: &str = "mood data";
pub const DEFAULT_CSV_FILE: &str = "mood_tracker_history.csv";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Interface the HTTP server binds to.
    pub host: IpAddr,

    /// Port the HTTP server listens on.
    pub port: u16,

    /// Directory holding the mood history log (created on demand).
    pub data_dir: PathBuf,

    /// File name of the CSV history log inside `data_dir`.
    pub csv_file: String,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `MOOD_HOST` – bind address (default: 127.0.0.1)
/// - `MOOD_PORT` – bind port (default: 5000)
/// - `MOOD_DATA_DIR` – history directory (default: `mood data`)
/// - `MOOD_CSV_FILE` – history file name (default: `mood_tracker_history.csv`)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let host = parse_env!("MOOD_HOST", IpAddr, IpAddr::from([127, 0, 0, 1]));
    let port = parse_env!("MOOD_PORT", u16, DEFAULT_PORT);
    let data_dir = PathBuf::from(string_env!("MOOD_DATA_DIR", DEFAULT_DATA_DIR));
    let csv_file = string_env!("MOOD_CSV_FILE", DEFAULT_CSV_FILE);

    if csv_file.trim().is_empty() {
        return Err(anyhow!("MOOD_CSV_FILE must not be empty"));
    }

    Ok(Config {
        host,
        port,
        data_dir,
        csv_file,
    })
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            csv_file: DEFAULT_CSV_FILE.to_string(),
        }
    }
}

impl Config {
    /// Socket address the server should bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Full path of the CSV history log.
    pub fn csv_path(&self) -> PathBuf {
        self.data_dir.join(&self.csv_file)
    }

    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  MOOD_HOST     : {}", self.host);
        tracing::info!("  MOOD_PORT     : {}", self.port);
        tracing::info!("  MOOD_DATA_DIR : {}", self.data_dir.display());
        tracing::info!("  MOOD_CSV_FILE : {}", self.csv_file);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_default_paths() {
        // ---
        let cfg = Config::default();
        assert_eq!(
            cfg.csv_path(),
            PathBuf::from("mood data").join("mood_tracker_history.csv")
        );
        assert_eq!(cfg.bind_addr().port(), 5000);
    }
}
