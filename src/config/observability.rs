//! Logging, telemetry sink and catalog registration configuration.

use serde::Deserialize;
use std::time::Duration;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Log configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_log_filter(),
        }
    }
}

/// Action telemetry sink.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Collector URL receiving one JSON record per completed action.
    /// When unset, records are only logged.
    pub sink_url: Option<String>,
    #[serde(default = "default_telemetry_timeout")]
    pub timeout_ms: u64,
}

impl TelemetryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            sink_url: None,
            timeout_ms: default_telemetry_timeout(),
        }
    }
}

/// Capability catalog registration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Directory URL receiving the thing description once at startup.
    pub registry_url: Option<String>,
    #[serde(default = "default_telemetry_timeout")]
    pub timeout_ms: u64,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            registry_url: None,
            timeout_ms: default_telemetry_timeout(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_telemetry_timeout() -> u64 {
    3_000
}
