//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::device::DeviceConfig;
use super::observability::{CatalogConfig, LogConfig, TelemetryConfig};
use super::service::ServiceConfig;
use super::store::StoreConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Controller configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Controller identity.
    pub server: ServerConfig,
    /// HTTP listen configuration.
    pub listen: ListenConfig,
    /// Binding store backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// Device driver, when this controller fronts a single device.
    pub device: Option<DeviceConfig>,
    /// Composite service, when this controller delegates to other controllers.
    pub service: Option<ServiceConfig>,
    /// Cross-service delegation timeouts.
    #[serde(default)]
    pub delegation: DelegationConfig,
    /// Fire-and-forget action telemetry.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Capability catalog registration.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Log output.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Controller identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Resource or service name (e.g., "hue").
    pub name: String,
    /// Instance id, distinguishing several controllers of the same kind.
    #[serde(default = "default_instance_id")]
    pub id: String,
    /// Externally reachable base URL. Defaults to `http://<listen.address>`.
    pub url: Option<String>,
    /// Human-readable description for the capability catalog.
    #[serde(default)]
    pub description: String,
    /// Serve Prometheus metrics on `/metrics` (default: true).
    #[serde(default = "default_true")]
    pub metrics: bool,
}

impl ServerConfig {
    /// The base URL advertised in the capability catalog.
    pub fn public_url(&self, listen: &ListenConfig) -> String {
        match &self.url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", listen.address),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:8000").
    pub address: SocketAddr,
}

/// Cross-service delegation timeouts.
///
/// `timeout_ms` bounds each remote bind/unbind round-trip; `work_timeout_ms`
/// bounds the unit of work run while the remote lease is held.
#[derive(Debug, Clone, Deserialize)]
pub struct DelegationConfig {
    #[serde(default = "default_delegation_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_work_timeout")]
    pub work_timeout_ms: u64,
}

impl DelegationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn work_timeout(&self) -> Duration {
        Duration::from_millis(self.work_timeout_ms)
    }
}

impl Default for DelegationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_delegation_timeout(),
            work_timeout_ms: default_work_timeout(),
        }
    }
}

fn default_instance_id() -> String {
    "0".to_string()
}

fn default_delegation_timeout() -> u64 {
    5_000
}

fn default_work_timeout() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}
