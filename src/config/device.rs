//! Device driver configuration.

use serde::Deserialize;
use std::time::Duration;

/// Supported device drivers.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// In-process stand-in with a single `example` action.
    Dummy,
    /// Lighting bridge speaking the Hue REST dialect.
    Hue,
}

/// Device driver configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Driver kind.
    pub kind: DeviceKind,
    /// Bridge URL listing light state (hue only).
    pub status_url: Option<String>,
    /// Bridge URL accepting state changes for one light (hue only).
    pub action_url: Option<String>,
    /// Light key inside the bridge status document (hue only).
    #[serde(default = "default_light")]
    pub light: String,
    /// Per-request bridge timeout in milliseconds.
    #[serde(default = "default_device_timeout")]
    pub timeout_ms: u64,
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_light() -> String {
    "2".to_string()
}

fn default_device_timeout() -> u64 {
    5_000
}
