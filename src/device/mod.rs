//! Device drivers.
//!
//! A resource-mode controller fronts exactly one device. The driver is
//! chosen by `[device] kind` and is only ever called after the owner guard
//! has admitted the request.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{ActionSpec, PropertySpec};
use crate::config::{DeviceConfig, DeviceKind};

pub mod dummy;
pub mod hue;

pub use self::dummy::DummyDriver;
pub use self::hue::HueDriver;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("bridge unreachable: {0}")]
    Transport(String),
    #[error("bridge returned status {0}")]
    UnexpectedStatus(u16),
    #[error("malformed bridge response: {0}")]
    MalformedResponse(String),
    #[error("{0} is not configured")]
    Misconfigured(&'static str),
}

#[async_trait]
pub trait DeviceDriver: Send + Sync {
    /// Driver label for logs.
    fn kind(&self) -> &'static str;

    /// Actions this device accepts under `/resource/<action>`.
    fn actions(&self) -> Vec<ActionSpec>;

    /// Catalog entry for `GET /resource`.
    fn status_property(&self) -> PropertySpec;

    async fn status(&self) -> Result<Value, DeviceError>;

    async fn execute(&self, action: &str) -> Result<Value, DeviceError>;
}

/// Build the driver selected by `config`.
pub fn open(config: &DeviceConfig) -> Result<Arc<dyn DeviceDriver>, DeviceError> {
    let driver: Arc<dyn DeviceDriver> = match config.kind {
        DeviceKind::Dummy => Arc::new(DummyDriver::new()),
        DeviceKind::Hue => Arc::new(HueDriver::new(config)?),
    };
    tracing::info!(kind = driver.kind(), "Device driver ready");
    Ok(driver)
}
