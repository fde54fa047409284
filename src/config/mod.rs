//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, ListenConfig)
//! - [`store`]: Binding store backend selection (StoreConfig)
//! - [`device`]: Device driver configuration (DeviceConfig)
//! - [`service`]: Composite service configuration (ServiceConfig, ResourceBlock)
//! - [`observability`]: Logging, telemetry sink and catalog registration
//! - [`validation`]: Startup validation collecting every error at once

mod device;
mod observability;
mod service;
mod store;
mod types;
pub mod validation;

pub use device::{DeviceConfig, DeviceKind};
pub use observability::{CatalogConfig, LogConfig, LogFormat, TelemetryConfig};
pub use service::{ResourceBlock, ServiceActionBlock, ServiceConfig};
pub use store::{StoreBackend, StoreConfig};
pub use types::{Config, ConfigError, DelegationConfig, ListenConfig, ServerConfig};
pub use validation::{ValidationError, validate};
