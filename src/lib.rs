//! bindery - exclusive-binding resource controller.
//!
//! A controller fronts one shared resource (a device, or a composite service
//! that borrows other resources) and grants it to one caller at a time.
//! Callers bind, act while they hold the binding, and unbind.

pub mod binding;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod delegation;
pub mod device;
pub mod error;
pub mod guard;
pub mod http;
pub mod metrics;
pub mod service;
pub mod store;
pub mod telemetry;

pub use controller::{Controller, StartupError};
pub use error::{AccessError, AccessResult};
