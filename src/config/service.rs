//! Composite service configuration.
//!
//! A service owns no device. Each of its actions borrows one remote
//! resource for the duration of the action via cross-service delegation.

use serde::Deserialize;

/// Service configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServiceConfig {
    /// Remote resources this service may delegate to.
    #[serde(default)]
    pub resources: Vec<ResourceBlock>,
    /// Actions exposed under `/service/<name>`.
    #[serde(default)]
    pub actions: Vec<ServiceActionBlock>,
}

impl ServiceConfig {
    /// Find a declared resource by name.
    pub fn resource(&self, name: &str) -> Option<&ResourceBlock> {
        self.resources.iter().find(|r| r.name == name)
    }
}

/// A remote resource controller.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResourceBlock {
    /// Name the service refers to the resource by.
    pub name: String,
    /// Base URL of the remote controller.
    pub url: String,
}

/// A service action.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceActionBlock {
    /// Action name (the `<action>` in `/service/<action>`).
    pub name: String,
    /// Name of the [`ResourceBlock`] to acquire.
    pub resource: String,
    /// Remote action to invoke while the lease is held, if any.
    pub remote_action: Option<String>,
    /// Catalog title.
    pub title: Option<String>,
    /// Catalog description.
    pub description: Option<String>,
}
