//! Binding store backend configuration.

use serde::Deserialize;

/// Which [`BindingStore`](crate::store::BindingStore) implementation to open.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local; the binding is lost on restart.
    #[default]
    Memory,
    /// Redb file; the binding survives restarts.
    Redb,
}

/// Binding store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backend type: "memory" or "redb".
    #[serde(default)]
    pub backend: StoreBackend,
    /// Path to the redb file (ignored by the memory backend).
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "bindery.redb".to_string()
}
