//! Binding store abstraction.
//!
//! A store holds the owner record of exactly one resource instance. It is
//! opened at startup, handed to the [`BindingManager`](crate::binding::BindingManager),
//! and closed at shutdown. Individual operations are atomic with respect to
//! each other; check-then-act sequences are the manager's job.

use async_trait::async_trait;
use bindery_proto::CallerId;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};

pub mod memory;
pub mod redb;

pub use self::memory::MemoryStore;
pub use self::redb::RedbStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Corrupt owner record: {0}")]
    Corrupt(String),
    #[error("Store is closed")]
    Closed,
}

#[async_trait]
pub trait BindingStore: Send + Sync {
    /// Whether an owner is recorded.
    async fn exists(&self) -> Result<bool, StoreError>;

    /// The recorded owner, if any.
    async fn get(&self) -> Result<Option<CallerId>, StoreError>;

    /// Record `owner`, replacing any previous owner.
    async fn set(&self, owner: &CallerId) -> Result<(), StoreError>;

    /// Remove the owner record. Clearing a free store is not an error.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Release underlying resources. Later operations fail with [`StoreError::Closed`].
    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Backend label for logs.
    fn backend(&self) -> &'static str;
}

/// Open the store selected by `config`.
pub fn open(config: &StoreConfig) -> Result<Arc<dyn BindingStore>, StoreError> {
    let store: Arc<dyn BindingStore> = match config.backend {
        StoreBackend::Redb => {
            info!(path = %config.path, "Opening Redb binding store");
            Arc::new(RedbStore::open(&config.path)?)
        }
        StoreBackend::Memory => {
            info!("Using in-memory binding store; bindings will not survive restart");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}
