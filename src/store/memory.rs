//! Process-local binding store.
//!
//! Used for tests and for resources whose binding need not survive a
//! restart. Each operation takes the lock once, so reads never observe a
//! half-written record.

use super::{BindingStore, StoreError};
use async_trait::async_trait;
use bindery_proto::CallerId;
use parking_lot::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    owner: Mutex<Option<CallerId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out bound to `owner`.
    pub fn with_owner(owner: CallerId) -> Self {
        Self {
            owner: Mutex::new(Some(owner)),
        }
    }
}

#[async_trait]
impl BindingStore for MemoryStore {
    async fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.owner.lock().is_some())
    }

    async fn get(&self) -> Result<Option<CallerId>, StoreError> {
        Ok(self.owner.lock().clone())
    }

    async fn set(&self, owner: &CallerId) -> Result<(), StoreError> {
        *self.owner.lock() = Some(owner.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.owner.lock().take();
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
