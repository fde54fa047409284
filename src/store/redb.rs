//! Redb-backed persistent binding store.
//!
//! # Schema
//!
//! ```text
//! BINDING: "owner" -> caller identity (utf-8)
//! ```
//!
//! Each operation runs in its own redb transaction, which gives the
//! per-operation atomicity the store contract asks for.

use super::{BindingStore, StoreError};
use async_trait::async_trait;
use bindery_proto::CallerId;
use parking_lot::RwLock;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use tracing::info;

const BINDING: TableDefinition<&str, &str> = TableDefinition::new("binding");
const OWNER_KEY: &str = "owner";

pub struct RedbStore {
    db: RwLock<Option<Database>>,
}

impl RedbStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(|e| StoreError::Database(e.to_string()))?;

        // Ensure the table exists so read transactions never miss it.
        let write_txn = db
            .begin_write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        {
            let _ = write_txn
                .open_table(BINDING)
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        info!(path = %path, "Redb binding store initialized");
        Ok(Self {
            db: RwLock::new(Some(db)),
        })
    }

    fn read_owner(&self) -> Result<Option<CallerId>, StoreError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StoreError::Closed)?;

        let read_txn = db
            .begin_read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let table = read_txn
            .open_table(BINDING)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let value = table
            .get(OWNER_KEY)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        match value {
            Some(raw) => CallerId::parse(raw.value())
                .map(Some)
                .map_err(|e| StoreError::Corrupt(e.to_string())),
            None => Ok(None),
        }
    }

    fn write_owner(&self, owner: Option<&CallerId>) -> Result<(), StoreError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StoreError::Closed)?;

        let write_txn = db
            .begin_write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(BINDING)
                .map_err(|e| StoreError::Database(e.to_string()))?;
            match owner {
                Some(owner) => {
                    table
                        .insert(OWNER_KEY, owner.as_str())
                        .map_err(|e| StoreError::Database(e.to_string()))?;
                }
                None => {
                    table
                        .remove(OWNER_KEY)
                        .map_err(|e| StoreError::Database(e.to_string()))?;
                }
            }
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl BindingStore for RedbStore {
    async fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.read_owner()?.is_some())
    }

    async fn get(&self) -> Result<Option<CallerId>, StoreError> {
        self.read_owner()
    }

    async fn set(&self, owner: &CallerId) -> Result<(), StoreError> {
        self.write_owner(Some(owner))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.write_owner(None)
    }

    async fn close(&self) -> Result<(), StoreError> {
        // Dropping the handle flushes and releases the file lock.
        if self.db.write().take().is_some() {
            info!("Redb binding store closed");
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redb"
    }
}
