//! Persistent metadata cache backed by redb.
//!
//! Every put is its own write transaction and is committed before the call
//! returns, which gives atomic last-write-wins semantics per key. Reads open
//! a fresh read transaction and always see the latest committed value.

use crate::cache::{CacheError, CacheKey, CacheResult, CacheValue, MetadataCache};
use crate::tables;
use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use tracing::{debug, error};

impl From<redb::DatabaseError> for CacheError {
    fn from(e: redb::DatabaseError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

impl From<redb::TransactionError> for CacheError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<redb::TableError> for CacheError {
    fn from(e: redb::TableError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<redb::StorageError> for CacheError {
    fn from(e: redb::StorageError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<redb::CommitError> for CacheError {
    fn from(e: redb::CommitError) -> Self {
        Self::Backend(e.to_string())
    }
}

/// Metadata cache persisted in a redb database file.
pub struct RedbCache {
    name: String,
    db: Database,
}

impl RedbCache {
    /// Open (or create) the redb database at the given path.
    pub fn open(name: impl Into<String>, path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Unavailable(e.to_string()))?;
        }
        let db = Database::create(path)?;

        // Create both tables eagerly so later read txns don't fail
        let write_txn = db.begin_write()?;
        {
            let _t = write_txn.open_table(tables::TABLE_METADATA)?;
            let _t = write_txn.open_table(tables::CONTENT_MARKERS)?;
        }
        write_txn.commit()?;

        let name = name.into();
        debug!("Opened metadata cache '{}' at {}", name, path.display());
        Ok(Self { name, db })
    }

    fn table_for(key: &CacheKey) -> TableDefinition<'static, &'static str, &'static [u8]> {
        match key {
            CacheKey::Metadata(_) => tables::TABLE_METADATA,
            CacheKey::Content(_) => tables::CONTENT_MARKERS,
        }
    }
}

#[async_trait]
impl MetadataCache for RedbCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheValue>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::table_for(key))?;
        let Some(bytes) = table.get(key.table().as_str())? else {
            return Ok(None);
        };
        match bincode::deserialize::<CacheValue>(bytes.value()) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                error!("Failed to decode cache entry '{}': {}", key, e);
                Err(CacheError::malformed(key, e.to_string()))
            }
        }
    }

    async fn put(&self, key: &CacheKey, value: CacheValue) -> CacheResult<()> {
        let bytes =
            bincode::serialize(&value).map_err(|e| CacheError::Backend(e.to_string()))?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(Self::table_for(key))?;
            table.insert(key.table().as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    async fn compare_and_put(
        &self,
        key: &CacheKey,
        expected: CacheValue,
        value: CacheValue,
    ) -> CacheResult<bool> {
        let bytes =
            bincode::serialize(&value).map_err(|e| CacheError::Backend(e.to_string()))?;
        // redb serializes write transactions, so the check and the insert
        // cannot interleave with another put
        let write_txn = self.db.begin_write()?;
        let swapped = {
            let mut table = write_txn.open_table(Self::table_for(key))?;
            let current = match table.get(key.table().as_str())? {
                Some(stored) => bincode::deserialize::<CacheValue>(stored.value()).ok(),
                None => None,
            };
            if current == Some(expected) {
                table.insert(key.table().as_str(), bytes.as_slice())?;
                true
            } else {
                false
            }
        };
        write_txn.commit()?;
        Ok(swapped)
    }
}
