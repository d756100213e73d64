//! In-memory metadata cache

use crate::cache::{CacheKey, CacheResult, CacheValue, MetadataCache};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local metadata cache
///
/// Preserves the difference between an absent key and a placeholder
/// exactly. State is lost when the process exits.
pub struct MemoryCache {
    name: String,
    entries: RwLock<HashMap<CacheKey, CacheValue>>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryCache {
    /// Create a new empty cache
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently present
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl MetadataCache for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheValue>> {
        Ok(self.entries.read().get(key).copied())
    }

    async fn put(&self, key: &CacheKey, value: CacheValue) -> CacheResult<()> {
        self.entries.write().insert(key.clone(), value);
        Ok(())
    }

    async fn compare_and_put(
        &self,
        key: &CacheKey,
        expected: CacheValue,
        value: CacheValue,
    ) -> CacheResult<bool> {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(current) if *current == expected => {
                *current = value;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
