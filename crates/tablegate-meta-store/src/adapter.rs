//! Typed access to table metadata and content markers
//!
//! The adapter turns raw cache values into [`TableMetadata`] and
//! [`ContentState`], and owns the two side-effecting protocols the admission
//! controller relies on: self-registration of unknown tables and marking a
//! write in flight.

use crate::cache::{CacheError, CacheKey, CacheResult, CacheValue, MetadataCache};
use std::sync::Arc;
use tablegate_common::{ContentState, TableClass, TableMetadata, TableName, WriteToken};
use tracing::debug;

/// Outcome of [`MetadataAdapter::register_if_absent`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// A metadata entry was already present
    Existing(TableMetadata),
    /// This call stored the placeholder; the record is the neutral default
    CreatedDefault(TableMetadata),
}

impl Registration {
    #[must_use]
    pub const fn metadata(&self) -> TableMetadata {
        match self {
            Self::Existing(meta) | Self::CreatedDefault(meta) => *meta,
        }
    }

    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::CreatedDefault(_))
    }
}

/// Typed metadata access over a [`MetadataCache`]
#[derive(Clone)]
pub struct MetadataAdapter {
    cache: Arc<dyn MetadataCache>,
}

impl MetadataAdapter {
    pub fn new(cache: Arc<dyn MetadataCache>) -> Self {
        Self { cache }
    }

    /// Name of the underlying cache backend
    pub fn cache_name(&self) -> &str {
        self.cache.name()
    }

    /// Look up a table's metadata without side effects.
    ///
    /// A placeholder resolves to the neutral default record.
    pub async fn get_metadata(&self, name: &TableName) -> CacheResult<Option<TableMetadata>> {
        let key = CacheKey::Metadata(name.clone());
        match self.cache.get(&key).await? {
            None => Ok(None),
            Some(CacheValue::Placeholder) => Ok(Some(TableMetadata::default())),
            Some(CacheValue::Metadata(meta)) => Ok(Some(meta)),
            Some(CacheValue::Content | CacheValue::InFlight(_)) => Err(CacheError::malformed(
                &key,
                "content marker stored under a metadata key",
            )),
        }
    }

    /// Resolve a table's metadata, storing a placeholder first if the table
    /// has never been referenced.
    ///
    /// Returns `None` only if the entry is still absent after the placeholder
    /// was written. Two concurrent first references may both write the
    /// placeholder; the second write is identical and harmless.
    pub async fn register_if_absent(&self, name: &TableName) -> CacheResult<Option<Registration>> {
        if let Some(meta) = self.get_metadata(name).await? {
            return Ok(Some(Registration::Existing(meta)));
        }

        debug!(table = %name, "Self-registering unknown table");
        self.cache
            .put(&CacheKey::Metadata(name.clone()), CacheValue::Placeholder)
            .await?;

        Ok(self
            .get_metadata(name)
            .await?
            .map(Registration::CreatedDefault))
    }

    /// Classify a table without registering it
    pub async fn classify(&self, name: &TableName) -> CacheResult<TableClass> {
        Ok(TableClass::from(self.get_metadata(name).await?))
    }

    /// Read the content-readiness marker
    pub async fn content_state(&self, name: &TableName) -> CacheResult<ContentState> {
        let key = CacheKey::Content(name.clone());
        match self.cache.get(&key).await? {
            None => Ok(ContentState::Missing),
            Some(CacheValue::Placeholder | CacheValue::InFlight(_)) => Ok(ContentState::InFlight),
            Some(CacheValue::Content) => Ok(ContentState::Settled),
            Some(CacheValue::Metadata(_)) => Err(CacheError::malformed(
                &key,
                "metadata record stored under a content key",
            )),
        }
    }

    /// Replace the content marker with a fresh in-flight marker.
    ///
    /// Must complete before the storage write is issued so that readers see
    /// "processing" rather than content the write has not landed in yet. The
    /// returned token identifies this write's marker.
    pub async fn mark_write_in_flight(&self, name: &TableName) -> CacheResult<WriteToken> {
        let token = WriteToken::new();
        self.cache
            .put(&CacheKey::Content(name.clone()), CacheValue::InFlight(token))
            .await?;
        Ok(token)
    }

    /// Settle the content marker again, but only if it still holds the
    /// in-flight marker identified by `token`.
    ///
    /// Returns `false` when another write has marked the table since.
    pub async fn restore_settled(&self, name: &TableName, token: WriteToken) -> CacheResult<bool> {
        self.cache
            .compare_and_put(
                &CacheKey::Content(name.clone()),
                CacheValue::InFlight(token),
                CacheValue::Content,
            )
            .await
    }

    /// Mark a table's content as settled (done by the recomputation pipeline)
    pub async fn settle_content(&self, name: &TableName) -> CacheResult<()> {
        self.cache
            .put(&CacheKey::Content(name.clone()), CacheValue::Content)
            .await
    }

    /// Store a metadata record (done by the recomputation pipeline)
    pub async fn put_metadata(&self, name: &TableName, meta: TableMetadata) -> CacheResult<()> {
        self.cache
            .put(&CacheKey::Metadata(name.clone()), CacheValue::Metadata(meta))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCache;
    use async_trait::async_trait;

    fn name(s: &str) -> TableName {
        TableName::new(s).unwrap()
    }

    fn adapter() -> (Arc<MemoryCache>, MetadataAdapter) {
        let cache = Arc::new(MemoryCache::default());
        let adapter = MetadataAdapter::new(cache.clone());
        (cache, adapter)
    }

    /// Cache whose client silently drops placeholder writes
    struct DroppingCache(MemoryCache);

    #[async_trait]
    impl MetadataCache for DroppingCache {
        fn name(&self) -> &str {
            "dropping"
        }

        async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheValue>> {
            self.0.get(key).await
        }

        async fn put(&self, key: &CacheKey, value: CacheValue) -> CacheResult<()> {
            if value == CacheValue::Placeholder {
                return Ok(());
            }
            self.0.put(key, value).await
        }

        async fn compare_and_put(
            &self,
            key: &CacheKey,
            expected: CacheValue,
            value: CacheValue,
        ) -> CacheResult<bool> {
            self.0.compare_and_put(key, expected, value).await
        }
    }

    #[tokio::test]
    async fn test_register_unknown_table_creates_default() {
        let (cache, adapter) = adapter();
        let orders = name("orders");

        let reg = adapter.register_if_absent(&orders).await.unwrap().unwrap();
        assert!(reg.is_created());
        assert_eq!(reg.metadata(), TableMetadata::passive(true));
        assert_eq!(
            cache.get(&CacheKey::Metadata(orders)).await.unwrap(),
            Some(CacheValue::Placeholder)
        );
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let (cache, adapter) = adapter();
        let orders = name("orders");

        let first = adapter.register_if_absent(&orders).await.unwrap().unwrap();
        let second = adapter.register_if_absent(&orders).await.unwrap().unwrap();
        let third = adapter.register_if_absent(&orders).await.unwrap().unwrap();

        assert!(first.is_created());
        assert_eq!(second, Registration::Existing(first.metadata()));
        assert_eq!(second, third);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_register_keeps_existing_record() {
        let (_cache, adapter) = adapter();
        let summary = name("summary");
        let meta = TableMetadata::active(false, true);
        adapter.put_metadata(&summary, meta).await.unwrap();

        let reg = adapter.register_if_absent(&summary).await.unwrap().unwrap();
        assert_eq!(reg, Registration::Existing(meta));
    }

    #[tokio::test]
    async fn test_register_returns_none_when_placeholder_is_lost() {
        let adapter = MetadataAdapter::new(Arc::new(DroppingCache(MemoryCache::default())));
        assert_eq!(adapter.register_if_absent(&name("orders")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_first_references() {
        let (cache, adapter) = adapter();
        let orders = name("orders");

        let results = futures::future::join_all(
            (0..8).map(|_| adapter.register_if_absent(&orders)),
        )
        .await;

        for result in results {
            let reg = result.unwrap().unwrap();
            assert_eq!(reg.metadata(), TableMetadata::default());
        }
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_classify_does_not_register() {
        let (cache, adapter) = adapter();
        let orders = name("orders");

        assert_eq!(adapter.classify(&orders).await.unwrap(), TableClass::Unregistered);
        assert!(cache.is_empty());

        adapter
            .put_metadata(&orders, TableMetadata::passive(false))
            .await
            .unwrap();
        assert_eq!(
            adapter.classify(&orders).await.unwrap(),
            TableClass::Passive { available: false }
        );
    }

    #[tokio::test]
    async fn test_content_state_transitions() {
        let (_cache, adapter) = adapter();
        let orders = name("orders");

        assert_eq!(adapter.content_state(&orders).await.unwrap(), ContentState::Missing);

        adapter.settle_content(&orders).await.unwrap();
        assert_eq!(adapter.content_state(&orders).await.unwrap(), ContentState::Settled);

        adapter.mark_write_in_flight(&orders).await.unwrap();
        assert_eq!(adapter.content_state(&orders).await.unwrap(), ContentState::InFlight);
    }

    #[tokio::test]
    async fn test_restore_settled_requires_own_marker() {
        let (_cache, adapter) = adapter();
        let orders = name("orders");
        adapter.settle_content(&orders).await.unwrap();

        let first = adapter.mark_write_in_flight(&orders).await.unwrap();
        let second = adapter.mark_write_in_flight(&orders).await.unwrap();
        assert_ne!(first, second);

        // The earlier write lost the marker to the later one
        assert!(!adapter.restore_settled(&orders, first).await.unwrap());
        assert_eq!(adapter.content_state(&orders).await.unwrap(), ContentState::InFlight);

        assert!(adapter.restore_settled(&orders, second).await.unwrap());
        assert_eq!(adapter.content_state(&orders).await.unwrap(), ContentState::Settled);

        // Settled content is not a marker to restore
        assert!(!adapter.restore_settled(&orders, second).await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_value_family_is_malformed() {
        let (cache, adapter) = adapter();
        let orders = name("orders");

        cache
            .put(&CacheKey::Metadata(orders.clone()), CacheValue::Content)
            .await
            .unwrap();
        assert!(adapter.get_metadata(&orders).await.unwrap_err().is_malformed());

        cache
            .put(
                &CacheKey::Content(orders.clone()),
                CacheValue::Metadata(TableMetadata::default()),
            )
            .await
            .unwrap();
        assert!(adapter.content_state(&orders).await.unwrap_err().is_malformed());
    }
}
