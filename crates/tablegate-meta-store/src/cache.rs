//! Metadata cache collaborator trait and key/value types
//!
//! The cache must distinguish an absent key from a key that holds a
//! placeholder. Backends encode the placeholder as a dedicated
//! [`CacheValue::Placeholder`] variant rather than relying on a client
//! library's treatment of null values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tablegate_common::{TableMetadata, TableName, WriteToken};

/// Key into the metadata cache
///
/// Each table owns two keys: one for its structural metadata and one for
/// its content-readiness marker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Metadata(TableName),
    Content(TableName),
}

impl CacheKey {
    /// The table this key belongs to
    #[must_use]
    pub const fn table(&self) -> &TableName {
        match self {
            Self::Metadata(name) | Self::Content(name) => name,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata(name) => write!(f, "meta:{name}"),
            Self::Content(name) => write!(f, "content:{name}"),
        }
    }
}

/// Value stored under a cache key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheValue {
    /// Present, but carries no information
    Placeholder,
    /// A metadata record (only valid under a metadata key)
    Metadata(TableMetadata),
    /// Settled-content token (only valid under a content key)
    Content,
    /// Marker of a write that has not been recomputed yet (content key only)
    InFlight(WriteToken),
}

/// Error type for metadata cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("metadata cache unavailable: {0}")]
    Unavailable(String),
    #[error("malformed cache entry at {key}: {reason}")]
    Malformed { key: String, reason: String },
    #[error("metadata cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// Create a malformed-entry error for a key
    pub fn malformed(key: &CacheKey, reason: impl Into<String>) -> Self {
        Self::Malformed {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value metadata cache with atomic per-key get/put
#[async_trait]
pub trait MetadataCache: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Read a key; `None` means absent
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheValue>>;

    /// Write a key, replacing any previous value
    async fn put(&self, key: &CacheKey, value: CacheValue) -> CacheResult<()>;

    /// Write a key only if it currently holds `expected`, atomically.
    ///
    /// Returns whether the value was replaced. An absent key never matches.
    async fn compare_and_put(
        &self,
        key: &CacheKey,
        expected: CacheValue,
        value: CacheValue,
    ) -> CacheResult<bool>;
}
