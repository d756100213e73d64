//! tablegate Metadata Store - typed access to the metadata cache
//!
//! The metadata cache is an external key/value service. This crate defines
//! the collaborator trait it must satisfy, two backends (in-memory and
//! redb-backed), and the [`MetadataAdapter`] that the admission controller
//! uses to read table metadata, self-register unknown tables and manage
//! content markers.

pub mod adapter;
pub mod cache;
pub mod memory;
pub mod store;
pub mod tables;

// Re-exports
pub use adapter::{MetadataAdapter, Registration};
pub use cache::{CacheError, CacheKey, CacheResult, CacheValue, MetadataCache};
pub use memory::MemoryCache;
pub use store::RedbCache;
