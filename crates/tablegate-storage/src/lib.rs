//! tablegate Storage - backing store adapter
//!
//! The column store itself is external. This crate defines the
//! [`StorageEngine`] collaborator trait, the opaque [`RowSet`] it returns,
//! and a journaling in-memory engine used by the CLI and tests.

pub mod engine;
pub mod memory;

// Re-exports
pub use engine::{Row, RowSet, StorageEngine, StorageError, StorageResult};
pub use memory::MemoryEngine;
