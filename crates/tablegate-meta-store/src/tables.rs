//! Redb table definitions for the persistent metadata cache.
//!
//! Metadata records and content markers live in separate tables so the two
//! key families never collide. Both are keyed by table name and hold
//! bincode-encoded `CacheValue`s.

use redb::TableDefinition;

pub const TABLE_METADATA: TableDefinition<&str, &[u8]> = TableDefinition::new("table_metadata");
pub const CONTENT_MARKERS: TableDefinition<&str, &[u8]> = TableDefinition::new("content_markers");
