//! Journaling in-memory storage engine
//!
//! Stands in for the external column store: every command is appended to a
//! journal and answered with a one-row echo. Useful for local runs of the
//! CLI and as a call-counting spy in tests.

use crate::engine::{Row, RowSet, StorageEngine, StorageResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

/// In-memory engine bound to one keyspace
pub struct MemoryEngine {
    keyspace: String,
    journal: Mutex<Vec<String>>,
}

impl MemoryEngine {
    pub fn new(keyspace: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Commands executed so far, oldest first
    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }

    /// Number of commands executed so far
    pub fn executed(&self) -> usize {
        self.journal.lock().len()
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new("default")
    }
}

#[async_trait]
impl StorageEngine for MemoryEngine {
    fn name(&self) -> &str {
        "memory"
    }

    async fn execute(&self, command: &str) -> StorageResult<RowSet> {
        debug!(keyspace = %self.keyspace, "Executing: {}", command);
        self.journal.lock().push(command.to_string());
        Ok(RowSet::new(
            vec!["keyspace".to_string(), "command".to_string()],
            vec![Row::new([self.keyspace.as_str(), command])],
        ))
    }
}
