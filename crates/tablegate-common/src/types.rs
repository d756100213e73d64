//! Core type definitions for tablegate
//!
//! This module defines table names and the table metadata model: the small
//! state machine (registration, active/passive, availability, staleness)
//! that every intercepted request is checked against.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length of a table name in bytes
pub const MAX_TABLE_NAME_LEN: usize = 255;

/// Name of a table in the backing store
///
/// Also the key under which the table's metadata and content marker live in
/// the metadata cache.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct TableName(String);

impl TableName {
    /// Create a new table name (validates characters and length)
    pub fn new(name: impl Into<String>) -> Result<Self, TableNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Get the table name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), TableNameError> {
        if name.is_empty() {
            return Err(TableNameError::Empty);
        }
        if name.len() > MAX_TABLE_NAME_LEN {
            return Err(TableNameError::TooLong);
        }

        // Keyspace-qualified and quoted identifiers are allowed
        for c in name.chars() {
            if !c.is_ascii_alphanumeric() && !matches!(c, '_' | '.' | '"' | '$' | '-') {
                return Err(TableNameError::InvalidChar(c));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableName({:?})", self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Table name validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableNameError {
    #[error("table name is empty")]
    Empty,
    #[error("table name must be at most 255 bytes")]
    TooLong,
    #[error("table name contains invalid character: {0:?}")]
    InvalidChar(char),
}

/// What the metadata cache currently believes about a registered table
///
/// Passive tables are read and written directly by clients. Active tables
/// hold content derived by the recomputation pipeline and carry a staleness
/// flag that is meaningless for passive tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableMetadata {
    Passive { available: bool },
    Active { available: bool, stale: bool },
}

impl TableMetadata {
    /// A passive table with the given availability
    #[must_use]
    pub const fn passive(available: bool) -> Self {
        Self::Passive { available }
    }

    /// An active (derived) table
    #[must_use]
    pub const fn active(available: bool, stale: bool) -> Self {
        Self::Active { available, stale }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        match self {
            Self::Passive { available } | Self::Active { available, .. } => *available,
        }
    }

    /// Staleness of an active table, `None` for passive tables
    #[must_use]
    pub const fn stale(&self) -> Option<bool> {
        match self {
            Self::Passive { .. } => None,
            Self::Active { stale, .. } => Some(*stale),
        }
    }
}

/// The neutral record a freshly self-registered table resolves to:
/// passive and available, details unknown.
impl Default for TableMetadata {
    fn default() -> Self {
        Self::passive(true)
    }
}

/// Classification of a table name used by the admission policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableClass {
    Unregistered,
    Passive { available: bool },
    Active { available: bool, stale: bool },
}

impl From<Option<TableMetadata>> for TableClass {
    fn from(meta: Option<TableMetadata>) -> Self {
        match meta {
            None => Self::Unregistered,
            Some(TableMetadata::Passive { available }) => Self::Passive { available },
            Some(TableMetadata::Active { available, stale }) => Self::Active { available, stale },
        }
    }
}

impl fmt::Display for TableClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unregistered => write!(f, "unregistered"),
            Self::Passive { available } => write!(f, "passive (available={available})"),
            Self::Active { available, stale } => {
                write!(f, "active (available={available}, stale={stale})")
            }
        }
    }
}

/// Readiness of a table's content, read from its content marker key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentState {
    /// No content key yet: initial materialization has not run
    Missing,
    /// A write placeholder sits under the content key
    InFlight,
    /// The pipeline has settled the content
    Settled,
}

impl ContentState {
    /// Whether the content marker is present, i.e. content is readable
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Settled)
    }
}

impl fmt::Display for ContentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Missing => "missing",
            Self::InFlight => "in-flight",
            Self::Settled => "settled",
        };
        f.write_str(s)
    }
}

/// Identifies one write's in-flight marker
///
/// A failed write may only hand the marker back to the pipeline if the
/// marker still carries its own token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub struct WriteToken(Uuid);

impl WriteToken {
    /// Generate a new random token
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WriteToken {
    fn default() -> Self {
        Self::new()
    }
}
