//! Admission error types

use crate::router::ParseError;
use tablegate_common::TableName;
use tablegate_meta_store::CacheError;
use tablegate_storage::StorageError;
use thiserror::Error;

/// Why the admission policy turned a request away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Rejection {
    #[error("table does not exist")]
    TableNotFound,

    #[error("active table not available right now")]
    ActiveTableUnavailable,

    #[error("table content is processing")]
    ContentProcessing,

    #[error("active table is waiting for dependencies")]
    DependenciesStale,

    #[error("not allowed to modify an active table")]
    ActiveTableImmutable,

    #[error("table not available for writing right now")]
    TableUnavailable,
}

impl Rejection {
    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Rejection::TableNotFound => "TableNotFound",
            Rejection::ActiveTableUnavailable => "ActiveTableUnavailable",
            Rejection::ContentProcessing => "ContentProcessing",
            Rejection::DependenciesStale => "DependenciesStale",
            Rejection::ActiveTableImmutable => "ActiveTableImmutable",
            Rejection::TableUnavailable => "TableUnavailable",
        }
    }

    /// Whether resubmitting later may succeed without outside intervention
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Rejection::TableNotFound)
    }
}

/// Error returned by [`AdmissionController::handle`](crate::AdmissionController::handle)
#[derive(Debug, Error)]
pub enum GateError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("{table}: {reason}")]
    Rejected { table: TableName, reason: Rejection },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GateError {
    pub fn rejected(table: &TableName, reason: Rejection) -> Self {
        Self::Rejected {
            table: table.clone(),
            reason,
        }
    }

    /// The policy rejection, if this is one
    pub const fn rejection(&self) -> Option<Rejection> {
        match self {
            GateError::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Whether the caller may resubmit the same command later
    pub const fn is_retryable(&self) -> bool {
        match self {
            GateError::Rejected { reason, .. } => reason.is_retryable(),
            GateError::Parse(_) | GateError::Cache(_) | GateError::Storage(_) => false,
        }
    }

    /// Outcome label used in request metrics
    pub const fn outcome(&self) -> &'static str {
        match self {
            GateError::Parse(_) => "parse_error",
            GateError::Rejected { reason, .. } => reason.code(),
            GateError::Cache(_) => "cache_error",
            GateError::Storage(_) => "storage_error",
        }
    }
}

pub type GateResult<T> = Result<T, GateError>;
