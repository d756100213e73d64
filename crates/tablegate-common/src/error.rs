//! Error types shared by tablegate crates

use crate::types::TableNameError;
use thiserror::Error;

/// Common result type for tablegate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for tablegate
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid table name: {0}")]
    InvalidTableName(#[from] TableNameError),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<::config::ConfigError> for Error {
    fn from(e: ::config::ConfigError) -> Self {
        Self::Configuration(e.to_string())
    }
}
