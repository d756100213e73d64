//! tablegate Common - Shared types and utilities
//!
//! This crate provides the table metadata model, table names, configuration
//! and the common error type used across all tablegate components.

pub mod config;
pub mod error;
pub mod types;

pub use self::config::Config;
pub use error::{Error, Result};
pub use types::*;
