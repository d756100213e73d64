//! tablegate Admission - request routing and admission control
//!
//! This crate provides:
//! - Command routing: operation kind and target table extraction
//! - The read/write policy table over table metadata
//! - The [`AdmissionController`], which gates every storage call on the
//!   metadata cache and never performs the read or write itself
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tablegate_admission::AdmissionController;
//! use tablegate_meta_store::MemoryCache;
//! use tablegate_storage::MemoryEngine;
//!
//! let gate = AdmissionController::new(
//!     Arc::new(MemoryEngine::new("shop")),
//!     Arc::new(MemoryCache::default()),
//!     Default::default(),
//! );
//! let rows = gate.handle("INSERT INTO orders (id) VALUES (1)").await?;
//! ```

pub mod controller;
pub mod error;
pub mod policy;
pub mod router;
pub mod telemetry;

// Re-export core types
pub use controller::AdmissionController;
pub use error::{GateError, GateResult, Rejection};
pub use router::{OperationKind, ParseError, Route, route};
