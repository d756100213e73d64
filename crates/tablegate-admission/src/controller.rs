//! Admission controller
//!
//! Sits between callers and the storage engine. Every read or write of a
//! table is checked against the metadata cache first; only admitted
//! commands reach storage, and they reach it unmodified. The controller
//! holds no mutable state of its own, so one instance can serve any number
//! of concurrent callers.
//!
//! Any cache failure stops the request before storage is touched.

use crate::error::{GateError, GateResult, Rejection};
use crate::policy;
use crate::router::{self, Route};
use crate::telemetry;
use std::sync::Arc;
use tablegate_common::config::GateConfig;
use tablegate_common::{ContentState, TableMetadata, TableName, WriteToken};
use tablegate_meta_store::{MetadataAdapter, MetadataCache};
use tablegate_storage::{RowSet, StorageEngine};
use tracing::{debug, error, info, warn};

pub struct AdmissionController {
    storage: Arc<dyn StorageEngine>,
    meta: MetadataAdapter,
    config: GateConfig,
}

impl AdmissionController {
    pub fn new(
        storage: Arc<dyn StorageEngine>,
        cache: Arc<dyn MetadataCache>,
        config: GateConfig,
    ) -> Self {
        Self {
            storage,
            meta: MetadataAdapter::new(cache),
            config,
        }
    }

    /// Metadata access used by the admission policy
    pub fn metadata(&self) -> &MetadataAdapter {
        &self.meta
    }

    /// Route a command, apply the admission policy and, if admitted, run it
    /// against storage.
    pub async fn handle(&self, command: &str) -> GateResult<RowSet> {
        let route = match router::route(command) {
            Ok(route) => route,
            Err(e) => {
                debug!("Unroutable command {:?}: {}", command, e);
                telemetry::record_request(telemetry::OPERATION_UNKNOWN, "parse_error");
                return Err(e.into());
            }
        };

        let result = match &route {
            Route::Read(table) => self.read(table, command).await,
            Route::Write(table) => self.write(table, command).await,
            Route::Passthrough => self.execute(command).await,
        };

        telemetry::record_request(route.kind().as_str(), telemetry::outcome(&result));
        result
    }

    async fn read(&self, table: &TableName, command: &str) -> GateResult<RowSet> {
        debug!(table = %table, "Read intercepted");
        let meta = self.resolve(table).await?;

        policy::read_precheck(&meta).map_err(|reason| Self::reject(table, reason))?;
        let content = self.meta.content_state(table).await?;
        policy::read_content_check(&meta, content).map_err(|reason| Self::reject(table, reason))?;

        self.execute(command).await
    }

    async fn write(&self, table: &TableName, command: &str) -> GateResult<RowSet> {
        debug!(table = %table, "Write intercepted");
        let meta = self.resolve(table).await?;

        policy::write_check(&meta).map_err(|reason| Self::reject(table, reason))?;

        let previous = if self.config.restore_marker_on_failure {
            Some(self.meta.content_state(table).await?)
        } else {
            None
        };

        // Readers must see "processing" before the write can land
        let token = self.meta.mark_write_in_flight(table).await?;

        match self.storage.execute(command).await {
            Ok(rows) => Ok(rows),
            Err(e) => {
                error!(table = %table, "Storage write failed: {}", e);
                if previous == Some(ContentState::Settled) {
                    self.restore_marker(table, token).await;
                }
                Err(e.into())
            }
        }
    }

    /// Resolve metadata, self-registering unknown tables
    async fn resolve(&self, table: &TableName) -> GateResult<TableMetadata> {
        match self.meta.register_if_absent(table).await {
            Ok(Some(registration)) => {
                if registration.is_created() {
                    info!(table = %table, "Registered new table");
                }
                Ok(registration.metadata())
            }
            Ok(None) => Err(Self::reject(table, Rejection::TableNotFound)),
            Err(e) if e.is_malformed() => {
                error!(table = %table, "Unusable metadata entry: {}", e);
                Err(Self::reject(table, Rejection::TableNotFound))
            }
            Err(e) => {
                error!(table = %table, "Metadata cache {} failed: {}", self.meta.cache_name(), e);
                Err(e.into())
            }
        }
    }

    /// Hand the marker back to the pipeline unless a later write owns it
    async fn restore_marker(&self, table: &TableName, token: WriteToken) {
        match self.meta.restore_settled(table, token).await {
            Ok(true) => info!(table = %table, "Restored content marker after failed write"),
            Ok(false) => info!(
                table = %table,
                "Content marker taken over by another write, leaving it in flight"
            ),
            Err(e) => error!(table = %table, "Failed to restore content marker: {}", e),
        }
    }

    async fn execute(&self, command: &str) -> GateResult<RowSet> {
        Ok(self.storage.execute(command).await?)
    }

    fn reject(table: &TableName, reason: Rejection) -> GateError {
        warn!(table = %table, reason = reason.code(), "Request rejected: {}", reason);
        GateError::rejected(table, reason)
    }
}
