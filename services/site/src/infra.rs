use metrics_exporter_prometheus::PrometheusHandle;
use praktijk::records::{DocumentStore, StoreError};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Operational state shared with the health, readiness and metrics handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) store: Arc<DocumentStore>,
}

impl AppState {
    /// Short label for the record document, reported by `/ready`.
    pub(crate) fn records_status(&self) -> &'static str {
        match self.store.read() {
            Ok(_) => "ok",
            Err(StoreError::Missing { .. }) => "empty",
            Err(_) => "unreadable",
        }
    }
}
