//! Prometheus metrics for the table manager.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `tablekeeper_sync_tables_seconds` | Histogram | `operation`, `status_code` |
//! | `tablekeeper_store_request_duration_seconds` | Histogram | `operation`, `status_code` |
//! | `tablekeeper_table_capacity_units` | Gauge | `op`, `table` |

use std::sync::Arc;
use std::time::Duration;

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntGaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use tablekeeper_core::metrics::{CapacityDirection, MetricsSink, OperationStatus};

/// Namespace prepended to every metric name.
pub const NAMESPACE: &str = "tablekeeper";

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Metrics output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Collectors recorded by the table manager.
#[derive(Clone)]
pub struct TableManagerMetrics {
    /// Duration of whole reconciliation passes.
    pub sync_tables_seconds: HistogramVec,
    /// Duration of individual table store calls.
    pub store_request_duration_seconds: HistogramVec,
    /// Per-table provisioned capacity, in capacity units.
    pub table_capacity_units: IntGaugeVec,
}

impl TableManagerMetrics {
    /// Create and register the table manager metrics.
    pub fn new(registry: &Registry) -> Result<Self, MetricsError> {
        let sync_tables_seconds = HistogramVec::new(
            HistogramOpts::new("sync_tables_seconds", "Time spent doing sync_tables."),
            &["operation", "status_code"],
        )?;
        registry.register(Box::new(sync_tables_seconds.clone()))?;

        let store_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "store_request_duration_seconds",
                "Time spent doing table store requests.",
            ),
            &["operation", "status_code"],
        )?;
        registry.register(Box::new(store_request_duration_seconds.clone()))?;

        let table_capacity_units = IntGaugeVec::new(
            Opts::new(
                "table_capacity_units",
                "Per-table provisioned capacity, measured in capacity units.",
            ),
            &["op", "table"],
        )?;
        registry.register(Box::new(table_capacity_units.clone()))?;

        Ok(Self {
            sync_tables_seconds,
            store_request_duration_seconds,
            table_capacity_units,
        })
    }

    /// Current value of a capacity gauge.
    #[cfg(test)]
    pub fn table_capacity(&self, direction: CapacityDirection, table: &str) -> i64 {
        self.table_capacity_units
            .with_label_values(&[direction.as_str(), table])
            .get()
    }
}

impl MetricsSink for TableManagerMetrics {
    fn observe_sync(&self, operation: &str, status: OperationStatus, elapsed: Duration) {
        self.sync_tables_seconds
            .with_label_values(&[operation, status.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    fn observe_request(&self, operation: &str, status: OperationStatus, elapsed: Duration) {
        self.store_request_duration_seconds
            .with_label_values(&[operation, status.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    fn set_table_capacity(&self, direction: CapacityDirection, table: &str, units: i64) {
        self.table_capacity_units
            .with_label_values(&[direction.as_str(), table])
            .set(units);
    }
}

/// Registry owning the table manager metrics.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Arc<Registry>,
    table_manager: TableManagerMetrics,
}

impl MetricsRegistry {
    /// Create a registry with the `tablekeeper` namespace.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new_custom(Some(NAMESPACE.to_string()), None)?;
        let table_manager = TableManagerMetrics::new(&registry)?;

        Ok(Self {
            registry: Arc::new(registry),
            table_manager,
        })
    }

    /// The table manager's collectors.
    pub fn table_manager(&self) -> &TableManagerMetrics {
        &self.table_manager
    }

    /// A sink handle suitable for injecting into the manager.
    pub fn sink(&self) -> Arc<dyn MetricsSink> {
        Arc::new(self.table_manager.clone())
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
