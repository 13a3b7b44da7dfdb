//! Metrics sink the table manager records into.
//!
//! The sink is injected at construction; registering collectors is the
//! caller's job.

use std::fmt;
use std::time::Duration;

/// Which half of a table's provisioned capacity an observation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapacityDirection {
    Read,
    Write,
}

impl CapacityDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            CapacityDirection::Read => "read",
            CapacityDirection::Write => "write",
        }
    }
}

impl fmt::Display for CapacityDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome label attached to timed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Success,
    Error,
}

impl OperationStatus {
    pub fn from_result<T, E>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => OperationStatus::Success,
            Err(_) => OperationStatus::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationStatus::Success => "success",
            OperationStatus::Error => "error",
        }
    }
}

/// Receives timing and capacity observations from the table manager.
pub trait MetricsSink: Send + Sync {
    /// Records the duration of one reconciliation pass.
    fn observe_sync(&self, operation: &str, status: OperationStatus, elapsed: Duration);

    /// Records the duration of one table store call.
    fn observe_request(&self, operation: &str, status: OperationStatus, elapsed: Duration);

    /// Records the current capacity of a table.
    fn set_table_capacity(&self, direction: CapacityDirection, table: &str, units: i64);
}

/// A sink that drops every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn observe_sync(&self, _operation: &str, _status: OperationStatus, _elapsed: Duration) {}

    fn observe_request(&self, _operation: &str, _status: OperationStatus, _elapsed: Duration) {}

    fn set_table_capacity(&self, _direction: CapacityDirection, _table: &str, _units: i64) {}
}
