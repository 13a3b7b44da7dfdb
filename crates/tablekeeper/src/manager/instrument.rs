//! Timing helpers for store calls.

use std::future::Future;

use tokio::time::Instant;

use tablekeeper_core::metrics::{MetricsSink, OperationStatus};
use tablekeeper_core::storage::Result;

pub const LIST_TABLES: &str = "DynamoDB.ListTables";
pub const CREATE_TABLE: &str = "DynamoDB.CreateTable";
pub const DESCRIBE_TABLE: &str = "DynamoDB.DescribeTable";
pub const UPDATE_TABLE: &str = "DynamoDB.UpdateTable";

/// Awaits `request` and records its duration and outcome under `operation`.
pub async fn time_request<T, F>(
    metrics: &dyn MetricsSink,
    operation: &str,
    request: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let result = request.await;
    metrics.observe_request(
        operation,
        OperationStatus::from_result(&result),
        start.elapsed(),
    );
    result
}
