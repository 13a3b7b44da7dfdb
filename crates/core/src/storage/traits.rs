use async_trait::async_trait;

use super::{Result, TableDescription};

/// The remote table store the manager reconciles against.
///
/// Timeouts and transport retries are the implementation's concern.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Lists the names of all tables. Order is not guaranteed.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Creates a table with the given provisioned capacity.
    async fn create_table(&self, name: &str, read_capacity: i64, write_capacity: i64)
        -> Result<()>;

    /// Fetches the current capacity and status of a table.
    async fn describe_table(&self, name: &str) -> Result<TableDescription>;

    /// Changes the provisioned capacity of an existing table.
    async fn update_table(&self, name: &str, read_capacity: i64, write_capacity: i64)
        -> Result<()>;
}
