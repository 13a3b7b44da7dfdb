//! In-memory table store implementation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tablekeeper_core::storage::{Result, StoreError, TableDescription, TableStatus, TableStore};

/// A table store operation, used for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    ListTables,
    CreateTable,
    DescribeTable,
    UpdateTable,
}

/// Number of calls received per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_tables: usize,
    pub create_table: usize,
    pub describe_table: usize,
    pub update_table: usize,
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<String, TableDescription>,
    calls: CallCounts,
    failures: Vec<(StoreOperation, Option<String>)>,
}

impl State {
    fn record(&mut self, op: StoreOperation, table: Option<&str>) -> Result<()> {
        match op {
            StoreOperation::ListTables => self.calls.list_tables += 1,
            StoreOperation::CreateTable => self.calls.create_table += 1,
            StoreOperation::DescribeTable => self.calls.describe_table += 1,
            StoreOperation::UpdateTable => self.calls.update_table += 1,
        }

        let injected = self.failures.iter().any(|(failing_op, failing_table)| {
            *failing_op == op
                && match failing_table {
                    Some(name) => Some(name.as_str()) == table,
                    None => true,
                }
        });

        if injected {
            return Err(StoreError::RequestFailed(format!(
                "injected failure for {:?}",
                op
            )));
        }
        Ok(())
    }
}

/// In-memory table store.
///
/// Tables live in a `BTreeMap` behind an `Arc<RwLock<_>>`, so clones share
/// state. Newly created tables take `initial_status` (default `Active`).
#[derive(Debug, Clone)]
pub struct InMemoryTableStore {
    state: Arc<RwLock<State>>,
    initial_status: TableStatus,
    latency: Option<Duration>,
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTableStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            initial_status: TableStatus::Active,
            latency: None,
        }
    }

    #[cfg(test)]
    /// Sets the status newly created tables start in.
    pub fn with_initial_status(mut self, status: TableStatus) -> Self {
        self.initial_status = status;
        self
    }

    #[cfg(test)]
    /// Delays every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    #[cfg(test)]
    /// Inserts or replaces a table without counting a call.
    pub async fn insert_table(&self, name: &str, read: i64, write: i64, status: TableStatus) {
        let mut state = self.state.write().await;
        state.tables.insert(
            name.to_string(),
            TableDescription {
                read_capacity: read,
                write_capacity: write,
                status,
            },
        );
    }

    #[cfg(test)]
    /// Changes the status of an existing table.
    pub async fn set_status(&self, name: &str, status: TableStatus) {
        let mut state = self.state.write().await;
        if let Some(table) = state.tables.get_mut(name) {
            table.status = status;
        }
    }

    #[cfg(test)]
    /// Makes every call of `op` fail.
    pub async fn fail_on(&self, op: StoreOperation) {
        self.state.write().await.failures.push((op, None));
    }

    #[cfg(test)]
    /// Makes calls of `op` for the named table fail.
    pub async fn fail_on_table(&self, op: StoreOperation, table: &str) {
        self.state
            .write()
            .await
            .failures
            .push((op, Some(table.to_string())));
    }

    #[cfg(test)]
    /// Removes all injected failures.
    pub async fn clear_failures(&self) {
        self.state.write().await.failures.clear();
    }

    #[cfg(test)]
    /// Returns the calls received so far.
    pub async fn calls(&self) -> CallCounts {
        self.state.read().await.calls
    }

    #[cfg(test)]
    /// Returns a snapshot of a table, if it exists.
    pub async fn table(&self, name: &str) -> Option<TableDescription> {
        self.state.read().await.tables.get(name).copied()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn list_tables(&self) -> Result<Vec<String>> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.record(StoreOperation::ListTables, None)?;
        Ok(state.tables.keys().cloned().collect())
    }

    async fn create_table(
        &self,
        name: &str,
        read_capacity: i64,
        write_capacity: i64,
    ) -> Result<()> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.record(StoreOperation::CreateTable, Some(name))?;
        if state.tables.contains_key(name) {
            return Err(StoreError::AlreadyExists {
                table: name.to_string(),
            });
        }
        state.tables.insert(
            name.to_string(),
            TableDescription {
                read_capacity,
                write_capacity,
                status: self.initial_status,
            },
        );
        Ok(())
    }

    async fn describe_table(&self, name: &str) -> Result<TableDescription> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.record(StoreOperation::DescribeTable, Some(name))?;
        state
            .tables
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::NotFound {
                table: name.to_string(),
            })
    }

    async fn update_table(
        &self,
        name: &str,
        read_capacity: i64,
        write_capacity: i64,
    ) -> Result<()> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.record(StoreOperation::UpdateTable, Some(name))?;
        let table = state
            .tables
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound {
                table: name.to_string(),
            })?;
        table.read_capacity = read_capacity;
        table.write_capacity = write_capacity;
        Ok(())
    }
}
