//! One reconciliation pass: compute, list, partition, create, update.

use std::sync::Arc;

use tokio::time::Instant;

use tablekeeper_core::clock::{Clock, SystemClock};
use tablekeeper_core::config::{ConfigError, TableManagerConfig};
use tablekeeper_core::metrics::{MetricsSink, OperationStatus};
use tablekeeper_core::storage::{Result, TableStore};
use tablekeeper_core::tables::{expected_tables, partition_tables, TablePartition};

use super::apply::TableApplier;
use super::instrument::{time_request, LIST_TABLES};
use super::SYNC_OPERATION;

/// Summary of a completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub expected: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub not_active: usize,
}

/// Creates periodic tables and manages their provisioned throughput.
pub struct TableManager {
    config: TableManagerConfig,
    store: Arc<dyn TableStore>,
    metrics: Arc<dyn MetricsSink>,
    clock: Arc<dyn Clock>,
}

impl TableManager {
    /// Creates a manager, validating the configuration.
    pub fn new(
        config: TableManagerConfig,
        store: Arc<dyn TableStore>,
        metrics: Arc<dyn MetricsSink>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            metrics,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the clock used to compute the desired tables.
    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &TableManagerConfig {
        &self.config
    }

    /// Runs one reconciliation pass against the store.
    ///
    /// The first store error aborts the pass. Changes made before it are kept.
    pub async fn sync_tables(&self) -> Result<SyncReport> {
        let start = Instant::now();
        let result = self.run_sync().await;
        self.metrics.observe_sync(
            SYNC_OPERATION,
            OperationStatus::from_result(&result),
            start.elapsed(),
        );
        result
    }

    /// Computes what a pass would do without changing anything.
    pub async fn plan(&self) -> Result<TablePartition> {
        let expected = expected_tables(&self.config, self.clock.now());
        let existing =
            time_request(self.metrics.as_ref(), LIST_TABLES, self.store.list_tables()).await?;
        Ok(partition_tables(&expected, &existing))
    }

    async fn run_sync(&self) -> Result<SyncReport> {
        let partition = self.plan().await?;
        tracing::info!(
            expected = partition.len(),
            to_create = partition.to_create.len(),
            to_check = partition.to_check.len(),
            "Expecting tables"
        );

        let applier = TableApplier::new(self.store.as_ref(), self.metrics.as_ref());
        let created = applier.create_tables(&partition.to_create).await?;
        let outcome = applier.update_tables(&partition.to_check).await?;

        Ok(SyncReport {
            expected: partition.len(),
            created,
            updated: outcome.updated,
            unchanged: outcome.unchanged,
            not_active: outcome.not_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use tablekeeper_core::clock::FixedClock;
    use tablekeeper_core::metrics::CapacityDirection;
    use tablekeeper_core::storage::{StoreError, TableStatus};

    use crate::metrics::MetricsRegistry;
    use crate::storage::inmemory::{InMemoryTableStore, StoreOperation};

    const WEEK: i64 = 7 * 24 * 60 * 60;

    fn week_start(index: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(index * WEEK, 0).unwrap()
    }

    fn config() -> TableManagerConfig {
        TableManagerConfig {
            periodic_table_start_at: week_start(10),
            table_period: Duration::from_secs(WEEK as u64),
            inactive_read_throughput: 100,
            ..Default::default()
        }
    }

    fn manager(
        store: &InMemoryTableStore,
        registry: &MetricsRegistry,
        now: DateTime<Utc>,
    ) -> TableManager {
        TableManager::new(config(), Arc::new(store.clone()), registry.sink())
            .unwrap()
            .with_clock(Arc::new(FixedClock(now)))
    }

    #[tokio::test]
    async fn test_first_pass_creates_all_tables() {
        let store = InMemoryTableStore::new();
        let registry = MetricsRegistry::new().unwrap();
        let manager = manager(&store, &registry, week_start(12) + ChronoDuration::days(2));

        let report = manager.sync_tables().await.unwrap();

        assert_eq!(report.expected, 4);
        assert_eq!(report.created, 4);
        assert_eq!(report.updated, 0);
        for name in ["cortex", "cortex_10", "cortex_11", "cortex_12"] {
            assert!(store.table(name).await.is_some(), "{name} missing");
        }
        let current = store.table("cortex_12").await.unwrap();
        assert_eq!((current.read_capacity, current.write_capacity), (300, 3000));
        let old = store.table("cortex_10").await.unwrap();
        assert_eq!((old.read_capacity, old.write_capacity), (100, 1));
    }

    #[tokio::test]
    async fn test_second_pass_checks_throughput_only() {
        let store = InMemoryTableStore::new();
        let registry = MetricsRegistry::new().unwrap();
        let manager = manager(&store, &registry, week_start(12) + ChronoDuration::days(2));

        manager.sync_tables().await.unwrap();
        let report = manager.sync_tables().await.unwrap();

        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 0);
        assert_eq!(report.unchanged, 4);
        let calls = store.calls().await;
        assert_eq!(calls.create_table, 4);
        assert_eq!(calls.update_table, 0);
        assert_eq!(
            registry
                .table_manager()
                .table_capacity(CapacityDirection::Write, "cortex_12"),
            3000
        );
    }

    #[tokio::test]
    async fn test_cold_table_is_throttled_down() {
        let store = InMemoryTableStore::new();
        store
            .insert_table("cortex_12", 300, 3000, TableStatus::Active)
            .await;
        let registry = MetricsRegistry::new().unwrap();
        let manager = manager(&store, &registry, week_start(14) + ChronoDuration::days(2));

        let report = manager.sync_tables().await.unwrap();

        assert_eq!(report.updated, 1);
        let table = store.table("cortex_12").await.unwrap();
        assert_eq!((table.read_capacity, table.write_capacity), (100, 1));
    }

    #[tokio::test]
    async fn test_undesired_tables_are_left_alone() {
        let store = InMemoryTableStore::new();
        store
            .insert_table("unrelated", 7, 7, TableStatus::Active)
            .await;
        let registry = MetricsRegistry::new().unwrap();
        let manager = manager(&store, &registry, week_start(10));

        manager.sync_tables().await.unwrap();

        let table = store.table("unrelated").await.unwrap();
        assert_eq!((table.read_capacity, table.write_capacity), (7, 7));
        assert_eq!(store.calls().await.describe_table, 0);
    }

    #[tokio::test]
    async fn test_list_failure_aborts_pass() {
        let store = InMemoryTableStore::new();
        store.fail_on(StoreOperation::ListTables).await;
        let registry = MetricsRegistry::new().unwrap();
        let manager = manager(&store, &registry, week_start(10));

        let result = manager.sync_tables().await;

        assert!(matches!(result, Err(StoreError::RequestFailed(_))));
        assert_eq!(store.calls().await.create_table, 0);
        let failed = registry
            .table_manager()
            .sync_tables_seconds
            .with_label_values(&[SYNC_OPERATION, "error"])
            .get_sample_count();
        assert_eq!(failed, 1);
    }

    #[tokio::test]
    async fn test_create_failure_skips_updates() {
        let store = InMemoryTableStore::new();
        store.insert_table("cortex", 1, 1, TableStatus::Active).await;
        store
            .fail_on_table(StoreOperation::CreateTable, "cortex_10")
            .await;
        let registry = MetricsRegistry::new().unwrap();
        let manager = manager(&store, &registry, week_start(10) + ChronoDuration::days(3));

        let result = manager.sync_tables().await;

        assert!(result.is_err());
        assert_eq!(store.calls().await.describe_table, 0);
        assert_eq!(store.table("cortex").await.unwrap().write_capacity, 1);
    }

    #[tokio::test]
    async fn test_creating_tables_are_updated_once_active() {
        let store = InMemoryTableStore::new().with_initial_status(TableStatus::Creating);
        let registry = MetricsRegistry::new().unwrap();
        let first = manager(&store, &registry, week_start(10) + ChronoDuration::days(3));

        assert_eq!(first.sync_tables().await.unwrap().created, 2);
        let report = first.sync_tables().await.unwrap();
        assert_eq!(report.not_active, 2);
        assert_eq!(report.updated + report.unchanged, 0);
        assert_eq!(store.calls().await.update_table, 0);

        store.set_status("cortex", TableStatus::Active).await;
        store.set_status("cortex_10", TableStatus::Active).await;
        let later = manager(&store, &registry, week_start(12) + ChronoDuration::days(2));
        let report = later.sync_tables().await.unwrap();

        assert_eq!(report.not_active, 0);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.updated, 1);
        let cold = store.table("cortex_10").await.unwrap();
        assert_eq!((cold.read_capacity, cold.write_capacity), (100, 1));
    }

    #[tokio::test]
    async fn test_plan_does_not_mutate() {
        let store = InMemoryTableStore::new();
        store
            .insert_table("cortex_10", 1, 1, TableStatus::Active)
            .await;
        let registry = MetricsRegistry::new().unwrap();
        let manager = manager(&store, &registry, week_start(11) + ChronoDuration::days(1));

        let partition = manager.plan().await.unwrap();

        let to_create: Vec<&str> = partition.to_create.iter().map(|t| t.name.as_str()).collect();
        let to_check: Vec<&str> = partition.to_check.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(to_create, vec!["cortex", "cortex_11"]);
        assert_eq!(to_check, vec!["cortex_10"]);

        let calls = store.calls().await;
        assert_eq!(calls.list_tables, 1);
        assert_eq!(calls.create_table + calls.describe_table + calls.update_table, 0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let store = InMemoryTableStore::new();
        let config = TableManagerConfig {
            table_period: Duration::ZERO,
            ..Default::default()
        };

        let result = TableManager::new(
            config,
            Arc::new(store),
            Arc::new(tablekeeper_core::metrics::NoopMetrics),
        );

        assert!(matches!(result, Err(ConfigError::ZeroTablePeriod)));
    }
}
