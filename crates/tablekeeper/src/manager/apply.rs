//! Applies create and throughput changes to the table store.

use tablekeeper_core::metrics::{CapacityDirection, MetricsSink};
use tablekeeper_core::storage::{Result, TableStore};
use tablekeeper_core::tables::TableDescriptor;

use super::instrument::{time_request, CREATE_TABLE, DESCRIBE_TABLE, UPDATE_TABLE};

/// What an update batch did to each table it checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Tables whose throughput was changed.
    pub updated: usize,
    /// Tables already at the desired throughput.
    pub unchanged: usize,
    /// Tables skipped because they were not yet `ACTIVE`.
    pub not_active: usize,
}

/// Drives the store toward a set of table descriptors.
///
/// Both operations stop at the first store error. Whatever was not attempted
/// is picked up again on the next pass.
pub struct TableApplier<'a> {
    store: &'a dyn TableStore,
    metrics: &'a dyn MetricsSink,
}

impl<'a> TableApplier<'a> {
    pub fn new(store: &'a dyn TableStore, metrics: &'a dyn MetricsSink) -> Self {
        Self { store, metrics }
    }

    /// Creates every table in `descriptors`, returning how many were created.
    pub async fn create_tables(&self, descriptors: &[TableDescriptor]) -> Result<usize> {
        for desc in descriptors {
            tracing::info!(
                table = %desc.name,
                read = desc.provisioned_read,
                write = desc.provisioned_write,
                "Creating table"
            );
            time_request(
                self.metrics,
                CREATE_TABLE,
                self.store
                    .create_table(&desc.name, desc.provisioned_read, desc.provisioned_write),
            )
            .await?;
        }
        Ok(descriptors.len())
    }

    /// Brings the provisioned throughput of existing tables to the desired values.
    pub async fn update_tables(&self, descriptors: &[TableDescriptor]) -> Result<UpdateOutcome> {
        let mut outcome = UpdateOutcome::default();

        for desc in descriptors {
            tracing::debug!(table = %desc.name, "Checking provisioned throughput");
            let current = time_request(
                self.metrics,
                DESCRIBE_TABLE,
                self.store.describe_table(&desc.name),
            )
            .await?;

            if !current.status.is_active() {
                tracing::info!(
                    table = %desc.name,
                    status = %current.status,
                    "Skipping update on table, not yet ACTIVE"
                );
                outcome.not_active += 1;
                continue;
            }

            self.metrics
                .set_table_capacity(CapacityDirection::Read, &desc.name, current.read_capacity);
            self.metrics.set_table_capacity(
                CapacityDirection::Write,
                &desc.name,
                current.write_capacity,
            );

            if desc.matches_capacity(current.read_capacity, current.write_capacity) {
                tracing::debug!(
                    table = %desc.name,
                    read = current.read_capacity,
                    write = current.write_capacity,
                    "Provisioned throughput already matches, skipping"
                );
                outcome.unchanged += 1;
                continue;
            }

            tracing::info!(
                table = %desc.name,
                from_read = current.read_capacity,
                from_write = current.write_capacity,
                read = desc.provisioned_read,
                write = desc.provisioned_write,
                "Updating provisioned throughput"
            );
            time_request(
                self.metrics,
                UPDATE_TABLE,
                self.store
                    .update_table(&desc.name, desc.provisioned_read, desc.provisioned_write),
            )
            .await?;
            outcome.updated += 1;
        }

        Ok(outcome)
    }
}
