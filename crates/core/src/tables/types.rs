use serde::Serialize;

/// The desired shape of a single table for one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub name: String,
    pub provisioned_read: i64,
    pub provisioned_write: i64,
}

impl TableDescriptor {
    /// Creates a descriptor with the given capacity.
    pub fn new(name: impl Into<String>, provisioned_read: i64, provisioned_write: i64) -> Self {
        Self {
            name: name.into(),
            provisioned_read,
            provisioned_write,
        }
    }

    /// Returns true if the given capacity already matches this descriptor.
    pub fn matches_capacity(&self, read: i64, write: i64) -> bool {
        self.provisioned_read == read && self.provisioned_write == write
    }
}

/// Capacity preset applied to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityTier {
    /// Table is receiving writes.
    Active,
    /// Table holds cold data only.
    Inactive,
}

/// Desired tables split by whether they already exist in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TablePartition {
    /// Desired tables absent from the store.
    pub to_create: Vec<TableDescriptor>,
    /// Desired tables present in the store, candidates for a throughput update.
    pub to_check: Vec<TableDescriptor>,
}

impl TablePartition {
    /// Total number of desired tables covered by this partition.
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_check.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_check.is_empty()
    }
}
