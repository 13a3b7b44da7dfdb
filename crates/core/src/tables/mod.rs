//! Desired-state computation for periodic tables (Functional Core).

mod partition;
mod plan;
mod types;
mod window;

pub use partition::partition_tables;
pub use plan::format_plan;
pub use types::{CapacityTier, TableDescriptor, TablePartition};
pub use window::{expected_tables, table_name_for, WindowRange};
