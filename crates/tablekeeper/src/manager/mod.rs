//! Periodic table manager (Imperative Shell).
//!
//! - `apply`: create and describe/update calls against the store
//! - `sync`: one reconciliation pass
//! - `poll`: the background loop with cooperative shutdown

mod apply;
mod instrument;
mod poll;
mod sync;

pub use poll::PollState;
pub use sync::{SyncReport, TableManager};

/// Operation label for a whole reconciliation pass.
pub const SYNC_OPERATION: &str = "TableManager.sync_tables";
