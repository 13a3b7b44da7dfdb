//! In-memory table store.
//!
//! Backs `--store memory` for local dry runs. Call counting, status changes
//! and failure injection are compiled in for tests only.

mod store;

pub use store::InMemoryTableStore;
#[cfg(test)]
pub use store::{CallCounts, StoreOperation};
