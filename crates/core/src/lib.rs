//! Functional core for tablekeeper.
//!
//! Everything in this crate is pure data, pure functions, or a trait that the
//! imperative shell (`crates/tablekeeper`) implements. Nothing here performs
//! I/O.

pub mod clock;
pub mod config;
pub mod metrics;
pub mod storage;
pub mod tables;
