//! Table manager configuration (Functional Core - pure data).

mod error;

pub use error::ConfigError;

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use crate::tables::CapacityTier;

/// Upper bound for window durations, so that a window's start, period, grace
/// and chunk age can be summed without leaving `i64` seconds.
pub const MAX_DURATION_SECS: u64 = (i64::MAX / 4) as u64;

/// Configuration for the periodic table manager.
///
/// Read-only once the manager is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableManagerConfig {
    /// How often the store is polled and reconciled.
    pub poll_interval: Duration,

    /// Whether tables are sharded by time at all.
    pub use_periodic_tables: bool,
    /// Prefix for periodic table names; the window index is appended.
    pub table_prefix: String,
    /// Length of one periodic window.
    pub table_period: Duration,
    /// When the first periodic window begins.
    pub periodic_table_start_at: DateTime<Utc>,

    /// How long before it is needed a table is created.
    pub creation_grace_period: Duration,
    /// Maximum time a chunk stays in memory before it is flushed.
    pub max_chunk_age: Duration,

    pub provisioned_read_throughput: i64,
    pub provisioned_write_throughput: i64,
    pub inactive_read_throughput: i64,
    pub inactive_write_throughput: i64,

    /// The single table used before periodic tables were enabled.
    pub legacy_table_name: String,
}

impl Default for TableManagerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2 * 60),
            use_periodic_tables: true,
            table_prefix: "cortex_".to_string(),
            table_period: Duration::from_secs(7 * 24 * 60 * 60),
            periodic_table_start_at: DateTime::<Utc>::UNIX_EPOCH,
            creation_grace_period: Duration::from_secs(10 * 60),
            max_chunk_age: Duration::from_secs(12 * 60 * 60),
            provisioned_read_throughput: 300,
            provisioned_write_throughput: 3000,
            inactive_read_throughput: 300,
            inactive_write_throughput: 1,
            legacy_table_name: "cortex".to_string(),
        }
    }
}

impl TableManagerConfig {
    /// Checks the invariants the window arithmetic relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_period.as_secs() == 0 {
            return Err(ConfigError::ZeroTablePeriod);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        for (field, duration) in [
            ("table_period", self.table_period),
            ("creation_grace_period", self.creation_grace_period),
            ("max_chunk_age", self.max_chunk_age),
        ] {
            if duration.as_secs() > MAX_DURATION_SECS {
                return Err(ConfigError::DurationTooLarge {
                    field,
                    seconds: duration.as_secs(),
                    max: MAX_DURATION_SECS,
                });
            }
        }
        Ok(())
    }

    /// Returns `(read, write)` capacity for the given tier.
    pub fn throughput(&self, tier: CapacityTier) -> (i64, i64) {
        match tier {
            CapacityTier::Active => (
                self.provisioned_read_throughput,
                self.provisioned_write_throughput,
            ),
            CapacityTier::Inactive => (
                self.inactive_read_throughput,
                self.inactive_write_throughput,
            ),
        }
    }
}

/// Parses a `YYYY-MM-DD` day into midnight UTC.
pub fn parse_start_date(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| ConfigError::InvalidStartDate(value.to_string()))
}
