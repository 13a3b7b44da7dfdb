//! Window arithmetic for periodic tables.
//!
//! All arithmetic is done in whole seconds since the Unix epoch. Window `i`
//! nominally covers `[i * period, (i + 1) * period)`.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::TableManagerConfig;

use super::types::{CapacityTier, TableDescriptor};

/// Inclusive range of periodic window indices that must exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRange {
    pub first: i64,
    pub last: i64,
}

impl WindowRange {
    /// Computes the window range for `now`.
    ///
    /// `config.table_period` must be at least one second; see
    /// [`TableManagerConfig::validate`].
    pub fn compute(config: &TableManagerConfig, now: DateTime<Utc>) -> Self {
        let secs = Seconds::from_config(config);
        Self {
            first: config.periodic_table_start_at.timestamp().div_euclid(secs.period),
            last: now.timestamp().saturating_add(secs.grace).div_euclid(secs.period),
        }
    }

    /// Number of windows in the range; zero when `first > last`.
    pub fn len(&self) -> usize {
        if self.first > self.last {
            0
        } else {
            (self.last - self.first + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Seconds {
    period: i64,
    grace: i64,
    max_age: i64,
}

impl Seconds {
    /// Durations beyond `i64::MAX` seconds saturate. A zero period is raised to
    /// one second so division stays defined for unvalidated configs.
    fn from_config(config: &TableManagerConfig) -> Self {
        Self {
            period: whole_seconds(config.table_period).max(1),
            grace: whole_seconds(config.creation_grace_period),
            max_age: whole_seconds(config.max_chunk_age),
        }
    }
}

fn whole_seconds(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

/// Builds the name of the periodic table for window `index`.
pub fn table_name_for(config: &TableManagerConfig, index: i64) -> String {
    format!("{}{}", config.table_prefix, index)
}

/// Pure function: Calculate the tables that should exist at `now`, sorted by name.
pub fn expected_tables(config: &TableManagerConfig, now: DateTime<Utc>) -> Vec<TableDescriptor> {
    if !config.use_periodic_tables {
        let (read, write) = config.throughput(CapacityTier::Active);
        return vec![TableDescriptor::new(&config.legacy_table_name, read, write)];
    }

    let secs = Seconds::from_config(config);
    let range = WindowRange::compute(config, now);
    let now = now.timestamp();

    let mut result = Vec::with_capacity(range.len() + 1);

    // Writes move off the legacy table once the first window and its buffers are over.
    let legacy_until = range
        .first
        .saturating_mul(secs.period)
        .saturating_add(secs.grace)
        .saturating_add(secs.max_age);
    let legacy_tier = if now < legacy_until {
        CapacityTier::Active
    } else {
        CapacityTier::Inactive
    };
    let (read, write) = config.throughput(legacy_tier);
    result.push(TableDescriptor::new(&config.legacy_table_name, read, write));

    for index in range.first..=range.last {
        let (read, write) = config.throughput(periodic_tier(secs, index, now));
        result.push(TableDescriptor::new(table_name_for(config, index), read, write));
    }

    result.sort_by(|a, b| a.name.cmp(&b.name));
    result
}

/// Window `index` is live in `[start - grace, end + grace + max_age)`.
fn periodic_tier(secs: Seconds, index: i64, now: i64) -> CapacityTier {
    let start = index.saturating_mul(secs.period);
    let live_from = start.saturating_sub(secs.grace);
    let live_until = start
        .saturating_add(secs.period)
        .saturating_add(secs.grace)
        .saturating_add(secs.max_age);
    if live_from <= now && now < live_until {
        CapacityTier::Active
    } else {
        CapacityTier::Inactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::collections::HashSet;
    use std::time::Duration;

    const WEEK: u64 = 7 * 24 * 60 * 60;
    const GRACE: u64 = 10 * 60;
    const MAX_AGE: u64 = 12 * 60 * 60;

    /// Start exactly on a window boundary so `first_table * period == start`.
    fn week_start() -> DateTime<Utc> {
        Utc.timestamp_opt(2_500 * WEEK as i64, 0).unwrap()
    }

    fn periodic_config() -> TableManagerConfig {
        TableManagerConfig {
            use_periodic_tables: true,
            table_prefix: "cortex_".to_string(),
            table_period: Duration::from_secs(WEEK),
            periodic_table_start_at: week_start(),
            creation_grace_period: Duration::from_secs(GRACE),
            max_chunk_age: Duration::from_secs(MAX_AGE),
            provisioned_read_throughput: 300,
            provisioned_write_throughput: 3000,
            inactive_read_throughput: 100,
            inactive_write_throughput: 1,
            legacy_table_name: "cortex".to_string(),
            ..Default::default()
        }
    }

    fn active() -> (i64, i64) {
        (300, 3000)
    }

    fn inactive() -> (i64, i64) {
        (100, 1)
    }

    fn capacity(desc: &TableDescriptor) -> (i64, i64) {
        (desc.provisioned_read, desc.provisioned_write)
    }

    fn find<'a>(tables: &'a [TableDescriptor], name: &str) -> &'a TableDescriptor {
        tables
            .iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("table {name} missing"))
    }

    #[test]
    fn test_periodic_disabled_returns_only_legacy() {
        let config = TableManagerConfig {
            use_periodic_tables: false,
            ..periodic_config()
        };

        for now in [
            week_start() - ChronoDuration::days(400),
            week_start(),
            week_start() + ChronoDuration::days(400),
        ] {
            let tables = expected_tables(&config, now);
            assert_eq!(tables, vec![TableDescriptor::new("cortex", 300, 3000)]);
        }
    }

    #[test]
    fn test_three_days_into_first_week() {
        let config = periodic_config();
        let now = week_start() + ChronoDuration::days(3);

        let tables = expected_tables(&config, now);
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["cortex", "cortex_2500"]);
        assert_eq!(capacity(find(&tables, "cortex_2500")), active());
        assert_eq!(capacity(find(&tables, "cortex")), inactive());
    }

    #[test]
    fn test_legacy_active_before_first_window_buffer_elapses() {
        let config = periodic_config();
        let switch = week_start() + ChronoDuration::seconds((GRACE + MAX_AGE) as i64);

        let before = expected_tables(&config, switch - ChronoDuration::seconds(1));
        assert_eq!(capacity(find(&before, "cortex")), active());

        let at = expected_tables(&config, switch);
        assert_eq!(capacity(find(&at, "cortex")), inactive());
    }

    #[test]
    fn test_next_table_created_within_grace_period() {
        let config = periodic_config();
        let next_start = week_start() + ChronoDuration::seconds(WEEK as i64);

        let early = expected_tables(&config, next_start - ChronoDuration::seconds(GRACE as i64 + 1));
        assert!(early.iter().all(|t| t.name != "cortex_2501"));

        let in_grace = expected_tables(&config, next_start - ChronoDuration::seconds(GRACE as i64));
        assert_eq!(capacity(find(&in_grace, "cortex_2501")), active());
    }

    #[test]
    fn test_window_tier_boundaries() {
        let config = TableManagerConfig {
            periodic_table_start_at: week_start() - ChronoDuration::weeks(4),
            ..periodic_config()
        };
        let start = week_start();
        let live_from = start - ChronoDuration::seconds(GRACE as i64);
        let live_until = start + ChronoDuration::seconds((WEEK + GRACE + MAX_AGE) as i64);

        let cases = [
            (live_from - ChronoDuration::seconds(1), None),
            (live_from, Some(active())),
            (start + ChronoDuration::days(3), Some(active())),
            (live_until - ChronoDuration::seconds(1), Some(active())),
            (live_until, Some(inactive())),
            (live_until + ChronoDuration::weeks(10), Some(inactive())),
        ];

        for (now, expected) in cases {
            let tables = expected_tables(&config, now);
            let got = tables.iter().find(|t| t.name == "cortex_2500").map(capacity);
            assert_eq!(got, expected, "at {now}");
        }
    }

    #[test]
    fn test_window_stays_active_after_end_for_chunk_age() {
        let config = periodic_config();
        let after_end = week_start() + ChronoDuration::seconds(WEEK as i64 + 60 * 60);

        let tables = expected_tables(&config, after_end);

        // Current window and the one that just closed are both taking writes.
        assert_eq!(capacity(find(&tables, "cortex_2500")), active());
        assert_eq!(capacity(find(&tables, "cortex_2501")), active());
    }

    #[test]
    fn test_sorted_unique_and_counted() {
        let config = TableManagerConfig {
            periodic_table_start_at: week_start() - ChronoDuration::weeks(30),
            ..periodic_config()
        };

        for offset_hours in [0, 5, 100, 1000, 5000] {
            let now = week_start() + ChronoDuration::hours(offset_hours);
            let tables = expected_tables(&config, now);
            let range = WindowRange::compute(&config, now);

            assert_eq!(tables.len(), range.len() + 1);
            assert!(tables.windows(2).all(|w| w[0].name < w[1].name));

            let names: HashSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();
            assert_eq!(names.len(), tables.len());
        }
    }

    #[test]
    fn test_start_in_future_yields_only_legacy() {
        let config = TableManagerConfig {
            periodic_table_start_at: week_start() + ChronoDuration::weeks(3),
            ..periodic_config()
        };
        let now = week_start();

        let range = WindowRange::compute(&config, now);
        assert!(range.is_empty());

        let tables = expected_tables(&config, now);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "cortex");
        assert_eq!(capacity(&tables[0]), active());
    }

    #[test]
    fn test_mid_window_start_rounds_down() {
        let config = TableManagerConfig {
            periodic_table_start_at: week_start() + ChronoDuration::days(2),
            ..periodic_config()
        };

        let range = WindowRange::compute(&config, week_start() + ChronoDuration::days(3));
        assert_eq!(range, WindowRange { first: 2500, last: 2500 });
    }

    #[test]
    fn test_huge_period_does_not_overflow() {
        let config = TableManagerConfig {
            table_period: Duration::from_secs(i64::MAX as u64),
            ..periodic_config()
        };

        let tables = expected_tables(&config, week_start());

        assert_eq!(tables.len(), 2);
        assert_eq!(capacity(find(&tables, "cortex_0")), active());
    }

    #[test]
    fn test_huge_grace_and_age_do_not_overflow() {
        let config = TableManagerConfig {
            creation_grace_period: Duration::from_secs(u64::MAX),
            max_chunk_age: Duration::from_secs(u64::MAX),
            periodic_table_start_at: week_start() + ChronoDuration::weeks(1),
            ..periodic_config()
        };
        let now = week_start();

        let range = WindowRange::compute(&config, now);
        assert_eq!(range.first, 2501);
        assert_eq!(range.last, i64::MAX.div_euclid(WEEK as i64));

        // Every window is live when the buffers are unbounded.
        assert_eq!(
            periodic_tier(Seconds::from_config(&config), 2501, now.timestamp()),
            CapacityTier::Active
        );
    }

    #[test]
    fn test_table_name_for() {
        let config = periodic_config();
        assert_eq!(table_name_for(&config, 2512), "cortex_2512");
    }
}
