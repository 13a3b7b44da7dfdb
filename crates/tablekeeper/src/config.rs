use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, ValueEnum};

use tablekeeper_core::config::{parse_start_date, ConfigError, TableManagerConfig};

use crate::storage::AwsConfig;

/// Which table store backs the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Amazon DynamoDB, or anything speaking its API.
    Dynamodb,
    /// A process-local store that forgets everything on exit.
    Memory,
}

/// Table store connection arguments.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Table store backend
    #[arg(long, value_enum, default_value = "dynamodb", env = "TABLEKEEPER_STORE")]
    pub store: StoreBackend,

    /// Custom DynamoDB endpoint, e.g. a local emulator
    #[arg(long = "dynamodb.endpoint-url", env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// AWS region
    #[arg(long = "dynamodb.region", default_value = "us-east-1", env = "AWS_REGION")]
    pub region: String,
}

impl StoreArgs {
    pub fn aws_config(&self) -> AwsConfig {
        AwsConfig {
            endpoint_url: self.endpoint_url.clone(),
            region: self.region.clone(),
        }
    }
}

/// Periodic table arguments.
#[derive(Args, Debug, Clone)]
pub struct ManagerArgs {
    /// Seconds between reconciliation passes
    #[arg(long, default_value_t = 120, env = "POLL_INTERVAL_SECONDS")]
    pub poll_interval_seconds: u64,

    /// Shard tables by time
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        env = "USE_PERIODIC_TABLES"
    )]
    pub use_periodic_tables: bool,

    /// Prefix for periodic table names
    #[arg(long, default_value = "cortex_", env = "TABLE_PREFIX")]
    pub table_prefix: String,

    /// Length of one periodic window, in seconds
    #[arg(long, default_value_t = 7 * 24 * 60 * 60, env = "TABLE_PERIOD_SECONDS")]
    pub table_period_seconds: u64,

    /// Day the first periodic window begins (YYYY-MM-DD, UTC)
    #[arg(long, value_parser = parse_start_date, env = "PERIODIC_TABLE_START")]
    pub periodic_table_start: Option<DateTime<Utc>>,

    /// How long before it is needed a table is created, in seconds
    #[arg(long, default_value_t = 10 * 60, env = "GRACE_PERIOD_SECONDS")]
    pub grace_period_seconds: u64,

    /// Maximum time a chunk is buffered before flush, in seconds
    #[arg(long, default_value_t = 12 * 60 * 60, env = "MAX_CHUNK_AGE_SECONDS")]
    pub max_chunk_age_seconds: u64,

    /// Read throughput for tables receiving writes
    #[arg(long, default_value_t = 300, env = "PROVISIONED_READ_THROUGHPUT")]
    pub provisioned_read_throughput: i64,

    /// Write throughput for tables receiving writes
    #[arg(long, default_value_t = 3000, env = "PROVISIONED_WRITE_THROUGHPUT")]
    pub provisioned_write_throughput: i64,

    /// Read throughput for tables no longer written to
    #[arg(long, default_value_t = 300, env = "INACTIVE_READ_THROUGHPUT")]
    pub inactive_read_throughput: i64,

    /// Write throughput for tables no longer written to
    #[arg(long, default_value_t = 1, env = "INACTIVE_WRITE_THROUGHPUT")]
    pub inactive_write_throughput: i64,

    /// Name of the table used before periodic tables
    #[arg(long, default_value = "cortex", env = "LEGACY_TABLE_NAME")]
    pub legacy_table_name: String,
}

impl ManagerArgs {
    /// Builds a validated manager configuration.
    pub fn table_manager_config(&self) -> Result<TableManagerConfig, ConfigError> {
        let config = TableManagerConfig {
            poll_interval: Duration::from_secs(self.poll_interval_seconds),
            use_periodic_tables: self.use_periodic_tables,
            table_prefix: self.table_prefix.clone(),
            table_period: Duration::from_secs(self.table_period_seconds),
            periodic_table_start_at: self
                .periodic_table_start
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            creation_grace_period: Duration::from_secs(self.grace_period_seconds),
            max_chunk_age: Duration::from_secs(self.max_chunk_age_seconds),
            provisioned_read_throughput: self.provisioned_read_throughput,
            provisioned_write_throughput: self.provisioned_write_throughput,
            inactive_read_throughput: self.inactive_read_throughput,
            inactive_write_throughput: self.inactive_write_throughput,
            legacy_table_name: self.legacy_table_name.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// HTTP server arguments.
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Address serving `/metrics` and the health probes
    #[arg(long, default_value = "0.0.0.0:9090", env = "METRICS_ADDR")]
    pub metrics_addr: SocketAddr,
}
