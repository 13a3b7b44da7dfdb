use thiserror::Error;

/// Errors raised while validating a table manager configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Table period must be greater than zero")]
    ZeroTablePeriod,
    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("{field} of {seconds}s exceeds the maximum of {max}s")]
    DurationTooLarge {
        field: &'static str,
        seconds: u64,
        max: u64,
    },
    #[error("Invalid periodic table start date '{0}': expected YYYY-MM-DD")]
    InvalidStartDate(String),
}
