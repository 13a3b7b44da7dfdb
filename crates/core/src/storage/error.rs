use thiserror::Error;

/// Errors that can occur while talking to the table store.
///
/// The reconciler treats every variant the same way: the pass is aborted and
/// retried on the next poll.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Table not found: {table}")]
    NotFound { table: String },
    #[error("Table already exists: {table}")]
    AlreadyExists { table: String },
    #[error("Throttled: {0}")]
    Throttled(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for table store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
