//! Table store backends.
//!
//! - `dynamodb`: AWS DynamoDB via `aws-sdk-dynamodb`
//! - `inmemory`: process-local tables, for dry runs and tests

pub mod dynamodb;
pub mod inmemory;

pub use dynamodb::{AwsConfig, DynamoDbTableStore};
pub use inmemory::InMemoryTableStore;
