//! DynamoDB table store backend.
//!
//! Implements `TableStore` from `tablekeeper_core::storage` using
//! `aws-sdk-dynamodb`.

mod client;
mod error;
mod store;

pub use client::{create_client, AwsConfig};
pub use store::DynamoDbTableStore;
