//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `tablekeeper_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::list_tables::ListTablesError;
use aws_sdk_dynamodb::operation::update_table::UpdateTableError;
use tablekeeper_core::storage::StoreError;

/// Map a ListTables SDK error to StoreError.
pub fn map_list_tables_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ListTablesError, R>,
) -> StoreError {
    if let Some(store_err) = map_transport_error(&err) {
        return store_err;
    }
    match err.into_service_error() {
        ListTablesError::InternalServerError(_) => {
            StoreError::RequestFailed("DynamoDB internal server error".to_string())
        }
        err => StoreError::RequestFailed(format!("ListTables failed: {:?}", err)),
    }
}

/// Map a CreateTable SDK error to StoreError.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
    table: &str,
) -> StoreError {
    if let Some(store_err) = map_transport_error(&err) {
        return store_err;
    }
    match err.into_service_error() {
        CreateTableError::ResourceInUseException(_) => StoreError::AlreadyExists {
            table: table.to_string(),
        },
        CreateTableError::LimitExceededException(_) => {
            StoreError::Throttled("Table operation limit exceeded, please retry".to_string())
        }
        CreateTableError::InternalServerError(_) => {
            StoreError::RequestFailed("DynamoDB internal server error".to_string())
        }
        err => StoreError::RequestFailed(format!("CreateTable failed: {:?}", err)),
    }
}

/// Map a DescribeTable SDK error to StoreError.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
    table: &str,
) -> StoreError {
    if let Some(store_err) = map_transport_error(&err) {
        return store_err;
    }
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => StoreError::NotFound {
            table: table.to_string(),
        },
        DescribeTableError::InternalServerError(_) => {
            StoreError::RequestFailed("DynamoDB internal server error".to_string())
        }
        err => StoreError::RequestFailed(format!("DescribeTable failed: {:?}", err)),
    }
}

/// Map an UpdateTable SDK error to StoreError.
pub fn map_update_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateTableError, R>,
    table: &str,
) -> StoreError {
    if let Some(store_err) = map_transport_error(&err) {
        return store_err;
    }
    match err.into_service_error() {
        UpdateTableError::ResourceNotFoundException(_) => StoreError::NotFound {
            table: table.to_string(),
        },
        UpdateTableError::ResourceInUseException(_) => {
            StoreError::RequestFailed(format!("Table {} is being modified", table))
        }
        UpdateTableError::LimitExceededException(_) => {
            StoreError::Throttled("Table operation limit exceeded, please retry".to_string())
        }
        UpdateTableError::InternalServerError(_) => {
            StoreError::RequestFailed("DynamoDB internal server error".to_string())
        }
        err => StoreError::RequestFailed(format!("UpdateTable failed: {:?}", err)),
    }
}

/// Errors that never reached the service.
fn map_transport_error<E, R>(err: &SdkError<E, R>) -> Option<StoreError>
where
    E: std::error::Error + 'static,
    R: Debug,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            Some(StoreError::ConnectionFailed(DisplayErrorContext(err).to_string()))
        }
        SdkError::ConstructionFailure(_) => Some(StoreError::RequestFailed(
            "Failed to construct DynamoDB request".to_string(),
        )),
        _ => None,
    }
}

/// Map a response without the fields the manager needs.
pub fn missing_field(operation: &str, field: &str) -> StoreError {
    StoreError::InvalidResponse(format!("{} response missing {}", operation, field))
}
