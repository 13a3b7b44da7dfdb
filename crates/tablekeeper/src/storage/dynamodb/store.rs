//! DynamoDB table store implementation.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput, ScalarAttributeType,
    TableStatus as SdkTableStatus,
};
use aws_sdk_dynamodb::Client;

use tablekeeper_core::storage::{Result, StoreError, TableDescription, TableStatus, TableStore};

use super::error::{
    map_create_table_error, map_describe_table_error, map_list_tables_error,
    map_update_table_error, missing_field,
};

/// Hash key attribute of every managed table.
const HASH_KEY: &str = "h";
/// Range key attribute of every managed table.
const RANGE_KEY: &str = "r";

/// DynamoDB-backed table store.
///
/// Tables are created with a string hash key `h` and a binary range key `r`,
/// using provisioned billing.
pub struct DynamoDbTableStore {
    client: Client,
}

impl DynamoDbTableStore {
    /// Creates a store around an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TableStore for DynamoDbTableStore {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut exclusive_start: Option<String> = None;

        loop {
            let response = self
                .client
                .list_tables()
                .set_exclusive_start_table_name(exclusive_start.take())
                .send()
                .await
                .map_err(map_list_tables_error)?;

            names.extend(response.table_names().iter().cloned());

            match response.last_evaluated_table_name() {
                Some(last) => exclusive_start = Some(last.to_string()),
                None => break,
            }
        }

        Ok(names)
    }

    async fn create_table(
        &self,
        name: &str,
        read_capacity: i64,
        write_capacity: i64,
    ) -> Result<()> {
        let key_schema = vec![
            key_schema_element(HASH_KEY, KeyType::Hash)?,
            key_schema_element(RANGE_KEY, KeyType::Range)?,
        ];
        let attribute_definitions = vec![
            attribute_definition(HASH_KEY, ScalarAttributeType::S)?,
            attribute_definition(RANGE_KEY, ScalarAttributeType::B)?,
        ];

        self.client
            .create_table()
            .table_name(name)
            .set_key_schema(Some(key_schema))
            .set_attribute_definitions(Some(attribute_definitions))
            .provisioned_throughput(provisioned_throughput(read_capacity, write_capacity)?)
            .send()
            .await
            .map_err(|e| map_create_table_error(e, name))?;

        Ok(())
    }

    async fn describe_table(&self, name: &str) -> Result<TableDescription> {
        let response = self
            .client
            .describe_table()
            .table_name(name)
            .send()
            .await
            .map_err(|e| map_describe_table_error(e, name))?;

        let table = response
            .table()
            .ok_or_else(|| missing_field("DescribeTable", "Table"))?;
        let throughput = table
            .provisioned_throughput()
            .ok_or_else(|| missing_field("DescribeTable", "ProvisionedThroughput"))?;

        Ok(TableDescription {
            read_capacity: throughput.read_capacity_units().unwrap_or_default(),
            write_capacity: throughput.write_capacity_units().unwrap_or_default(),
            status: to_table_status(table.table_status()),
        })
    }

    async fn update_table(
        &self,
        name: &str,
        read_capacity: i64,
        write_capacity: i64,
    ) -> Result<()> {
        self.client
            .update_table()
            .table_name(name)
            .provisioned_throughput(provisioned_throughput(read_capacity, write_capacity)?)
            .send()
            .await
            .map_err(|e| map_update_table_error(e, name))?;

        Ok(())
    }
}

fn key_schema_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(|e| StoreError::RequestFailed(e.to_string()))
}

fn attribute_definition(
    name: &str,
    attribute_type: ScalarAttributeType,
) -> Result<AttributeDefinition> {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(attribute_type)
        .build()
        .map_err(|e| StoreError::RequestFailed(e.to_string()))
}

fn provisioned_throughput(
    read_capacity: i64,
    write_capacity: i64,
) -> Result<ProvisionedThroughput> {
    ProvisionedThroughput::builder()
        .read_capacity_units(read_capacity)
        .write_capacity_units(write_capacity)
        .build()
        .map_err(|e| StoreError::RequestFailed(e.to_string()))
}

fn to_table_status(status: Option<&SdkTableStatus>) -> TableStatus {
    match status {
        Some(SdkTableStatus::Active) => TableStatus::Active,
        Some(SdkTableStatus::Creating) => TableStatus::Creating,
        Some(SdkTableStatus::Updating) => TableStatus::Updating,
        Some(SdkTableStatus::Deleting) => TableStatus::Deleting,
        _ => TableStatus::Unknown,
    }
}
