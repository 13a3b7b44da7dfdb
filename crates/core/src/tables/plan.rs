use super::types::TablePartition;

/// Pure function: Format a partition for display.
///
/// Lines start with `+` for tables to create and `~` for tables whose
/// throughput will be checked.
pub fn format_plan(partition: &TablePartition) -> Vec<String> {
    if partition.is_empty() {
        return vec!["= No tables expected".to_string()];
    }

    let mut lines = Vec::with_capacity(partition.len());
    for desc in &partition.to_create {
        lines.push(format!(
            "+ Create table: {} (read = {}, write = {})",
            desc.name, desc.provisioned_read, desc.provisioned_write
        ));
    }
    for desc in &partition.to_check {
        lines.push(format!(
            "~ Check throughput: {} (read = {}, write = {})",
            desc.name, desc.provisioned_read, desc.provisioned_write
        ));
    }
    lines
}
