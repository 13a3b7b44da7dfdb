use std::cmp::Ordering;

use super::types::{TableDescriptor, TablePartition};

/// Pure function: Split desired tables into those to create and those to check.
///
/// Both inputs are sorted by name here, then walked once with two cursors.
/// Existing tables that are not desired are ignored; nothing is ever deleted.
pub fn partition_tables(desired: &[TableDescriptor], existing: &[String]) -> TablePartition {
    let mut desired: Vec<&TableDescriptor> = desired.iter().collect();
    desired.sort_by(|a, b| a.name.cmp(&b.name));

    let mut existing: Vec<&str> = existing.iter().map(String::as_str).collect();
    existing.sort_unstable();

    let mut partition = TablePartition::default();
    let (mut i, mut j) = (0, 0);

    while i < desired.len() && j < existing.len() {
        match desired[i].name.as_str().cmp(existing[j]) {
            Ordering::Less => {
                partition.to_create.push(desired[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                j += 1;
            }
            Ordering::Equal => {
                partition.to_check.push(desired[i].clone());
                i += 1;
                j += 1;
            }
        }
    }

    partition
        .to_create
        .extend(desired[i..].iter().map(|desc| (*desc).clone()));

    partition
}
