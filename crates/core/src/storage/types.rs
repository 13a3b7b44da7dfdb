use std::fmt;

/// Table lifecycle status as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
    Unknown,
}

impl TableStatus {
    /// Returns true if the table accepts throughput updates.
    pub fn is_active(self) -> bool {
        self == TableStatus::Active
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TableStatus::Active => "ACTIVE",
            TableStatus::Creating => "CREATING",
            TableStatus::Updating => "UPDATING",
            TableStatus::Deleting => "DELETING",
            TableStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed state of a table in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescription {
    pub read_capacity: i64,
    pub write_capacity: i64,
    pub status: TableStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_is_active() {
        assert!(TableStatus::Active.is_active());
        for status in [
            TableStatus::Creating,
            TableStatus::Updating,
            TableStatus::Deleting,
            TableStatus::Unknown,
        ] {
            assert!(!status.is_active(), "{status} should not be active");
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TableStatus::Creating.to_string(), "CREATING");
    }
}
