//! Error types for cmdbinv-core

use thiserror::Error;

/// Errors that can occur while building an inventory from CMDB records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A record lacks a field the configuration expects on every record
    #[error("record for host {host:?} is missing field {field:?}")]
    FieldLookup {
        /// Host the record belongs to
        host: String,
        /// Field that could not be found
        field: String,
    },

    /// A record's host-name field is absent, null, or not a scalar
    #[error("record #{index} has no usable {field:?} value")]
    MissingHostName {
        /// Position of the record in the fetched result set
        index: usize,
        /// Name of the host-name field
        field: String,
    },
}

impl InventoryError {
    /// Name of the field whose lookup failed
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            InventoryError::FieldLookup { field, .. }
            | InventoryError::MissingHostName { field, .. } => field,
        }
    }
}
