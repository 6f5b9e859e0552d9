//! cmdbinv-core: CMDB record to inventory transformation
//!
//! Resolves which CMDB fields drive grouping and host variables, builds the
//! search expression for the remote fetch, and turns the fetched records into
//! an Ansible-compatible inventory document. Nothing in this crate performs I/O.

pub mod builder;
pub mod config;
pub mod error;
pub mod query;
pub mod record;
pub mod types;

pub use builder::InventoryBuilder;
pub use config::{FieldOverrides, HOST_NAME_FIELD, InventoryConfig, MissingFieldPolicy};
pub use error::InventoryError;
pub use query::QuerySpec;
pub use record::Record;
pub use types::{Group, HostVars, Inventory};
