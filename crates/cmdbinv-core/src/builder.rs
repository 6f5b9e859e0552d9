//! Record to inventory transformation

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::{HOST_NAME_FIELD, InventoryConfig, MissingFieldPolicy};
use crate::error::InventoryError;
use crate::record::Record;
use crate::types::{Inventory, META_KEY};

/// Builds an [`Inventory`] from fetched records
///
/// Records are processed in the order given. Groups and hosts appear in the
/// output in order of first appearance; nothing is sorted or deduplicated.
#[derive(Debug, Clone)]
pub struct InventoryBuilder<'a> {
    config: &'a InventoryConfig,
}

impl<'a> InventoryBuilder<'a> {
    /// Create a builder for a resolved configuration
    #[must_use]
    pub fn new(config: &'a InventoryConfig) -> Self {
        Self { config }
    }

    /// Build the complete inventory.
    ///
    /// # Errors
    /// Returns [`InventoryError::MissingHostName`] for a record whose host
    /// name is absent, null, or not a scalar, and [`InventoryError::FieldLookup`] for a record
    /// lacking a configured field when the policy is
    /// [`MissingFieldPolicy::Fail`].
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn build(&self, records: &[Record]) -> Result<Inventory, InventoryError> {
        let mut inventory = Inventory::new();

        for (index, record) in records.iter().enumerate() {
            self.add_record(&mut inventory, index, record)?;
        }

        debug!(
            hosts = inventory.host_count(),
            groups = inventory.group_count(),
            "inventory built"
        );

        Ok(inventory)
    }

    fn add_record(
        &self,
        inventory: &mut Inventory,
        index: usize,
        record: &Record,
    ) -> Result<(), InventoryError> {
        let host = record
            .name_of(HOST_NAME_FIELD)
            .ok_or_else(|| InventoryError::MissingHostName {
                index,
                field: HOST_NAME_FIELD.to_string(),
            })?;

        inventory.add_host(host.clone());

        for field in &self.config.group_fields {
            match self.lookup(record, &host, field)? {
                None | Some(Value::Null) => continue,
                Some(_) => {}
            }

            let Some(group) = record.name_of(field) else {
                debug!(host = %host, field = %field, "value cannot name a group, skipping");
                continue;
            };

            if group == META_KEY {
                warn!(
                    host = %host,
                    field = %field,
                    "group name collides with reserved key, skipping"
                );
                continue;
            }

            if inventory.add_group(&group, self.config.group_vars_for(&group)) {
                debug!(group = %group, "created group");
            }
            inventory.add_host_to_group(&group, host.clone());
        }

        for field in &self.config.host_var_fields {
            let value = self
                .lookup(record, &host, field)?
                .cloned()
                .unwrap_or(Value::Null);
            inventory.set_variable(&host, field.clone(), value);
        }

        Ok(())
    }

    /// Field value, or `None` when absent and the policy tolerates it
    fn lookup<'r>(
        &self,
        record: &'r Record,
        host: &str,
        field: &str,
    ) -> Result<Option<&'r Value>, InventoryError> {
        match (record.get(field), self.config.missing_fields) {
            (Some(value), _) => Ok(Some(value)),
            (None, MissingFieldPolicy::Null) => Ok(None),
            (None, MissingFieldPolicy::Fail) => Err(InventoryError::FieldLookup {
                host: host.to_string(),
                field: field.to_string(),
            }),
        }
    }
}
