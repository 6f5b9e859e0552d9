//! Search expression builder for the Remedy REST API
//!
//! Remedy qualifications quote field names with single quotes and string
//! literals with double quotes, e.g. `'Item' = "Server"`.

use std::collections::BTreeSet;
use std::fmt;

use crate::config::InventoryConfig;

/// Qualification builder
///
/// Clauses are joined with `AND`.
#[derive(Debug, Clone, Default)]
pub struct Qualification {
    clauses: Vec<String>,
}

/// Quote a string literal, doubling embedded double quotes
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

impl Qualification {
    /// Create an empty qualification
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a field to equal a value
    #[must_use]
    pub fn where_eq(mut self, field: &str, value: &str) -> Self {
        self.clauses.push(format!("'{field}' = {}", quote(value)));
        self
    }

    /// Require a field to contain a value
    #[must_use]
    pub fn where_contains(mut self, field: &str, value: &str) -> Self {
        self.clauses
            .push(format!("'{field}' LIKE {}", quote(&format!("%{value}%"))));
        self
    }

    /// Build the qualification string
    #[must_use]
    pub fn build(&self) -> String {
        self.clauses.join(" AND ")
    }
}

impl fmt::Display for Qualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build())
    }
}

/// Field selection and filter for one record search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    /// Value of the `fields` query parameter, e.g. `values(Name,Domain)`
    pub fields: String,
    /// Value of the `q` query parameter
    pub filter: String,
}

impl QuerySpec {
    /// Build the search for every group and host variable field.
    ///
    /// Each field is requested once. The selection goes through a set, so the
    /// order in the request does not follow the configuration. A blank
    /// `os_filter` is ignored.
    #[must_use]
    pub fn build(config: &InventoryConfig, os_filter: Option<&str>) -> Self {
        let selected: BTreeSet<&str> = config
            .host_var_fields
            .iter()
            .chain(&config.group_fields)
            .map(String::as_str)
            .collect();

        let fields = format!(
            "values({})",
            selected.into_iter().collect::<Vec<_>>().join(",")
        );

        let mut qualification = Qualification::new().where_eq("Item", "Server");
        if let Some(os) = os_filter.map(str::trim).filter(|os| !os.is_empty()) {
            qualification = qualification.where_contains("Expansion", os);
        }

        Self {
            fields,
            filter: qualification.build(),
        }
    }

    /// Field names in the selection
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .strip_prefix("values(")
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or_default()
            .split(',')
            .filter(|f| !f.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldOverrides, InventoryDefaults};

    #[test]
    fn test_default_filter() {
        let query = QuerySpec::build(&InventoryConfig::default(), None);
        assert_eq!(query.filter, "'Item' = \"Server\"");
    }

    #[test]
    fn test_os_filter_narrows() {
        let query = QuerySpec::build(&InventoryConfig::default(), Some("Linux"));
        assert_eq!(
            query.filter,
            "'Item' = \"Server\" AND 'Expansion' LIKE \"%Linux%\""
        );
    }

    #[test]
    fn test_blank_os_filter_ignored() {
        let query = QuerySpec::build(&InventoryConfig::default(), Some("  "));
        assert_eq!(query.filter, "'Item' = \"Server\"");
    }

    #[test]
    fn test_quote_escaping() {
        let q = Qualification::new().where_eq("Name", "a\"b").build();
        assert_eq!(q, "'Name' = \"a\"\"b\"");
    }

    #[test]
    fn test_fields_are_deduplicated() {
        let config = InventoryConfig::default();
        let query = QuerySpec::build(&config, None);

        let names: Vec<&str> = query.field_names().collect();
        // 13 host vars + 8 groups, 6 shared
        assert_eq!(names.len(), 15);
        for field in config.group_fields.iter().chain(&config.host_var_fields) {
            assert_eq!(names.iter().filter(|n| **n == field.as_str()).count(), 1);
        }
        assert!(query.fields.starts_with("values("));
        assert!(query.fields.ends_with(')'));
    }

    #[test]
    fn test_overridden_fields_selected() {
        let overrides = FieldOverrides {
            groups: Some("Site".to_string()),
            host_vars: Some("PrimaryIP".to_string()),
        };
        let config = InventoryConfig::resolve(&InventoryDefaults::default(), &overrides);
        let query = QuerySpec::build(&config, None);

        let mut names: Vec<&str> = query.field_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Name", "PrimaryIP", "Site"]);
    }
}
