//! Field and group-variable configuration
//!
//! The built-in defaults describe the BMC Remedy `AST:ComputerSystem` form.
//! A run starts from [`InventoryDefaults`] (built-in, or loaded from a file by
//! the binary) and applies [`FieldOverrides`] taken from the environment.
//! Resolution never mutates the defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Field that identifies a host on every record
pub const HOST_NAME_FIELD: &str = "Name";

/// Connection variables attached to a group
pub type GroupVars = Map<String, Value>;

const DEFAULT_GROUP_FIELDS: [&str; 8] = [
    "RebootLevel",
    "Project Number",
    "Project Code",
    "System Environment",
    "Expansion",
    "Expansion Interface",
    "AssetLifecycleStatus",
    "CityName",
];

const DEFAULT_HOST_VAR_FIELDS: [&str; 13] = [
    "Name",
    "Domain",
    "System Role",
    "System Environment",
    "PrimaryIP",
    "RebootLevel",
    "AssetLifecycleStatus",
    "Item",
    "Department",
    "CityName",
    "DeviceRole",
    "Expansion Interface",
    "Expansion",
];

fn builtin_group_vars() -> BTreeMap<String, GroupVars> {
    let bundles = [
        (
            "Windows",
            json!({
                "ansible_connection": "winrm",
                "ansible_port": 5985,
                "ansible_winrm_transport": "kerberos",
                "ansible_winrm_read_timeout_sec": 70,
                "ansible_winrm_operation_timeout_sec": 60,
                "ansible_winrm_message_encryption": "auto"
            }),
        ),
        ("Linux", json!({})),
        (
            "Solaris10",
            json!({
                "ansible_become_exe": "/usr/local/bin/sudo",
                "ansible_shell_executable": "/bin/bash"
            }),
        ),
        (
            "Solaris11",
            json!({ "ansible_python_interpreter": "/usr/bin/python2" }),
        ),
        ("AIX", json!({})),
    ];

    bundles
        .into_iter()
        .map(|(name, vars)| {
            let vars = match vars {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            (name.to_string(), vars)
        })
        .collect()
}

/// What to do when a record lacks a configured field entirely
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Abort the run with a field lookup error
    #[default]
    Fail,
    /// Treat the field as null
    Null,
}

impl fmt::Display for MissingFieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingFieldPolicy::Fail => write!(f, "fail"),
            MissingFieldPolicy::Null => write!(f, "null"),
        }
    }
}

impl FromStr for MissingFieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(MissingFieldPolicy::Fail),
            "null" => Ok(MissingFieldPolicy::Null),
            other => Err(format!("unknown missing-field policy: {other}")),
        }
    }
}

/// Baseline field lists and group variable bundles
///
/// Deserializable so a settings file can replace any part of it; omitted keys
/// keep the built-in value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryDefaults {
    /// Fields whose values name groups
    pub group_fields: Vec<String>,
    /// Fields copied into host variables
    pub host_var_fields: Vec<String>,
    /// Connection variables for recognized group names
    pub group_vars: BTreeMap<String, GroupVars>,
}

impl Default for InventoryDefaults {
    fn default() -> Self {
        Self {
            group_fields: DEFAULT_GROUP_FIELDS.iter().map(ToString::to_string).collect(),
            host_var_fields: DEFAULT_HOST_VAR_FIELDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            group_vars: builtin_group_vars(),
        }
    }
}

/// Comma-separated field list overrides, usually from `REMEDY_GROUPS` and
/// `REMEDY_HOSTVARS`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOverrides {
    /// Replacement group field list
    pub groups: Option<String>,
    /// Replacement host variable field list
    pub host_vars: Option<String>,
}

/// Split a comma-separated override, trimming entries and dropping blanks.
///
/// Returns `None` when nothing usable is left.
fn parse_list(raw: Option<&str>) -> Option<Vec<String>> {
    let fields: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(ToString::to_string)
        .collect();

    (!fields.is_empty()).then_some(fields)
}

/// Resolved configuration for one inventory run
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryConfig {
    /// Fields whose values name groups, in evaluation order
    pub group_fields: Vec<String>,
    /// Fields copied into host variables, in output order
    pub host_var_fields: Vec<String>,
    /// Connection variables for recognized group names
    pub group_vars: BTreeMap<String, GroupVars>,
    /// Handling of fields absent from a record
    pub missing_fields: MissingFieldPolicy,
}

impl InventoryConfig {
    /// Resolve the run configuration from defaults and overrides.
    ///
    /// A present, non-empty override replaces the matching default list
    /// wholesale. [`HOST_NAME_FIELD`] is appended to the host variable fields
    /// when missing.
    #[must_use]
    pub fn resolve(defaults: &InventoryDefaults, overrides: &FieldOverrides) -> Self {
        let group_fields = parse_list(overrides.groups.as_deref())
            .unwrap_or_else(|| defaults.group_fields.clone());
        let mut host_var_fields = parse_list(overrides.host_vars.as_deref())
            .unwrap_or_else(|| defaults.host_var_fields.clone());

        if !host_var_fields.iter().any(|f| f == HOST_NAME_FIELD) {
            host_var_fields.push(HOST_NAME_FIELD.to_string());
        }

        Self {
            group_fields,
            host_var_fields,
            group_vars: defaults.group_vars.clone(),
            missing_fields: MissingFieldPolicy::default(),
        }
    }

    /// Set the missing-field policy
    #[must_use]
    pub fn with_missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }

    /// Default connection variables for a group, if the name is recognized.
    ///
    /// Matching is exact and case-sensitive.
    #[must_use]
    pub fn group_vars_for(&self, group: &str) -> Option<&GroupVars> {
        self.group_vars.get(group)
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self::resolve(&InventoryDefaults::default(), &FieldOverrides::default())
    }
}
