//! Inventory document types
//!
//! The serialized shape is the Ansible dynamic inventory format:
//!
//! ```json
//! {
//!   "_meta": { "hostvars": { "web01": { "Name": "web01" } } },
//!   "all": { "hosts": ["web01"], "vars": {}, "children": [] },
//!   "Linux": { "hosts": ["web01"], "vars": {}, "children": [] }
//! }
//! ```
//!
//! Groups and host variables keep their insertion order.

use std::collections::HashMap;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use crate::config::GroupVars;

/// Reserved group holding every host
pub const ALL_GROUP: &str = "all";

/// Reserved key holding per-host variables
pub const META_KEY: &str = "_meta";

// ============================================================================
// Groups
// ============================================================================

/// Inventory group
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Group {
    /// Member host names, in order of membership; may repeat
    pub hosts: Vec<String>,
    /// Connection variables
    pub vars: GroupVars,
    /// Child group names (never populated)
    pub children: Vec<String>,
}

impl Group {
    /// Create an empty group with the given variables
    #[must_use]
    pub fn with_vars(vars: GroupVars) -> Self {
        Self {
            vars,
            ..Self::default()
        }
    }
}

// ============================================================================
// Host variables
// ============================================================================

/// Variables for one host, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostVars {
    entries: Vec<(String, Value)>,
}

impl HostVars {
    /// Set a variable, replacing any earlier value in place
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Get a variable
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Variable names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no variable is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for HostVars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Full Inventory
// ============================================================================

/// Complete inventory document
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    all: Group,
    groups: Vec<(String, Group)>,
    group_index: HashMap<String, usize>,
    hostvars: Vec<(String, HostVars)>,
    host_index: HashMap<String, usize>,
}

impl Inventory {
    /// Create an empty inventory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a host to the `all` group. Repeated names are kept.
    pub fn add_host(&mut self, host: impl Into<String>) {
        self.all.hosts.push(host.into());
    }

    /// Register a group unless it already exists.
    ///
    /// Returns `true` when the group was created. Reserved names are never
    /// created.
    pub fn add_group(&mut self, name: &str, vars: Option<&GroupVars>) -> bool {
        if name == ALL_GROUP || name == META_KEY || self.group_index.contains_key(name) {
            return false;
        }

        let group = Group::with_vars(vars.cloned().unwrap_or_default());
        self.group_index.insert(name.to_string(), self.groups.len());
        self.groups.push((name.to_string(), group));
        true
    }

    /// Append a host to a group's member list.
    ///
    /// Returns `false` if the group does not exist.
    pub fn add_host_to_group(&mut self, group: &str, host: impl Into<String>) -> bool {
        match self.group_mut(group) {
            Some(group) => {
                group.hosts.push(host.into());
                true
            }
            None => false,
        }
    }

    /// Set one variable for a host, creating its variable mapping on first use
    pub fn set_variable(&mut self, host: &str, key: impl Into<String>, value: Value) {
        let index = match self.host_index.get(host) {
            Some(&index) => index,
            None => {
                let index = self.hostvars.len();
                self.host_index.insert(host.to_string(), index);
                self.hostvars.push((host.to_string(), HostVars::default()));
                index
            }
        };
        self.hostvars[index].1.set(key, value);
    }

    fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        if name == ALL_GROUP {
            return Some(&mut self.all);
        }
        let index = *self.group_index.get(name)?;
        Some(&mut self.groups[index].1)
    }

    /// The `all` group
    #[must_use]
    pub fn all(&self) -> &Group {
        &self.all
    }

    /// Look up a group by name, including `all`
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        if name == ALL_GROUP {
            return Some(&self.all);
        }
        self.group_index.get(name).map(|&i| &self.groups[i].1)
    }

    /// Named groups in order of creation, excluding `all`
    pub fn groups(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.groups.iter().map(|(name, group)| (name.as_str(), group))
    }

    /// Variables of one host
    #[must_use]
    pub fn hostvars(&self, host: &str) -> Option<&HostVars> {
        self.host_index.get(host).map(|&i| &self.hostvars[i].1)
    }

    /// Hosts with variables, in order of first appearance
    pub fn host_names(&self) -> impl Iterator<Item = &str> {
        self.hostvars.iter().map(|(name, _)| name.as_str())
    }

    /// Number of named groups, excluding `all`
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of distinct hosts
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.hostvars.len()
    }
}

struct HostvarsView<'a>(&'a [(String, HostVars)]);

impl Serialize for HostvarsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (host, vars) in self.0 {
            map.serialize_entry(host, vars)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct Meta<'a> {
    hostvars: HostvarsView<'a>,
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len() + 2))?;
        map.serialize_entry(
            META_KEY,
            &Meta {
                hostvars: HostvarsView(&self.hostvars),
            },
        )?;
        map.serialize_entry(ALL_GROUP, &self.all)?;
        for (name, group) in &self.groups {
            map.serialize_entry(name, group)?;
        }
        map.end()
    }
}
