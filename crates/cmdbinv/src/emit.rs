//! Inventory output in the Ansible dynamic inventory protocol

use cmdbinv_core::Inventory;
use serde::Serialize;
use serde_json::{Map, Value};

/// What the inventory consumer asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// `--list`: the whole document
    List,
    /// `--host <name>`: one host's variables
    Host(String),
}

fn to_string<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Render the requested view of the inventory.
///
/// An unknown host renders as `{}`.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render(inventory: &Inventory, mode: &Mode, pretty: bool) -> serde_json::Result<String> {
    match mode {
        Mode::List => to_string(inventory, pretty),
        Mode::Host(name) => match inventory.hostvars(name) {
            Some(vars) => to_string(vars, pretty),
            None => to_string(&Value::Object(Map::new()), pretty),
        },
    }
}
