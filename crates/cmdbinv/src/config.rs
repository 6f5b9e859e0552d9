//! Inventory defaults file loading
//!
//! The file replaces built-in field lists and group variable bundles. Any key
//! it omits keeps its built-in value:
//!
//! ```toml
//! group_fields = ["System Environment", "Expansion"]
//!
//! [group_vars.Windows]
//! ansible_connection = "winrm"
//! ansible_port = 5986
//! ```

use std::path::{Path, PathBuf};

use cmdbinv_core::config::InventoryDefaults;
use tracing::debug;

/// Load defaults from a file
///
/// # Errors
/// Returns error if file cannot be read or parsed
pub fn load(path: &Path) -> eyre::Result<InventoryDefaults> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("cannot read {}: {e}", path.display()))?;
    let defaults: InventoryDefaults = toml::from_str(&content)
        .map_err(|e| eyre::eyre!("invalid config {}: {e}", path.display()))?;
    debug!(path = %path.display(), "loaded inventory defaults");
    Ok(defaults)
}

/// Candidate locations searched when no file is given
fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("cmdbinv.toml"),
        PathBuf::from("/etc/cmdbinv/cmdbinv.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cmdbinv/cmdbinv.toml"));
    }
    paths
}

/// Load from an explicit path, the default paths, or fall back to built-ins
///
/// # Errors
/// Returns error if an explicit or discovered file cannot be read or parsed.
/// A missing explicit file is an error; missing default files are not.
pub fn load_default(explicit: Option<&Path>) -> eyre::Result<InventoryDefaults> {
    load_first(explicit, &default_paths())
}

/// Load from an explicit path, else the first candidate that exists
fn load_first(
    explicit: Option<&Path>,
    candidates: &[PathBuf],
) -> eyre::Result<InventoryDefaults> {
    if let Some(path) = explicit {
        return load(path);
    }

    for path in candidates {
        if path.exists() {
            return load(path);
        }
    }

    debug!("no config file found, using built-in defaults");
    Ok(InventoryDefaults::default())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
group_fields = ["Site", "Owner"]

[group_vars.Windows]
ansible_connection = "winrm"
ansible_port = 5986

[group_vars.Ubuntu]
ansible_python_interpreter = "/usr/bin/python3"
"#
        )
        .unwrap();

        let defaults = load(file.path()).unwrap();

        assert_eq!(defaults.group_fields, vec!["Site", "Owner"]);
        assert_eq!(
            defaults.host_var_fields,
            InventoryDefaults::default().host_var_fields
        );
        assert_eq!(defaults.group_vars["Windows"]["ansible_port"], 5986);
        assert_eq!(defaults.group_vars["Windows"].len(), 1);
        assert!(defaults.group_vars.contains_key("Ubuntu"));
        // the table replaces the built-in bundles entirely
        assert!(!defaults.group_vars.contains_key("Solaris10"));
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "group_fields = 3").unwrap();

        assert!(load(file.path()).is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(load_default(Some(&path)).is_err());
    }

    #[test]
    fn test_search_order() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        std::fs::write(&first, r#"group_fields = ["Site"]"#).unwrap();
        std::fs::write(&second, r#"group_fields = ["Owner"]"#).unwrap();

        let candidates = vec![absent.clone(), first, second.clone()];
        let defaults = load_first(None, &candidates).unwrap();
        assert_eq!(defaults.group_fields, vec!["Site"]);

        // an explicit file wins over every candidate
        let defaults = load_first(Some(&second), &candidates).unwrap();
        assert_eq!(defaults.group_fields, vec!["Owner"]);

        let defaults = load_first(None, &[absent]).unwrap();
        assert_eq!(defaults, InventoryDefaults::default());
    }
}
