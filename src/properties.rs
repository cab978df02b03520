//! Key=value property file store.
//!
//! Properties are plain UTF-8 `key=value` lines. Lines starting with `#` or
//! `!` are comments; blank lines are skipped. Keys and values are trimmed.
//! Saved files carry a timestamp comment header and sorted entries, so a
//! save is deterministic for a given map.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Local;
use tracing::debug;

use crate::error::FileError;
use crate::fs_ops;

/// A loaded property set.
pub type Properties = BTreeMap<String, String>;

/// Load properties from a file, then apply overrides.
///
/// Each override string of the form `key=value` replaces the loaded value
/// for that key only when the key already exists; overrides never introduce
/// new keys. Strings without `=` are ignored. Override values may themselves
/// contain `=` (the split is on the first occurrence).
///
/// # Errors
/// Returns `FileError::NotFound` if the file cannot be read.
pub fn get_properties_from_file(
    path: &Path,
    overrides: &[&str],
) -> Result<Properties, FileError> {
    let content = fs::read_to_string(path).map_err(|e| FileError::NotFound {
        path: path.to_path_buf(),
        source: Some(e),
    })?;
    let mut properties = parse(&content);
    apply_overrides(&mut properties, overrides);
    Ok(properties)
}

/// Like [`get_properties_from_file`], but creates an empty file first when
/// the path does not exist.
pub fn get_or_create_properties_from_file(
    path: &Path,
    overrides: &[&str],
) -> Result<Properties, FileError> {
    if !path.exists() {
        fs_ops::ensure_parent_dir_exists(path)?;
        fs::File::create(path).map_err(|e| FileError::CreationFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("created empty property file {}", path.display());
    }
    get_properties_from_file(path, overrides)
}

/// Save a property set, creating parent directories and the file as needed.
///
/// # Errors
/// Returns `FileError::CreationFailed` on any I/O failure.
pub fn save(properties: &Properties, path: &Path) -> Result<(), FileError> {
    fs_ops::ensure_parent_dir_exists(path)?;
    let mut out = String::new();
    out.push_str(&format!(
        "# {}\n",
        Local::now().format("%a %b %d %H:%M:%S %Y")
    ));
    for (key, value) in properties {
        out.push_str(&format!("{key}={value}\n"));
    }
    fs::write(path, out).map_err(|e| FileError::CreationFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("saved {} properties to {}", properties.len(), path.display());
    Ok(())
}

fn parse(content: &str) -> Properties {
    let mut properties = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            properties.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    properties
}

fn apply_overrides(properties: &mut Properties, overrides: &[&str]) {
    for pair in overrides {
        if let Some((key, value)) = pair.split_once('=') {
            if let Some(slot) = properties.get_mut(key) {
                *slot = value.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reports_not_found() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let result = get_properties_from_file(&temp_dir.path().join("absent.properties"), &[]);
        assert!(matches!(result, Err(FileError::NotFound { .. })));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp_dir.path().join("app.properties");
        fs::write(
            &file,
            "# header\n\n! note\nhost = example.org\nport=8080\nbroken line\n",
        )
        .expect("Failed to write");

        let properties = get_properties_from_file(&file, &[]).expect("Failed to load");
        assert_eq!(properties.len(), 2);
        assert_eq!(properties["host"], "example.org");
        assert_eq!(properties["port"], "8080");
    }

    #[test]
    fn test_overrides_replace_existing_keys_only() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp_dir.path().join("app.properties");
        fs::write(&file, "host=example.org\nport=8080\n").expect("Failed to write");

        let properties =
            get_properties_from_file(&file, &["port=9090", "debug=true", "malformed"])
                .expect("Failed to load");
        assert_eq!(properties["port"], "9090");
        assert_eq!(properties["host"], "example.org");
        assert!(!properties.contains_key("debug"));
        assert_eq!(properties.len(), 2);
    }

    #[test]
    fn test_override_value_may_contain_equals() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp_dir.path().join("app.properties");
        fs::write(&file, "query=a\n").expect("Failed to write");

        let properties =
            get_properties_from_file(&file, &["query=x=y"]).expect("Failed to load");
        assert_eq!(properties["query"], "x=y");
    }

    #[test]
    fn test_get_or_create_then_round_trip() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp_dir.path().join("store").join("app.properties");

        let properties =
            get_or_create_properties_from_file(&file, &[]).expect("Failed to create");
        assert!(properties.is_empty());
        assert!(file.is_file());

        let mut properties = properties;
        properties.insert("answer".to_string(), "42".to_string());
        save(&properties, &file).expect("Failed to save");

        let loaded = get_properties_from_file(&file, &[]).expect("Failed to reload");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["answer"], "42");
    }

    #[test]
    fn test_save_creates_parents_and_header() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp_dir.path().join("deep").join("cfg").join("app.properties");

        let mut properties = Properties::new();
        properties.insert("b".to_string(), "2".to_string());
        properties.insert("a".to_string(), "1".to_string());
        save(&properties, &file).expect("Failed to save");

        let content = fs::read_to_string(&file).expect("Failed to read back");
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[0].starts_with('#'));
        // Entries are written sorted.
        assert_eq!(lines[1], "a=1");
        assert_eq!(lines[2], "b=2");
    }
}
