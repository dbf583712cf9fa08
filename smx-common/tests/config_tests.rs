//! Unit tests for configuration loading
//!
//! Tests that manipulate SMX_CONFIG are marked with #[serial] so they don't
//! race each other.

use serial_test::serial;
use smx_common::config::{SmxConfig, CONFIG_ENV_VAR};
use smx_common::{Error, FolderKind};
use std::env;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = SmxConfig::default();
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.folders.excluded_suffixes, vec![".meta", ".test"]);
    assert!(config.folders.ignore_patterns.contains(&"Thumbs.db".to_string()));
    assert!(config.fields.catalog.is_none());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = SmxConfig::from_toml_str(
        r#"
[logging]
level = "debug"
"#,
    )
    .unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.folders.excluded_suffixes, vec![".meta", ".test"]);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let result = SmxConfig::from_toml_str("[logging\nlevel = ");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_explicit_path_wins() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[folders]
excluded_suffixes = [".meta", ".test", ".bak"]
"#,
    )
    .unwrap();
    env::set_var(CONFIG_ENV_VAR, "/nonexistent/smx.toml");

    let config = SmxConfig::load(Some(&path)).unwrap();
    assert_eq!(config.folders.excluded_suffixes.len(), 3);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_path_must_exist() {
    env::set_var(CONFIG_ENV_VAR, "/nonexistent/smx.toml");
    let result = SmxConfig::load(None);
    env::remove_var(CONFIG_ENV_VAR);

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_env_var_path_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("smx.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &path);

    let config = SmxConfig::load(None).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_custom_field_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog_path = dir.path().join("fields.json");
    std::fs::write(
        &catalog_path,
        r#"{"person":[{"key":"name"},{"key":"clan","isAdditional":true}]}"#,
    )
    .unwrap();

    let config = SmxConfig::from_toml_str(&format!(
        "[fields]\ncatalog = {:?}\n",
        catalog_path.to_string_lossy()
    ))
    .unwrap();
    let catalog = config.field_catalog().unwrap();

    assert_eq!(catalog.definitions(FolderKind::Person).len(), 2);
    assert!(catalog.definitions(FolderKind::Session).is_empty());
}

#[test]
fn test_missing_catalog_file_is_error() {
    let config = SmxConfig::from_toml_str("[fields]\ncatalog = \"/nonexistent/fields.json\"\n").unwrap();
    assert!(matches!(config.field_catalog(), Err(Error::Io(_))));
}
