use shellstore_core::config::{registry, store, EventBackend};
use shellstore_core::{Backend, ConfigError, RegistryConfig, StoreConfig};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn missing_default_file_keeps_built_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StoreConfig::new();

    config
        .load_with(&dir.path().join("absent.properties"), env(&[]))
        .unwrap();

    assert_eq!(config, StoreConfig::new());
}

#[test]
fn default_properties_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(store::DEFAULT_CONFIG_PATH);
    fs::write(
        &path,
        "# shell store\nstore.backend = InMemory\nstore.collection: production\n\n! legacy comment\n",
    )
    .unwrap();
    let mut config = StoreConfig::new();

    config.load_with(&path, env(&[])).unwrap();

    assert_eq!(config.backend().unwrap(), Backend::InMemory);
    assert_eq!(config.collection().unwrap(), "production");
    assert_eq!(config.path().unwrap(), "shellstore.sqlite3");
}

#[test]
fn file_named_by_environment_wins_over_default_path() {
    let dir = tempfile::tempdir().unwrap();
    let default_path = dir.path().join("default.properties");
    let named_path = dir.path().join("named.properties");
    fs::write(&default_path, "store.collection=fromDefault\n").unwrap();
    fs::write(&named_path, "store.collection=fromNamed\n").unwrap();
    let mut config = StoreConfig::new();

    config
        .load_with(
            &default_path,
            env(&[(store::DEFAULT_FILE_KEY, named_path.to_str().unwrap())]),
        )
        .unwrap();

    assert_eq!(config.collection().unwrap(), "fromNamed");
}

#[test]
fn missing_file_named_by_environment_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let named_path = dir.path().join("missing.properties");
    let mut config = StoreConfig::new();

    let err = config
        .load_with(
            &dir.path().join("default.properties"),
            env(&[(store::DEFAULT_FILE_KEY, named_path.to_str().unwrap())]),
        )
        .unwrap_err();

    match err {
        ConfigError::Io { path, .. } => assert_eq!(path, named_path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn precedence_is_explicit_then_environment_then_file_then_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shellstore.properties");
    fs::write(
        &path,
        "store.path=/var/lib/file.sqlite3\nstore.collection=fromFile\nstore.backend=InMemory\n",
    )
    .unwrap();
    let mut config = StoreConfig::new();

    config
        .load_with(
            &path,
            env(&[
                ("SHELLSTORE_STORE_PATH", "/var/lib/env.sqlite3"),
                ("SHELLSTORE_STORE_COLLECTION", "fromEnv"),
            ]),
        )
        .unwrap();
    config.set_collection("explicit");

    assert_eq!(config.collection().unwrap(), "explicit");
    assert_eq!(config.path().unwrap(), "/var/lib/env.sqlite3");
    assert_eq!(config.backend().unwrap(), Backend::InMemory);
    assert_eq!(config.log_dir(), None);
}

#[test]
fn unknown_backend_value_fails_at_load_time() {
    let mut config = StoreConfig::new();
    let err = config
        .load_with(
            Path::new("does-not-exist.properties"),
            env(&[("SHELLSTORE_STORE_BACKEND", "Mongo")]),
        )
        .unwrap_err();

    match err {
        ConfigError::InvalidEnumValue { key, source } => {
            assert_eq!(key, store::BACKEND);
            assert!(source.to_string().contains("Mongo"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_escape_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.properties");
    fs::write(&path, "store.backend=SQLite\nstore.user=\\u00zz\n").unwrap();
    let mut config = StoreConfig::new();

    let err = config.load_with(&path, env(&[])).unwrap_err();

    match err {
        ConfigError::Parse { origin, .. } => assert_eq!(origin, path.display().to_string()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_backend_in_file_fails_at_load_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shellstore.properties");
    fs::write(&path, "store.backend=bogus\n").unwrap();
    let mut config = StoreConfig::new();

    let err = config.load_with(&path, env(&[])).unwrap_err();

    assert!(matches!(err, ConfigError::InvalidEnumValue { key, .. } if key == store::BACKEND));
}

#[test]
fn java_properties_syntax_is_understood() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shellstore.properties");
    fs::write(
        &path,
        "store.collection production\nstore.path=/var/lib/\\\n    shells.sqlite3\nstore.user=urn\\:admin\n",
    )
    .unwrap();
    let mut config = StoreConfig::new();

    config.load_with(&path, env(&[])).unwrap();

    assert_eq!(config.collection().unwrap(), "production");
    assert_eq!(config.path().unwrap(), "/var/lib/shells.sqlite3");
    assert_eq!(config.credentials().unwrap().user, "urn:admin");
}

#[test]
fn credentials_come_from_configuration_and_are_redacted_in_debug() {
    let mut config = StoreConfig::new();
    assert!(config.credentials().is_none());

    config
        .load_with(
            Path::new("does-not-exist.properties"),
            env(&[
                ("SHELLSTORE_STORE_USER", "registry"),
                ("SHELLSTORE_STORE_PASSWORD", "s3cret"),
            ]),
        )
        .unwrap();

    let credentials = config.credentials().unwrap();
    assert_eq!(credentials.user, "registry");
    assert_eq!(credentials.password, "s3cret");
    assert!(!format!("{credentials:?}").contains("s3cret"));
}

#[test]
fn registry_options_load_from_file_and_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(registry::DEFAULT_CONFIG_PATH);
    fs::write(
        &path,
        "registry.backend=SQLite\nregistry.events=Log\nregistry.authorization=Enabled\n",
    )
    .unwrap();
    let mut config = RegistryConfig::new();

    config
        .load_with(
            &path,
            env(&[("SHELLSTORE_REGISTRY_REGISTRY_TAGGEDDIRECTORY", "Enabled")]),
        )
        .unwrap();

    assert_eq!(config.backend().unwrap(), Backend::Sqlite);
    assert_eq!(config.events().unwrap(), EventBackend::Log);
    assert!(config.is_authorization_enabled().unwrap());
    assert!(config.is_tagged_directory_enabled().unwrap());
}
