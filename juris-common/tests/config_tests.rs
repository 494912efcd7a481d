//! Configuration resolution tests
//!
//! Tests that touch JURIS_CONFIG or JURIS_DATABASE are marked #[serial] so
//! they never observe each other's environment changes.

use juris_common::config::{
    load_config, resolve_config_path, resolve_database_path, TomlConfig, CONFIG_ENV_VAR,
    DATABASE_ENV_VAR,
};
use juris_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_config_path_beats_environment() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/from-cli.toml")));
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_environment_config_path_used_without_cli() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_config_file_uses_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.toml");

    let config = load_config(Some(&missing)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_config_file_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("juris.toml");
    std::fs::write(
        &path,
        r#"
        [server]
        bind_addr = "0.0.0.0:8080"

        [phases]
        articles_per_phase = 7
        review_phase_interval = 3

        [cache]
        evaluation_ttl_secs = 30

        [economy]
        xp_per_correct_answer = 5
        "#,
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.phases.articles_per_phase, 7);
    assert_eq!(config.phases.review_phase_interval, 3);
    assert_eq!(config.cache.evaluation_ttl_secs, 30);
    assert_eq!(config.cache.structure_ttl_secs, 600);
    assert_eq!(config.economy.xp_per_correct_answer, 5);
}

#[test]
#[serial]
fn test_malformed_config_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("juris.toml");
    std::fs::write(&path, "[phases]\narticles_per_phase = \"six\"\n").unwrap();

    let result = load_config(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_database_path_priority() {
    let config = TomlConfig::parse("[database]\npath = \"/srv/juris/from-toml.db\"\n").unwrap();

    env::remove_var(DATABASE_ENV_VAR);
    assert_eq!(
        resolve_database_path(None, &config),
        PathBuf::from("/srv/juris/from-toml.db")
    );

    env::set_var(DATABASE_ENV_VAR, "/tmp/from-env.db");
    assert_eq!(resolve_database_path(None, &config), PathBuf::from("/tmp/from-env.db"));
    assert_eq!(
        resolve_database_path(Some(Path::new("/tmp/from-cli.db")), &config),
        PathBuf::from("/tmp/from-cli.db")
    );
    env::remove_var(DATABASE_ENV_VAR);

    let default = resolve_database_path(None, &TomlConfig::default());
    assert!(default.ends_with("juris.db"));
}
