//! Tests for loading config
//!

use core::{net::Ipv4Addr, time::Duration};
use std::{fs, path::PathBuf};

use pg_container::{Config, LoadConfigError};
use tempfile::TempDir;

#[test]
fn defaults() {
    let config = Config::default();

    assert_eq!(config.logging.level, "info");
    assert!(config.logging.directory.is_none());
    assert_eq!(config.dump_tool.path, PathBuf::from("pg_dump"));
    assert_eq!(config.build.timeout(), Duration::from_secs(30 * 60));
    assert_eq!(config.container.name_prefix, "postgres-");
    assert_eq!(config.container.service_port, 5432);
    assert_eq!(config.container.host_ip, Ipv4Addr::LOCALHOST);
    assert_eq!(config.container.host_port, 5432);
}

#[test]
fn default_config_round_trips() {
    let directory = TempDir::new().unwrap();
    let path = directory.path().join("config.toml");

    let contents = toml::to_string_pretty(&Config::default()).unwrap();
    fs::write(&path, contents).unwrap();

    let config = Config::load_toml(path).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn partial_config_uses_defaults() {
    let directory = TempDir::new().unwrap();
    let path = directory.path().join("config.toml");
    fs::write(
        &path,
        concat!(
            "[dump_tool]\n",
            "path = \"/usr/lib/postgresql/16/bin/pg_dump\"\n",
            "\n",
            "[container]\n",
            "host_port = 15432\n",
        ),
    )
    .unwrap();

    let config = Config::load_toml(path).unwrap();
    assert_eq!(
        config.dump_tool.path,
        PathBuf::from("/usr/lib/postgresql/16/bin/pg_dump")
    );
    assert_eq!(config.container.host_port, 15432);
    assert_eq!(config.container.service_port, 5432);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn missing_file() {
    let directory = TempDir::new().unwrap();

    let result = Config::load_toml(directory.path().join("missing.toml"));
    assert!(matches!(result, Err(LoadConfigError::NoFile)));
}

#[test]
fn invalid_file() {
    let directory = TempDir::new().unwrap();
    let path = directory.path().join("config.toml");
    fs::write(&path, "[container]\nhost_port = \"not a port\"\n").unwrap();

    let result = Config::load_toml(path);
    assert!(matches!(result, Err(LoadConfigError::Deserialize(_))));
}
