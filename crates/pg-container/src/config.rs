//! pg_container config
//!

use core::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};
use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logging config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// The default log level.
    pub level: String,

    /// Directory for daily rolling log files. Logs only go to stdout if unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// Dump tool config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DumpToolConfig {
    /// The dump executable, looked up on `PATH` if not a path.
    pub path: PathBuf,

    /// Where an embedded dump tool is written to. Defaults to the system temp directory.
    pub scratch_directory: Option<PathBuf>,

    /// How long the dump may take.
    pub timeout_seconds: u64,
}

impl DumpToolConfig {
    /// How long the dump may take.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for DumpToolConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("pg_dump"),
            scratch_directory: None,
            timeout_seconds: 60 * 60,
        }
    }
}

/// Image build config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    /// A Dockerfile to use instead of the built-in one.
    pub dockerfile: Option<PathBuf>,

    /// How long the build may take.
    pub timeout_seconds: u64,
}

impl BuildConfig {
    /// How long the build may take.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dockerfile: None,
            timeout_seconds: 30 * 60,
        }
    }
}

/// Container config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContainerConfig {
    /// Prefix of the container name.
    pub name_prefix: String,

    /// The port Postgres listens on inside the container.
    pub service_port: u16,

    /// The host address the service port is published on.
    pub host_ip: IpAddr,

    /// The host port the service port is published on.
    pub host_port: u16,

    /// How long each create or start call may take.
    pub call_timeout_seconds: u64,
}

impl ContainerConfig {
    /// How long each create or start call may take.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_seconds)
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name_prefix: "postgres-".to_string(),
            service_port: 5432,
            host_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            host_port: 5432,
            call_timeout_seconds: 60,
        }
    }
}

/// The pg_container config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Logging config.
    pub logging: LoggingConfig,

    /// Dump tool config.
    pub dump_tool: DumpToolConfig,

    /// Image build config.
    pub build: BuildConfig,

    /// Container config.
    pub container: ContainerConfig,
}

impl Config {
    /// Tries to load a config from a toml file.
    pub fn load_toml(file_path: PathBuf) -> Result<Self, LoadConfigError> {
        if !file_path.exists() {
            return Err(LoadConfigError::NoFile);
        }

        let contents = fs::read_to_string(file_path).map_err(LoadConfigError::Read)?;
        let config = toml::from_str(&contents)?;

        Ok(config)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("The file does not exist.")]
    NoFile,

    #[error("Failed to read the file:\n{0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to deserialize the file:\n{0}")]
    Deserialize(#[from] toml::de::Error),
}
