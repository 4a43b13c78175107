//! Configuration loading and typed config structures.
//!
//! The service reads a YAML file (by default `gamestate-config.yaml`). Every
//! field has a default, so an empty file or a missing section is valid.
//! Environment variables override the bind address and CORS origin:
//!
//! - `GAMESTATE_API_HOST` overrides `server.host`
//! - `GAMESTATE_API_PORT` overrides `server.port`
//! - `GAMESTATE_API_ALLOWED_ORIGIN` overrides `server.allowed_origin`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::metrics::MetricsBackend;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An override environment variable held an unusable value.
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv {
        /// The variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Host metrics settings.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Settings for the bundled in-memory world.
    #[serde(default)]
    pub world: WorldConfig,
}

impl ApiConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidEnv`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }
}

/// HTTP listener settings. Fixed for the lifetime of a server instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (e.g. `127.0.0.1`, `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port; `0` asks the OS for an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Value of `Access-Control-Allow-Origin` on every response.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,

    /// How long `start` waits for the listener to report its bind result.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// How long `stop` lets in-flight requests finish before dropping them.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl ServerConfig {
    /// Shorthand for a config with the given address and origin and
    /// default timeouts.
    pub fn new(host: impl Into<String>, port: u16, allowed_origin: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            allowed_origin: allowed_origin.into(),
            ..Self::default()
        }
    }

    /// Bounded wait for the listener's readiness signal.
    pub const fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Drain window granted to in-flight requests on stop.
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("GAMESTATE_API_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("GAMESTATE_API_PORT") {
            self.port = port.trim().parse().map_err(|_err| ConfigError::InvalidEnv {
                name: "GAMESTATE_API_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(origin) = lookup("GAMESTATE_API_ALLOWED_ORIGIN") {
            self.allowed_origin = origin;
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
            ready_timeout_ms: default_ready_timeout_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

/// Host metrics settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetricsConfig {
    /// Which sampler to use.
    #[serde(default)]
    pub backend: MetricsBackend,

    /// Root of the procfs mount read by the `procfs` backend.
    #[serde(default = "default_procfs_root")]
    pub procfs_root: PathBuf,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            backend: MetricsBackend::default(),
            procfs_root: default_procfs_root(),
        }
    }
}

/// Settings for the bundled in-memory world used by the standalone binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Realm name reported by `/api/server`.
    #[serde(default = "default_realm_name")]
    pub realm_name: String,

    /// Optional JSON roster to preload.
    #[serde(default)]
    pub roster_path: Option<PathBuf>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            realm_name: default_realm_name(),
            roster_path: None,
        }
    }
}

fn default_host() -> String {
    String::from("127.0.0.1")
}

const fn default_port() -> u16 {
    8089
}

fn default_allowed_origin() -> String {
    String::from("*")
}

const fn default_ready_timeout_ms() -> u64 {
    2000
}

const fn default_shutdown_grace_ms() -> u64 {
    5000
}

fn default_procfs_root() -> PathBuf {
    PathBuf::from("/proc")
}

fn default_realm_name() -> String {
    String::from("Local Realm")
}
