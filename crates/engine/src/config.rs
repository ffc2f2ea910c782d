// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service configuration.
//!
//! TOML file named by the `DOCSCRUB_CONFIG` environment variable:
//!
//! ```toml
//! [docscrub]
//! podman_uri = "unix:///run/podman/podman.sock"
//! data_dir = "/var/lib/docscrub"
//! log_to_syslog = "logs.example.com:udp:514"
//! contact = "admin@example.com"
//! max_concurrent_jobs = 4
//!
//! [plugins.pdf]
//! containerized.image = "docscrub/pdf-scrubber"
//! ```
//!
//! Plugin sections drive the job type registry; see [`crate::plugins`].

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "DOCSCRUB_CONFIG";

const DEFAULT_DATA_DIR: &str = "/var/lib/docscrub";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyslogProto {
    Tcp,
    Udp,
}

/// Validated `host:proto:port` syslog forwarding target. Transport wiring
/// is left to the entrypoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogTarget {
    pub host: String,
    pub proto: SyslogProto,
    pub port: u16,
}

impl FromStr for SyslogTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (host, proto, port) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(host), Some(proto), Some(port), None) if !host.is_empty() => {
                (host, proto, port)
            }
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "log_to_syslog must be host:proto:port, got {s:?}"
                )))
            }
        };
        let proto = match proto.to_ascii_lowercase().as_str() {
            "tcp" => SyslogProto::Tcp,
            "udp" => SyslogProto::Udp,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown syslog protocol {other:?}"
                )))
            }
        };
        let port = port
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid syslog port {port:?}")))?;
        Ok(Self {
            host: host.to_string(),
            proto,
            port,
        })
    }
}

/// One `[plugins.<name>]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginConfig {
    pub containerized: ContainerizedConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerizedConfig {
    /// Image reference for this plugin's sandbox container
    pub image: String,
}

#[derive(Debug, Default, Deserialize)]
struct DocscrubSection {
    podman_uri: Option<String>,
    log_to_syslog: Option<String>,
    contact: Option<String>,
    data_dir: Option<PathBuf>,
    max_concurrent_jobs: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    docscrub: DocscrubSection,
    #[serde(default)]
    plugins: BTreeMap<String, PluginConfig>,
}

/// Parsed service configuration.
#[derive(Debug)]
pub struct Config {
    /// Container-runtime socket URI; required once a containerized plugin
    /// is configured.
    pub podman_uri: Option<String>,
    pub syslog: Option<SyslogTarget>,
    /// Display string surfaced by entrypoints
    pub contact: Option<String>,
    /// Repository root directory
    pub data_dir: PathBuf,
    /// Dispatcher cap; defaults to the host CPU count when absent
    pub max_concurrent_jobs: Option<usize>,
    /// Plugin sections in registration order (lexical by section name)
    pub plugins: Vec<(String, PluginConfig)>,
}

impl Config {
    /// Loads the file named by `DOCSCRUB_CONFIG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_ENV_VAR).map_err(|_| ConfigError::MissingEnv(CONFIG_ENV_VAR))?;
        Self::from_path(Path::new(&path))
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(raw)?;
        let syslog = raw
            .docscrub
            .log_to_syslog
            .as_deref()
            .map(SyslogTarget::from_str)
            .transpose()?;
        Ok(Self {
            podman_uri: raw.docscrub.podman_uri,
            syslog,
            contact: raw.docscrub.contact,
            data_dir: raw
                .docscrub
                .data_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            max_concurrent_jobs: raw.docscrub.max_concurrent_jobs,
            plugins: raw.plugins.into_iter().collect(),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
