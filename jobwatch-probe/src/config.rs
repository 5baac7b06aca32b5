//! Probe configuration
//!
//! Optional TOML file supplying defaults; command-line values win. The
//! resolved `Settings` carries everything the run needs.

use crate::cli::Cli;
use jobwatch_core::CheckSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 1433;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub thresholds: ThresholdsConfig,
    pub connection: ConnectionConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdsConfig {
    pub warning: u32,
    pub critical: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    pub port: u16,
    pub login_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub trust_cert: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub dir: Option<PathBuf>,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            warning: 0,
            critical: 1,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            login_timeout_secs: DEFAULT_TIMEOUT_SECS,
            query_timeout_secs: DEFAULT_TIMEOUT_SECS,
            trust_cert: false,
        }
    }
}

impl ProbeConfig {
    /// Loads `explicit`, or the default file if it exists. An explicit path
    /// must exist; a missing default file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigFileError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::config_file_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigFileError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigFileError::Parse { path, source })
    }

    /// `<config dir>/jobwatch/config.toml`
    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jobwatch").join("config.toml"))
    }

    /// `<data dir>/jobwatch/history`, falling back to the temp dir.
    pub fn default_history_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("jobwatch")
            .join("history")
    }
}

/// Connection parameters for the data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub login_timeout: Duration,
    pub query_timeout: Duration,
    pub trust_cert: bool,
}

impl ConnectionSettings {
    /// Identifier of the monitored server; the port only shows when non-default.
    pub fn host_key(&self) -> String {
        if self.port == DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Everything one invocation needs, command line merged over file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub check: CheckSettings,
    pub list_jobs: bool,
    pub history_dir: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(cli: Cli, file: ProbeConfig) -> Self {
        let connection = ConnectionSettings {
            host: cli.host,
            port: cli.port.unwrap_or(file.connection.port),
            user: cli.user,
            password: cli.password,
            login_timeout: Duration::from_secs(
                cli.login_timeout.unwrap_or(file.connection.login_timeout_secs),
            ),
            query_timeout: Duration::from_secs(
                cli.query_timeout.unwrap_or(file.connection.query_timeout_secs),
            ),
            trust_cert: cli.trust_cert || file.connection.trust_cert,
        };

        let check = CheckSettings {
            host_key: connection.host_key(),
            warning: cli.warning.unwrap_or(file.thresholds.warning),
            critical: cli.critical.unwrap_or(file.thresholds.critical),
            include: cli.job,
            exclude: cli.exclude,
        };

        let history_dir = if cli.history || cli.history_dir.is_some() || file.history.enabled {
            Some(
                cli.history_dir
                    .or(file.history.dir)
                    .unwrap_or_else(ProbeConfig::default_history_dir),
            )
        } else {
            None
        };

        Self {
            connection,
            check,
            list_jobs: cli.list,
            history_dir,
        }
    }
}
