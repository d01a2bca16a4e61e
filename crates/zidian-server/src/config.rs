//! Server configuration
//!
//! Resolved from built-in defaults, then `ZIDIAN_*` environment variables,
//! then command-line flags (highest precedence).

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use zidian_core::storage::DB_FILE_NAME;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3928;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {var} value {value:?}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("Cannot resolve listen address {0}")]
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory holding the database; platform data dir when `None`
    pub data_dir: Option<PathBuf>,
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with `ZIDIAN_DATA_DIR`, `ZIDIAN_HOST` and `ZIDIAN_PORT`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get("ZIDIAN_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(host) = get("ZIDIAN_HOST") {
            config.host = host;
        }
        if let Some(port) = get("ZIDIAN_PORT") {
            config.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    var: "ZIDIAN_PORT",
                    value: port.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(config)
    }

    /// Apply command-line overrides; `None` keeps the current value
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        host: Option<String>,
        port: Option<u16>,
    ) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = Some(dir);
        }
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Database file, or `None` for the storage default location
    pub fn db_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(DB_FILE_NAME))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let display = format!("{}:{}", self.host, self.port);
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|_| ConfigError::Address(display.clone()))?
            .next()
            .ok_or(ConfigError::Address(display))
    }
}
