//! Environment-driven node configuration.

use std::net::SocketAddr;

use thiserror::Error;

use crate::hasher::{Digest, UnknownDigest};

pub const HOST_VAR: &str = "ACCESS_LEDGER_HOST";
pub const PORT_VAR: &str = "ACCESS_LEDGER_PORT";
pub const DIGEST_VAR: &str = "ACCESS_LEDGER_DIGEST";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a port number, got '{value}'")]
    InvalidPort { var: &'static str, value: String },

    #[error("{0}")]
    InvalidDigest(#[from] UnknownDigest),

    #[error("invalid bind address '{0}'")]
    InvalidAddr(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub digest: Digest,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            digest: Digest::default(),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank values fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get(HOST_VAR) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = get(PORT_VAR) {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidPort {
                var: PORT_VAR,
                value: port,
            })?;
        }
        if let Some(digest) = get(DIGEST_VAR) {
            config.digest = digest.parse()?;
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddr(raw))
    }
}
