//! Server configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Signing secret used when none is configured
pub const DEV_JWT_SECRET: &str = "agora-dev-secret-change-in-production";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid bind address `{0}`")]
    InvalidBind(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Allow any origin
    pub cors_permissive: bool,
    /// Request body limit, multipart included
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".into(),
            jwt_secret: DEV_JWT_SECRET.into(),
            log_filter: "info".into(),
            cors_permissive: true,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file; defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&content)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|_| ConfigError::InvalidBind(self.bind.clone()))
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ServerConfig::from_toml("bind = \"127.0.0.1:9000\"\ncors_permissive = false\n").unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 9000);
        assert!(!config.cors_permissive);
        assert_eq!(config.log_filter, "info");
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_bad_bind() {
        let config = ServerConfig {
            bind: "localhost".into(),
            ..Default::default()
        };
        assert!(matches!(config.socket_addr(), Err(ConfigError::InvalidBind(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = ServerConfig::load(Some(Path::new("/nonexistent/agora.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
