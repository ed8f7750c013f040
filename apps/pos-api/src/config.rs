//! # Server Configuration
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable              | Default                          |
//! |-----------------------|----------------------------------|
//! | `POS_HOST`            | `0.0.0.0`                        |
//! | `POS_PORT`            | `8080`                           |
//! | `POS_DATABASE_PATH`   | `<platform data dir>/pos.db`     |
//! | `POS_MAX_CONNECTIONS` | `5`                              |
//! | `POS_TOKEN_SECRET`    | development secret (logged)      |
//!
//! Store presentation settings (currency symbol, receipt header...) are not
//! configured here; they live in the `settings` table.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use directories::ProjectDirs;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::warn;

/// Used only when `POS_TOKEN_SECRET` is unset. Tokens issued with it are
/// readable by anyone holding the source.
const DEV_TOKEN_SECRET: &str = "mall-pos-development-token-secret-do-not-ship";

/// Minimum token secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Server configuration.
#[derive(Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub max_connections: u32,
    /// Key material for the id token codec.
    pub token_secret: SecretString,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("POS_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("POS_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("POS_PORT".to_string()))?,
            None => 8080,
        };

        let database_path = lookup("POS_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let max_connections = match lookup("POS_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidValue("POS_MAX_CONNECTIONS".to_string())),
            },
            None => 5,
        };

        let token_secret = match lookup("POS_TOKEN_SECRET") {
            Some(secret) => secret,
            None => {
                warn!("POS_TOKEN_SECRET not set, using the development secret");
                DEV_TOKEN_SECRET.to_string()
            }
        };

        if token_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                min: MIN_SECRET_LEN,
            });
        }

        let config = ServerConfig {
            host,
            port,
            database_path,
            max_connections,
            token_secret: SecretString::from(token_secret),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue("POS_HOST".to_string()));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("POS_DATABASE_PATH".to_string()));
        }
        Ok(())
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("POS_HOST".to_string()))
    }

    pub fn token_secret(&self) -> &str {
        self.token_secret.expose_secret()
    }
}

fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "MallPos", "pos")
        .map(|dirs| dirs.data_dir().join("pos.db"))
        .unwrap_or_else(|| PathBuf::from("./pos.db"))
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("POS_TOKEN_SECRET must be at least {min} bytes")]
    SecretTooShort { min: usize },
}
