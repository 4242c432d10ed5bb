//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                    | Default              |
//! |-----------------------------|----------------------|
//! | `BODEGA_HTTP_PORT`          | `8080`               |
//! | `BODEGA_DB_PATH`            | `./data/bodega.db`   |
//! | `BODEGA_DB_MAX_CONNECTIONS` | `5`                  |
//! | `BODEGA_STRICT_TOTALS`      | `false`              |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use bodega_db::{DbConfig, EngineSettings};

/// API server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Reject sales whose declared totals disagree with their lines
    pub strict_totals: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 8080,
            db_path: PathBuf::from("./data/bodega.db"),
            db_max_connections: 5,
            strict_totals: false,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            http_port: parse_or(&lookup, "BODEGA_HTTP_PORT", defaults.http_port)?,
            db_path: lookup("BODEGA_DB_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            db_max_connections: parse_or(
                &lookup,
                "BODEGA_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,
            strict_totals: parse_or(&lookup, "BODEGA_STRICT_TOTALS", defaults.strict_totals)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "BODEGA_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path).max_connections(self.db_max_connections)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            strict_totals: self.strict_totals,
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
