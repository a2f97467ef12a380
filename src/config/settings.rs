//! Application configuration loading and validation.
//!
//! Configuration is read from a TOML file. Every section is optional and
//! falls back to defaults that run a local server against `roster.db`.
//! Two environment variables override the file:
//!
//! - `ROSTER_DATABASE_URL` replaces `[database] url`
//! - `ROSTER_ADMIN_PASSWORD` replaces `[admin] password`
//!
//! # Example
//!
//! ```
//! use roster::config::Config;
//!
//! let config = Config::parse_toml(
//!     r#"
//!     [server]
//!     port = 9000
//!
//!     [session]
//!     lifetime_secs = 600
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.server.port, 9000);
//! assert_eq!(config.session.lifetime_secs, 600);
//! ```

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::error::{ConfigError, Result};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "roster.toml";

const DATABASE_URL_ENV: &str = "ROSTER_DATABASE_URL";
const ADMIN_PASSWORD_ENV: &str = "ROSTER_ADMIN_PASSWORD";

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
        }
    }
}

/// SQLite database settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// File path, or `:memory:` for a throwaway database.
    pub url: String,
    /// Upper bound on pooled connections. In-memory databases always use one.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "roster.db".into(),
            pool_size: 4,
        }
    }
}

/// Login session settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Absolute session lifetime. Activity does not extend it.
    pub lifetime_secs: u64,
    /// Reject a session presented from a different IP / user agent.
    pub bind_fingerprint: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_secs: 30,
            bind_fingerprint: true,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.lifetime_secs).unwrap_or(i64::MAX))
    }
}

/// Administrator created at startup when both fields are present.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl AdminConfig {
    /// Username and password, if both are configured and non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or fails
    /// validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if given, else [`DEFAULT_CONFIG_PATH`] if it exists, else
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file was found but could not be loaded.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            return Self::load(fallback);
        }
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            self.database.url = url;
        }
        if let Ok(password) = std::env::var(ADMIN_PASSWORD_ENV) {
            self.admin.password = Some(password);
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "server.host",
            }
            .into());
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.url",
            }
            .into());
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.pool_size",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.session.lifetime_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.lifetime_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.admin.username.is_some() != self.admin.password.is_some() {
            return Err(ConfigError::InvalidValue {
                field: "admin",
                reason: "username and password must be set together".to_string(),
            }
            .into());
        }
        if !self.logging.is_known_format() {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected \"json\" or \"pretty\", got {:?}", self.logging.format),
            }
            .into());
        }
        Ok(())
    }

    /// Socket address the HTTP server binds to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if host and port do not form an
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidValue {
                    field: "server.host",
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
