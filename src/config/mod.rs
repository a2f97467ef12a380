//! Configuration loading and validation.

pub mod logging;
pub mod settings;

pub use logging::LoggingConfig;
pub use settings::{AdminConfig, Config, DatabaseConfig, ServerConfig, SessionConfig};
