//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Values are validated after parsing: the log level must be a known level
//! and the serve port must be non-zero.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default TCP port for `serve`.
pub const DEFAULT_SERVE_PORT: u16 = 59840;

/// Log levels accepted in `[log] level`.
const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// User configuration.
///
/// # Example
///
/// ```toml
/// color = true
///
/// [log]
/// level = "info"
///
/// [serve]
/// port = 4984
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Style output with bold/italic text
    pub color: Option<bool>,

    /// Logging settings
    pub log: Option<LogConfig>,

    /// `serve` defaults
    pub serve: Option<ServeConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = self.log.as_ref().and_then(|l| l.level.as_deref()) {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid log level '{}', must be one of: {}",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }

        if let Some(ServeConfig { port: Some(0) }) = self.serve {
            return Err(ConfigError::InvalidValue(
                "serve.port must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Filter directive used when `CBLITE_LOG` is unset
    pub level: Option<String>,
}

/// `[serve]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// TCP port to listen on
    pub port: Option<u16>,
}
