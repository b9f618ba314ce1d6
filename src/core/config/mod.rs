//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment (`CBLITE_LOG`, handled by the logging setup)
//! 4. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$CBLITE_CONFIG` if set
//! 2. `<config dir>/cblite/config.toml` (`$XDG_CONFIG_HOME` on Linux)
//! 3. `~/.cblite/config.toml`
//!
//! The file is only ever read. The tool persists nothing besides the
//! databases it is pointed at.
//!
//! # Example
//!
//! ```no_run
//! use cblite::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("color: {}", config.color());
//! println!("serve port: {}", config.serve_port());
//! ```

pub mod schema;

pub use schema::{FileConfig, LogConfig, ServeConfig, DEFAULT_SERVE_PORT};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CBLITE_CONFIG";

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Effective configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    file: FileConfig,
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed or
    /// validated. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Build a configuration from already-parsed values.
    pub fn from_file_config(file: FileConfig) -> Result<Self, ConfigError> {
        file.validate()?;
        Ok(Self { file, path: None })
    }

    fn locate() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }

        let candidates = [
            dirs::config_dir().map(|d| d.join("cblite").join("config.toml")),
            dirs::home_dir().map(|h| h.join(".cblite").join("config.toml")),
        ];
        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// Path of the loaded file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether output should be styled.
    pub fn color(&self) -> bool {
        self.file.color.unwrap_or(false)
    }

    /// Log filter directive from the file, if set.
    pub fn log_level(&self) -> Option<&str> {
        self.file.log.as_ref().and_then(|l| l.level.as_deref())
    }

    /// Default port for `serve`.
    pub fn serve_port(&self) -> u16 {
        self.file
            .serve
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVE_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let config = Config::default();
        assert!(!config.color());
        assert_eq!(config.log_level(), None);
        assert_eq!(config.serve_port(), DEFAULT_SERVE_PORT);
        assert!(config.path().is_none());
    }

    #[test]
    fn load_from_reads_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "color = true\n[log]\nlevel = \"info\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.color());
        assert_eq!(config.log_level(), Some("info"));
        assert_eq!(config.path(), Some(path.as_path()));
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "color = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn load_from_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = Config::load_from(&temp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
