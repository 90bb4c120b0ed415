// In: src/config.rs

//! Library-level configuration.
//!
//! A `LibraryConfig` is read once at the application boundary (a JSON file or
//! string) and applied when a `Context` is built: it selects the backend and
//! device and sets up logging.

use crate::context::Backend;
use crate::error::KhivaError;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

//==================================================================================
// I. Logging
//==================================================================================

/// Verbosity of the installed logger.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,

    /// Append log lines to this file instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Install the logger when the context is built.
    #[serde(default)]
    pub enabled: bool,
}

impl LogConfig {
    /// Trace level, which includes one line per native call.
    pub fn verbose(file: Option<PathBuf>) -> Self {
        Self {
            level: LogLevel::Trace,
            file,
            enabled: true,
        }
    }
}

//==================================================================================
// II. The Unified LibraryConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LibraryConfig {
    /// The compute backend to select. `default` keeps whatever the native
    /// library picked on load.
    #[serde(default)]
    pub backend: Backend,

    /// Device index on the selected backend.
    #[serde(default = "default_device")]
    pub device: i32,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_device() -> i32 {
    0
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            device: default_device(),
            log: LogConfig::default(),
        }
    }
}

impl LibraryConfig {
    pub fn from_json_str(json: &str) -> Result<Self, KhivaError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, KhivaError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), KhivaError> {
        if self.device < 0 {
            return Err(KhivaError::Config(format!(
                "device index must be non-negative, got {}",
                self.device
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = LibraryConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LibraryConfig::default());
        assert_eq!(config.backend, Backend::Default);
        assert_eq!(config.log.level, LogLevel::Warn);
    }

    #[test]
    fn fields_parse_in_snake_case() {
        let config = LibraryConfig::from_json_str(
            r#"{"backend": "cpu", "device": 0, "log": {"level": "trace", "enabled": true}}"#,
        )
        .unwrap();
        assert_eq!(config.backend, Backend::Cpu);
        assert_eq!(config.log.level, LogLevel::Trace);
        assert!(config.log.enabled);
        assert_eq!(LevelFilter::from(config.log.level), LevelFilter::Trace);
    }

    #[test]
    fn verbose_logging_reaches_native_call_traces() {
        let config = LogConfig::verbose(None);
        assert!(config.enabled);
        assert!(LevelFilter::from(config.level) >= log::Level::Trace);
    }

    #[test]
    fn negative_device_is_rejected() {
        let result = LibraryConfig::from_json_str(r#"{"device": -1}"#);
        assert!(matches!(result, Err(KhivaError::Config(_))));
    }

    #[test]
    fn malformed_json_surfaces_serde_error() {
        let result = LibraryConfig::from_json_str(r#"{"backend": "quantum"}"#);
        assert!(matches!(result, Err(KhivaError::SerdeJson(_))));
    }

    #[test]
    fn reads_from_file() {
        let path = std::env::temp_dir().join(format!("khiva-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"backend": "opencl", "device": 1}"#).unwrap();
        let config = LibraryConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.backend, Backend::OpenCl);
        assert_eq!(config.device, 1);
    }
}
