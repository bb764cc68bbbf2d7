//! Configuration management for pixf.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial (or absent)
//! file is always valid.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for pixf.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/dev.pixf.pixf/config.toml
    /// - Linux: ~/.config/pixf/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\pixf\config\config.toml
    ///
    /// Falls back to ~/.pixf/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "pixf", "pixf")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".pixf").join("config.toml")
            })
    }

    /// Apply the `PIXF_WORKERS` environment override to the worker count.
    pub fn apply_env(&mut self) {
        let value = std::env::var(WORKERS_ENV).ok();
        let workers = self.processing.workers_with_env(value.as_deref());
        if workers != self.processing.workers {
            tracing::debug!("{} overrides worker count: {}", WORKERS_ENV, workers);
        }
        self.processing.workers = workers;
    }

    /// Get the resolved output root (with ~ expansion).
    pub fn output_root(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.output.root);
        PathBuf::from(expanded.into_owned())
    }

    /// Default output directory for a given input: `<root>/<prefix><stem>`.
    pub fn default_output_dir(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        self.output_root()
            .join(format!("{}{}", self.output.dir_prefix, stem))
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.workers, 4);
        assert_eq!(config.output.format, "original");
        assert_eq!(config.limits.decode_timeout_ms, 5000);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("[output]"));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[processing]\nworkers = 2\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.processing.workers, 2);
        assert_eq!(config.processing.buffer_pool_size, 8);
        assert_eq!(config.output.dir_prefix, "images_");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[processing]\nworkers = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_default_output_dir_uses_stem() {
        let mut config = Config::default();
        config.output.root = "/tmp/out".to_string();
        let dir = config.default_output_dir(Path::new("/docs/report.pdf"));
        assert_eq!(dir, PathBuf::from("/tmp/out/images_report"));
    }
}
