//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Name of the environment variable that overrides the worker count.
pub const WORKERS_ENV: &str = "PIXF_WORKERS";

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of concurrent encode workers
    pub workers: usize,

    /// Maximum number of scratch buffers kept for reuse between encodes
    pub buffer_pool_size: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            buffer_pool_size: 8,
        }
    }
}

impl ProcessingConfig {
    /// Resolve the effective worker count from an environment value.
    ///
    /// Only a positive integer replaces the configured count; anything else
    /// (absent, empty, zero, negative, garbage) leaves it untouched.
    pub fn workers_with_env(&self, env_value: Option<&str>) -> usize {
        env_value
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(self.workers)
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            decode_timeout_ms: 5000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "original" keeps source bytes, otherwise an encoder name
    pub format: String,

    /// Prefix for the default output directory name
    pub dir_prefix: String,

    /// Base directory under which default output directories are created
    pub root: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "original".to_string(),
            dir_prefix: "images_".to_string(),
            root: ".".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
