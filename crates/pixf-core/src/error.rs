//! Error types for the pixf extraction pipeline.
//!
//! Errors are organized by stage so every message carries the context needed
//! to act on it (file paths, format names, output indices).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pixf operations.
#[derive(Error, Debug)]
pub enum PixfError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
///
/// Every variant is fatal to the batch. None of them are retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The output directory could not be created
    #[error("Cannot create directory {path}: {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    /// The external image extractor failed
    #[error("Extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    /// A raw image file (or the directory holding it) could not be read
    #[error("Read error for {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Bytes of a recognized format could not be decoded
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Decoding did not finish in time
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// The requested output format has no registered encoder
    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    /// An encoder failed to serialize an image
    #[error("Encode error for image {index} ({format}): {message}")]
    Encode {
        index: usize,
        format: String,
        message: String,
    },

    /// Encoded bytes could not be persisted
    #[error("Write error for {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// A worker task aborted before reporting a result
    #[error("Worker aborted: {0}")]
    WorkerPanicked(String),
}

/// Convenience type alias for pixf results.
pub type Result<T> = std::result::Result<T, PixfError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
