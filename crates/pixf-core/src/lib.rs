//! pixf core - extract, deduplicate and re-encode document images.
//!
//! A batch takes the raw images an extractor pulled out of a document,
//! drops byte-identical duplicates and writes the unique set to an output
//! directory, either verbatim or re-encoded into one format.
//!
//! # Architecture
//!
//! ```text
//! Source → Read once → Fingerprint + Decode (RGBA) → Dedup → Worker pool (Encode → Write)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixf_core::{Config, DirectorySource, Pixf};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> pixf_core::Result<()> {
//!     let pixf = Pixf::new(Config::load()?);
//!
//!     let report = pixf
//!         .extract_images(&DirectorySource, Path::new("./raw"), Path::new("./images"), "webp")
//!         .await?;
//!     println!("wrote {} image(s)", report.written.len());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, PixfError, Result};
pub use pipeline::{BatchProcessor, EncoderRegistry, FormatEncoder, OutputMode};
pub use source::{DirectorySource, ImageSource};
pub use types::{CanonicalImage, ContentFingerprint, ExtractionReport, OutputFile};

use std::path::Path;
use std::time::Instant;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// pixf batch runner - the main entry point.
pub struct Pixf {
    config: Config,
    registry: EncoderRegistry,
}

impl Pixf {
    /// Create a runner with the built-in encoders.
    ///
    /// `PIXF_WORKERS` overrides the configured worker count when it holds a
    /// positive integer.
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, EncoderRegistry::default())
    }

    /// Create a runner with a custom encoder registry.
    pub fn with_registry(mut config: Config, registry: EncoderRegistry) -> Self {
        tracing::debug!("Initializing pixf v{}", VERSION);
        config.apply_env();
        Self { config, registry }
    }

    /// Force the worker count, taking precedence over the environment.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.processing.workers = workers.max(1);
        self
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the encoder registry.
    pub fn registry(&self) -> &EncoderRegistry {
        &self.registry
    }

    /// Extract images from `source_path` with `source` and write the unique
    /// set into `img_dir`.
    ///
    /// The format is resolved before anything touches the filesystem. Raw
    /// images are staged in a private temporary directory that is removed on
    /// every exit path.
    pub async fn extract_images(
        &self,
        source: &dyn ImageSource,
        source_path: &Path,
        img_dir: &Path,
        format: &str,
    ) -> Result<ExtractionReport> {
        let start = Instant::now();
        let mode = self.registry.resolve(format)?;
        create_output_dir(img_dir).await?;

        let staging = tempfile::Builder::new()
            .prefix("pixf")
            .tempdir()
            .map_err(|e| PipelineError::DirectoryCreate {
                path: std::env::temp_dir(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            "Extracting {:?} via {} into {:?}",
            source_path,
            source.name(),
            staging.path()
        );
        source.extract(source_path, staging.path()).await?;

        let processor = BatchProcessor::new(&self.config);
        let mut report = processor
            .process_dir(staging.path(), img_dir, &mode)
            .await?;
        report.elapsed_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Process a directory that already holds raw image files.
    pub async fn process_raw_dir(
        &self,
        raw_dir: &Path,
        img_dir: &Path,
        format: &str,
    ) -> Result<ExtractionReport> {
        let mode = self.registry.resolve(format)?;
        create_output_dir(img_dir).await?;

        let processor = BatchProcessor::new(&self.config);
        Ok(processor.process_dir(raw_dir, img_dir, &mode).await?)
    }
}

async fn create_output_dir(dir: &Path) -> PipelineResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PipelineError::DirectoryCreate {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })
}
