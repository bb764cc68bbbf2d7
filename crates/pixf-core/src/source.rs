//! Sources of raw images.
//!
//! A source populates a scratch directory with raw image files; the pipeline
//! never looks at how. Document-specific extractors plug in here.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Produces raw image files for the pipeline.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Populate `target` with zero or more raw image files taken from `source`.
    async fn extract(&self, source: &Path, target: &Path) -> PipelineResult<()>;
}

/// Uses already-extracted images: a directory of raw files, or one file.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectorySource;

#[async_trait]
impl ImageSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn extract(&self, source: &Path, target: &Path) -> PipelineResult<()> {
        let extraction_error = |message: String| PipelineError::Extraction {
            path: source.to_path_buf(),
            message,
        };

        let meta = tokio::fs::metadata(source)
            .await
            .map_err(|e| extraction_error(e.to_string()))?;

        if meta.is_file() {
            let name = source
                .file_name()
                .ok_or_else(|| extraction_error("source has no file name".to_string()))?;
            tokio::fs::copy(source, target.join(name))
                .await
                .map_err(|e| extraction_error(e.to_string()))?;
            return Ok(());
        }

        let mut entries = tokio::fs::read_dir(source)
            .await
            .map_err(|e| extraction_error(e.to_string()))?;
        let mut copied = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| extraction_error(e.to_string()))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| extraction_error(e.to_string()))?;
            if !file_type.is_file() {
                continue;
            }
            tokio::fs::copy(entry.path(), target.join(entry.file_name()))
                .await
                .map_err(|e| extraction_error(format!("{:?}: {}", entry.path(), e)))?;
            copied += 1;
        }

        tracing::debug!("Staged {} file(s) from {:?}", copied, source);
        Ok(())
    }
}
