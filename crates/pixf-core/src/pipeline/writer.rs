//! Deterministic output naming and persistence.

use std::path::PathBuf;

use crate::error::{PipelineError, PipelineResult};
use crate::types::OutputFile;

/// Writes encoded images into one output directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    /// Create a writer targeting `dir`. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File name for an index: `image_<4-digit zero-padded index><extension>`.
    pub fn file_name(index: usize, extension: &str) -> String {
        format!("image_{:04}{}", index, extension)
    }

    /// Full output path for an index.
    pub fn path_for(&self, index: usize, extension: &str) -> PathBuf {
        self.dir.join(Self::file_name(index, extension))
    }

    /// Write `bytes` under the name for `index`, replacing any existing file.
    pub fn write(&self, index: usize, extension: &str, bytes: &[u8]) -> PipelineResult<OutputFile> {
        let path = self.path_for(index, extension);
        std::fs::write(&path, bytes).map_err(|e| PipelineError::Write {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tracing::trace!("Wrote {} bytes to {:?}", bytes.len(), path);

        Ok(OutputFile {
            index,
            path,
            bytes_written: bytes.len() as u64,
        })
    }
}
