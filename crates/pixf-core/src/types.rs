//! Core data types for the pixf pipeline.
//!
//! Images flow through the pipeline by value: a `CanonicalImage` is created
//! once by the decode stage, moved into a `UniqueImageSet`, then moved into
//! exactly one `EncodeTask`. Nothing here is shared between workers.

use image::RgbaImage;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// BLAKE3 digest of a raw file's bytes, used as the deduplication key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint([u8; 32]);

impl ContentFingerprint {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 8 bytes are plenty to tell fingerprints apart in logs
        let hex = self.to_hex();
        write!(f, "ContentFingerprint({}…)", &hex[..16])
    }
}

/// A raw image file as produced by the extractor, read exactly once.
#[derive(Debug, Clone)]
pub struct RawImageFile {
    /// Where the bytes were read from
    pub path: PathBuf,
    /// File contents
    pub bytes: Vec<u8>,
}

impl RawImageFile {
    pub fn new(path: PathBuf, bytes: Vec<u8>) -> Self {
        Self { path, bytes }
    }

    /// Lowercased extension with its leading dot (".png"), if any.
    pub fn extension(&self) -> Option<String> {
        dotted_extension(&self.path)
    }
}

/// Lowercased extension of `path` including the leading dot.
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e.to_lowercase()))
}

/// A decoded image in the single canonical pixel format (8-bit straight RGBA).
#[derive(Debug, Clone)]
pub struct CanonicalImage {
    /// Decoded pixels
    pub pixels: RgbaImage,
    /// Fingerprint of the raw bytes this image was decoded from
    pub fingerprint: ContentFingerprint,
    /// Source file, kept for diagnostics
    pub source: PathBuf,
}

impl CanonicalImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// One unit of work for the worker pool.
///
/// The output index is bound here, before dispatch, so which file gets which
/// content never depends on worker scheduling.
#[derive(Debug)]
pub struct EncodeTask {
    /// Output number used for naming (1-based in re-encode mode)
    pub index: usize,
    /// The image, owned by this task
    pub image: CanonicalImage,
}

/// A file persisted by the writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    /// Index used to build the file name
    pub index: usize,
    /// Full path of the written file
    pub path: PathBuf,
    /// Number of bytes written
    pub bytes_written: u64,
}

/// Summary of one extraction run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    /// "original" or the encoder name
    pub mode: String,
    /// Directory the outputs were written to
    pub output_dir: PathBuf,
    /// Recognized raw image files found
    pub discovered: usize,
    /// Files skipped because their extension is not a recognized image type
    pub skipped_unrecognized: usize,
    /// Byte-identical duplicates dropped
    pub duplicates: usize,
    /// Files written, ordered by index
    pub written: Vec<OutputFile>,
    /// Wall-clock duration of the run
    pub elapsed_ms: u64,
}

impl ExtractionReport {
    /// Total bytes written across all outputs.
    pub fn total_bytes(&self) -> u64 {
        self.written.iter().map(|f| f.bytes_written).sum()
    }
}
