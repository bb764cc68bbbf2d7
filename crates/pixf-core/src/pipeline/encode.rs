//! Output encoders and the name → encoder registry.
//!
//! The pipeline only ever sees `Arc<dyn FormatEncoder>`. Adding a format means
//! implementing the trait and registering it; nothing downstream changes.

use std::collections::HashMap;
use std::sync::Arc;

use image::codecs::png::{CompressionType, FilterType, PngEncoder as PngCodec};
use image::codecs::webp::WebPEncoder as WebpCodec;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::error::{PipelineError, PipelineResult};

/// Format name that keeps source bytes instead of re-encoding.
pub const ORIGINAL_FORMAT: &str = "original";

/// Serializes canonical RGBA images into one output format.
pub trait FormatEncoder: Send + Sync {
    /// Lowercase registry name ("png", "webp").
    fn name(&self) -> &'static str;

    /// File extension including the leading dot.
    fn extension(&self) -> &'static str;

    /// Append the encoded form of `image` to `out`.
    fn encode(&self, image: &RgbaImage, out: &mut Vec<u8>) -> Result<(), image::ImageError>;
}

/// PNG without compression effort: fastest encode, largest files.
pub struct PngEncoder;

impl FormatEncoder for PngEncoder {
    fn name(&self) -> &'static str {
        "png"
    }

    fn extension(&self) -> &'static str {
        ".png"
    }

    fn encode(&self, image: &RgbaImage, out: &mut Vec<u8>) -> Result<(), image::ImageError> {
        let codec =
            PngCodec::new_with_quality(out, CompressionType::Uncompressed, FilterType::NoFilter);
        codec.write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
    }
}

/// Lossless WebP at maximum quality.
pub struct WebpEncoder;

impl FormatEncoder for WebpEncoder {
    fn name(&self) -> &'static str {
        "webp"
    }

    fn extension(&self) -> &'static str {
        ".webp"
    }

    fn encode(&self, image: &RgbaImage, out: &mut Vec<u8>) -> Result<(), image::ImageError> {
        let codec = WebpCodec::new_lossless(out);
        codec.write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
    }
}

/// How a batch produces its output files.
#[derive(Clone)]
pub enum OutputMode {
    /// Copy the first occurrence of each raw file byte-for-byte
    Original,
    /// Decode, canonicalize and re-encode with the given encoder
    Reencode(Arc<dyn FormatEncoder>),
}

impl OutputMode {
    /// Name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            OutputMode::Original => ORIGINAL_FORMAT,
            OutputMode::Reencode(encoder) => encoder.name(),
        }
    }
}

impl std::fmt::Debug for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Original => write!(f, "Original"),
            OutputMode::Reencode(encoder) => write!(f, "Reencode({})", encoder.name()),
        }
    }
}

/// Lookup table from lowercase format name to encoder.
pub struct EncoderRegistry {
    encoders: HashMap<String, Arc<dyn FormatEncoder>>,
}

impl Default for EncoderRegistry {
    /// Registry with the built-in PNG and WebP encoders.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(PngEncoder));
        registry.register(Arc::new(WebpEncoder));
        registry
    }
}

impl EncoderRegistry {
    /// A registry with no encoders.
    pub fn empty() -> Self {
        Self {
            encoders: HashMap::new(),
        }
    }

    /// Register an encoder under its own name, replacing any previous one.
    pub fn register(&mut self, encoder: Arc<dyn FormatEncoder>) {
        self.encoders
            .insert(encoder.name().to_lowercase(), encoder);
    }

    /// Look up an encoder by name (case-insensitive).
    pub fn get(&self, format: &str) -> PipelineResult<Arc<dyn FormatEncoder>> {
        let format = format.to_lowercase();
        self.encoders
            .get(&format)
            .cloned()
            .ok_or(PipelineError::UnsupportedFormat { format })
    }

    /// Resolve a requested format into an output mode.
    ///
    /// An empty name or "original" selects byte-for-byte copying.
    pub fn resolve(&self, format: &str) -> PipelineResult<OutputMode> {
        let trimmed = format.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ORIGINAL_FORMAT) {
            return Ok(OutputMode::Original);
        }
        self.get(trimmed).map(OutputMode::Reencode)
    }

    /// Registered format names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.encoders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
