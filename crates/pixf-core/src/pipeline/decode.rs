//! Image decoding into the canonical RGBA representation.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::{CanonicalImage, RawImageFile};

use super::hash::Hasher;

/// Decodes raw image files and fingerprints them in the same pass.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode a raw file with a deadline, off the async executor.
    ///
    /// The raw bytes are hashed and decoded from the same buffer and dropped
    /// once the canonical image exists.
    pub async fn decode(&self, raw: RawImageFile) -> Result<CanonicalImage, PipelineError> {
        let path = raw.path.clone();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_sync(raw)).await
        })
        .await;

        match decode_result {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Decode {
                path,
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path,
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous fingerprint + decode + canonicalize.
    pub fn decode_sync(raw: RawImageFile) -> Result<CanonicalImage, PipelineError> {
        let RawImageFile { path, bytes } = raw;
        let fingerprint = Hasher::fingerprint(&bytes);
        let image = Self::decode_bytes(&bytes, &path)?;

        Ok(CanonicalImage {
            pixels: image.into_rgba8(),
            fingerprint,
            source: path,
        })
    }

    /// Decode bytes, detecting the format from content first and falling
    /// back to the file extension.
    fn decode_bytes(bytes: &[u8], path: &Path) -> Result<DynamicImage, PipelineError> {
        let mut reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;

        if reader.format().is_none() {
            let format = ImageFormat::from_path(path).map_err(|_| PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image data".to_string(),
            })?;
            reader.set_format(format);
        }

        reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::path::PathBuf;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_rgb_png_to_rgba() {
        let rgb = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        let bytes = encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Png);
        let raw = RawImageFile::new(PathBuf::from("x.png"), bytes.clone());

        let canonical = ImageDecoder::decode_sync(raw).unwrap();
        assert_eq!(canonical.width(), 3);
        assert_eq!(canonical.height(), 2);
        assert_eq!(canonical.pixels.get_pixel(1, 1), &Rgba([10, 20, 30, 255]));
        assert_eq!(canonical.fingerprint, Hasher::fingerprint(&bytes));
    }

    #[test]
    fn test_decode_preserves_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 77]));
        let bytes = encode(DynamicImage::ImageRgba8(rgba.clone()), ImageFormat::Png);
        let raw = RawImageFile::new(PathBuf::from("alpha.png"), bytes);

        let canonical = ImageDecoder::decode_sync(raw).unwrap();
        assert_eq!(canonical.pixels, rgba);
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes under a .jpg name still decode
        let rgb = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let bytes = encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Png);
        let raw = RawImageFile::new(PathBuf::from("misnamed.jpg"), bytes);
        assert!(ImageDecoder::decode_sync(raw).is_ok());
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let raw = RawImageFile::new(PathBuf::from("broken.png"), b"not an image".to_vec());
        let err = ImageDecoder::decode_sync(raw).unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_async_decode() {
        let rgb = RgbImage::from_pixel(5, 5, Rgb([9, 9, 9]));
        let bytes = encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Bmp);
        let raw = RawImageFile::new(PathBuf::from("x.bmp"), bytes);

        let decoder = ImageDecoder::new(LimitsConfig::default());
        let canonical = decoder.decode(raw).await.unwrap();
        assert_eq!(canonical.width(), 5);
    }
}
