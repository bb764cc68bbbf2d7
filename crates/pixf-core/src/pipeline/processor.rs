//! Batch orchestration: picks the strategy for the output mode and wires the
//! stages together.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{CanonicalImage, ExtractionReport, OutputFile, RawImageFile};

use super::buffer::BufferPool;
use super::decode::ImageDecoder;
use super::dedup::Deduplicator;
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::encode::{FormatEncoder, OutputMode};
use super::hash::Hasher;
use super::worker::WorkerPool;
use super::writer::OutputWriter;

/// Extension used when a kept original has none. Unreachable while
/// discovery requires a recognized extension.
const FALLBACK_EXTENSION: &str = ".png";

/// Runs one directory of raw images through the pipeline.
pub struct BatchProcessor {
    workers: usize,
    decoder: ImageDecoder,
    buffers: Arc<BufferPool>,
}

impl BatchProcessor {
    /// Create a processor from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            workers: config.processing.workers,
            decoder: ImageDecoder::new(config.limits.clone()),
            buffers: Arc::new(BufferPool::new(config.processing.buffer_pool_size)),
        }
    }

    /// Process every recognized file in `raw_dir` into `out_dir`.
    ///
    /// `out_dir` must already exist.
    pub async fn process_dir(
        &self,
        raw_dir: &Path,
        out_dir: &Path,
        mode: &OutputMode,
    ) -> PipelineResult<ExtractionReport> {
        let start = Instant::now();
        let discovery = FileDiscovery::discover(raw_dir)?;
        tracing::debug!(
            "Found {} raw image(s) in {:?} ({} unrecognized skipped)",
            discovery.files.len(),
            raw_dir,
            discovery.skipped
        );

        let writer = OutputWriter::new(out_dir);
        let (written, duplicates) = match mode {
            OutputMode::Original => self.copy_originals(&discovery.files, &writer).await?,
            OutputMode::Reencode(encoder) => {
                self.reencode(&discovery.files, &writer, encoder.clone())
                    .await?
            }
        };

        if duplicates > 0 {
            tracing::info!("skipped {} duplicate image(s)", duplicates);
        }

        Ok(ExtractionReport {
            mode: mode.name().to_string(),
            output_dir: out_dir.to_path_buf(),
            discovered: discovery.files.len(),
            skipped_unrecognized: discovery.skipped,
            duplicates,
            written,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Sequential byte-dedup: keep the first copy of each file verbatim.
    ///
    /// Output indices count kept files from 0, so discarded duplicates leave
    /// no gaps.
    async fn copy_originals(
        &self,
        files: &[DiscoveredFile],
        writer: &OutputWriter,
    ) -> PipelineResult<(Vec<OutputFile>, usize)> {
        let mut dedup = Deduplicator::new();
        let mut written = Vec::new();

        for file in files {
            let raw = read_raw(&file.path).await?;
            if !dedup.admit(Hasher::fingerprint(&raw.bytes)) {
                tracing::debug!("Duplicate content: {:?}", raw.path);
                continue;
            }

            let extension = raw
                .extension()
                .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
            let index = written.len();
            let writer = writer.clone();
            let file = tokio::task::spawn_blocking(move || {
                writer.write(index, &extension, &raw.bytes)
            })
            .await
            .map_err(|e| PipelineError::WorkerPanicked(format!("image {}: {}", index, e)))??;
            written.push(file);
        }

        Ok((written, dedup.duplicates()))
    }

    /// Load-then-dedup: decode everything, keep unique images, encode them
    /// concurrently.
    async fn reencode(
        &self,
        files: &[DiscoveredFile],
        writer: &OutputWriter,
        encoder: Arc<dyn FormatEncoder>,
    ) -> PipelineResult<(Vec<OutputFile>, usize)> {
        let images = self.load_images(files).await?;
        if images.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let unique = Deduplicator::dedup_images(images);
        let duplicates = unique.duplicates();
        tracing::debug!(
            "Encoding {} unique image(s) as {} with {} worker(s)",
            unique.len(),
            encoder.name(),
            self.workers
        );

        let pool = WorkerPool::new(self.workers, encoder, self.buffers.clone(), writer.clone());
        let written = pool.run(unique.into_tasks()).await.into_result()?;
        Ok((written, duplicates))
    }

    /// Read and decode each file once, in discovery order.
    async fn load_images(&self, files: &[DiscoveredFile]) -> PipelineResult<Vec<CanonicalImage>> {
        let mut images = Vec::with_capacity(files.len());
        for file in files {
            let raw = read_raw(&file.path).await?;
            let decode_start = Instant::now();
            let image = self.decoder.decode(raw).await?;
            tracing::trace!(
                "Decoded {:?} ({}x{}) in {:?}",
                image.source,
                image.width(),
                image.height(),
                decode_start.elapsed()
            );
            images.push(image);
        }
        Ok(images)
    }
}

async fn read_raw(path: &Path) -> PipelineResult<RawImageFile> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| PipelineError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(RawImageFile::new(path.to_path_buf(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::EncoderRegistry;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(seed: u8) -> Vec<u8> {
        let img = RgbImage::from_fn(4, 3, |x, y| Rgb([seed, x as u8, y as u8]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn processor(workers: usize) -> BatchProcessor {
        let mut config = Config::default();
        config.processing.workers = workers;
        BatchProcessor::new(&config)
    }

    #[tokio::test]
    async fn test_original_mode_counter_skips_duplicates() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(raw.path().join("a.png"), png_bytes(1)).unwrap();
        std::fs::write(raw.path().join("b.PNG"), png_bytes(1)).unwrap();
        std::fs::write(raw.path().join("c.jpg"), b"not really a jpeg").unwrap();

        let report = processor(4)
            .process_dir(raw.path(), out.path(), &OutputMode::Original)
            .await
            .unwrap();

        assert_eq!(report.duplicates, 1);
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.written[0].path, out.path().join("image_0000.png"));
        assert_eq!(report.written[1].path, out.path().join("image_0001.jpg"));
        // Originals are copied verbatim, never decoded
        assert_eq!(
            std::fs::read(out.path().join("image_0001.jpg")).unwrap(),
            b"not really a jpeg"
        );
    }

    #[tokio::test]
    async fn test_reencode_mode_is_one_based() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(raw.path().join("1.png"), png_bytes(9)).unwrap();
        std::fs::write(raw.path().join("2.png"), png_bytes(9)).unwrap();
        std::fs::write(raw.path().join("3.png"), png_bytes(8)).unwrap();

        let mode = EncoderRegistry::default().resolve("png").unwrap();
        let report = processor(2)
            .process_dir(raw.path(), out.path(), &mode)
            .await
            .unwrap();

        assert_eq!(report.mode, "png");
        assert_eq!(report.duplicates, 1);
        let names: Vec<_> = report
            .written
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["image_0001.png", "image_0002.png"]);
    }

    #[tokio::test]
    async fn test_reencode_decode_failure_is_fatal() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(raw.path().join("good.png"), png_bytes(1)).unwrap();
        std::fs::write(raw.path().join("z_bad.png"), b"garbage").unwrap();

        let mode = EncoderRegistry::default().resolve("png").unwrap();
        let err = processor(2)
            .process_dir(raw.path(), out.path(), &mode)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Decode { .. }));
        // Decoding happens before any encode starts
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_original_mode_write_failure() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let missing = out.path().join("not-created");
        std::fs::write(raw.path().join("a.png"), png_bytes(1)).unwrap();

        let err = processor(1)
            .process_dir(raw.path(), &missing, &OutputMode::Original)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Write { .. }));
    }

    #[tokio::test]
    async fn test_empty_dir_succeeds() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let mode = EncoderRegistry::default().resolve("webp").unwrap();
        let report = processor(4)
            .process_dir(raw.path(), out.path(), &mode)
            .await
            .unwrap();
        assert_eq!(report.discovered, 0);
        assert!(report.written.is_empty());
    }
}
