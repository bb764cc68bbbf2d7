//! Enumeration of raw image files produced by the extractor.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult};

/// File extensions treated as raw images. Matching is case-insensitive.
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp"];

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
}

/// Result of scanning an extraction directory.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Recognized image files, sorted by file name
    pub files: Vec<DiscoveredFile>,
    /// Regular files skipped for having an unrecognized extension
    pub skipped: usize,
}

/// Discovers raw image files in a flat extraction directory.
pub struct FileDiscovery;

impl FileDiscovery {
    /// List the recognized image files directly inside `dir`.
    ///
    /// Subdirectories are ignored. Files are ordered by name, which fixes the
    /// "first occurrence" used by deduplication.
    pub fn discover(dir: &Path) -> PipelineResult<Discovery> {
        let mut discovery = Discovery::default();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| PipelineError::Read {
                path: e.path().unwrap_or(dir).to_path_buf(),
                message: format!("Cannot read directory: {}", e),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !Self::is_recognized(path) {
                tracing::trace!("Skipping unrecognized file: {:?}", path);
                discovery.skipped += 1;
                continue;
            }

            discovery.files.push(DiscoveredFile {
                path: path.to_path_buf(),
            });
        }

        Ok(discovery)
    }

    /// Check if a file has a recognized image extension.
    pub fn is_recognized(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                RECOGNIZED_EXTENSIONS.iter().any(|known| *known == ext_lower)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_recognized() {
        assert!(FileDiscovery::is_recognized(Path::new("a.png")));
        assert!(FileDiscovery::is_recognized(Path::new("a.PNG")));
        assert!(FileDiscovery::is_recognized(Path::new("a.jpeg")));
        assert!(FileDiscovery::is_recognized(Path::new("a.Jpg")));
        assert!(FileDiscovery::is_recognized(Path::new("a.gif")));
        assert!(FileDiscovery::is_recognized(Path::new("a.bmp")));
        assert!(FileDiscovery::is_recognized(Path::new("a.tiff")));
        assert!(FileDiscovery::is_recognized(Path::new("a.webp")));
        assert!(!FileDiscovery::is_recognized(Path::new("a.xyz")));
        assert!(!FileDiscovery::is_recognized(Path::new("a.pdf")));
        assert!(!FileDiscovery::is_recognized(Path::new("png")));
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"aa").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let discovery = FileDiscovery::discover(dir.path()).unwrap();
        let names: Vec<_> = discovery
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
        assert_eq!(discovery.skipped, 1);
    }

    #[test]
    fn test_discover_missing_dir_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = FileDiscovery::discover(&missing).unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let discovery = FileDiscovery::discover(dir.path()).unwrap();
        assert!(discovery.files.is_empty());
        assert_eq!(discovery.skipped, 0);
    }
}
