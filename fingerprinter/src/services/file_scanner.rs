//! Audio file scanner
//!
//! Lists the audio files of one directory level. Sub-directories and files
//! with an unsupported extension are skipped.

use crate::error::FingerprintError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Extensions accepted by default
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3"];

/// Audio file scanner
#[derive(Debug, Clone)]
pub struct FileScanner {
    extensions: Vec<String>,
    ignore_patterns: Vec<String>,
}

impl FileScanner {
    /// Create new file scanner accepting `.mp3` files
    ///
    /// Ignores system files like .DS_Store and Thumbs.db.
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignore_patterns: vec![".DS_Store".to_string(), "Thumbs.db".to_string()],
        }
    }

    /// Replace the accepted extensions (case-insensitive, without the dot)
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Check if the file extension is an accepted audio format
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map(|ext| self.extensions.iter().any(|e| *e == ext))
            .unwrap_or(false)
    }

    /// Scan one directory level for audio files
    ///
    /// Returns paths sorted by file name.
    pub fn scan(&self, dir: &Path) -> Result<Vec<PathBuf>, FingerprintError> {
        if !dir.exists() {
            return Err(FingerprintError::PathNotFound(dir.to_path_buf()));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.is_supported(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    // Unreadable entries are skipped, the scan continues
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            files = files.len(),
            "Directory scan complete"
        );

        Ok(files)
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        let file_name = entry.file_name().to_string_lossy();
        self.ignore_patterns
            .iter()
            .any(|pattern| file_name.contains(pattern.as_str()))
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extension_detection() {
        let scanner = FileScanner::new();
        assert!(scanner.is_supported(Path::new("song.mp3")));
        assert!(scanner.is_supported(Path::new("SONG.MP3")));
        assert!(!scanner.is_supported(Path::new("song.flac")));
        assert!(!scanner.is_supported(Path::new("song")));
    }

    #[test]
    fn test_custom_extensions() {
        let scanner = FileScanner::new().with_extensions([".flac", "OGG"]);
        assert!(scanner.is_supported(Path::new("a.flac")));
        assert!(scanner.is_supported(Path::new("a.ogg")));
        assert!(!scanner.is_supported(Path::new("a.mp3")));
    }

    #[test]
    fn test_scan_nonexistent_path() {
        let scanner = FileScanner::new();
        let result = scanner.scan(Path::new("/nonexistent/path"));
        assert!(matches!(result, Err(FingerprintError::PathNotFound(_))));
    }

    #[test]
    fn test_scan_skips_subdirectories_and_other_formats() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("b.mp3"), b"ID3").unwrap();
        fs::write(root.join("a.mp3"), b"ID3").unwrap();
        fs::write(root.join("cover.jpg"), b"\xFF\xD8").unwrap();
        fs::create_dir(root.join("nested.mp3")).unwrap();
        fs::write(root.join("nested.mp3").join("c.mp3"), b"ID3").unwrap();

        let files = FileScanner::new().scan(root).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = FileScanner::new().scan(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }
}
