//! Watch-directory listing built on walkdir.

use super::MediaFile;
use crate::error::ScanError;
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for the watch-directory walker
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to descend into subdirectories. Watch directories are
    /// flat upload drops by default.
    pub recursive: bool,
    /// Whether to include hidden files
    pub include_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            include_hidden: false,
        }
    }
}

/// Lists the candidate files of a watch directory
pub struct WatchScanner {
    config: ScanConfig,
}

impl WatchScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// List every regular file in the watch directory.
    ///
    /// Failure to read the directory listing itself is fatal for the
    /// run; individual unreadable entries are skipped with a warning.
    pub fn list(&self, watch_dir: &Path) -> Result<Vec<MediaFile>, ScanError> {
        if !watch_dir.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: watch_dir.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(watch_dir).follow_links(false);
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                        && e.path() == Some(watch_dir)
                    {
                        return Err(ScanError::PermissionDenied {
                            path: watch_dir.to_path_buf(),
                        });
                    }
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            if !self.config.include_hidden {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if name.starts_with('.') {
                        continue;
                    }
                }
            }

            match entry.metadata() {
                Ok(metadata) => files.push(MediaFile {
                    path: path.to_path_buf(),
                    size: metadata.len(),
                    modified: metadata.modified().ok(),
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to stat file");
                }
            }
        }

        // Deterministic processing order regardless of readdir order
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str, contents: &[u8]) {
        let mut file = File::create(dir.join(name)).unwrap();
        file.write_all(contents).unwrap();
    }

    #[test]
    fn lists_files_in_flat_directory() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "a.jpg", b"aaa");
        create_file(temp.path(), "b.mp4", b"bbb");

        let scanner = WatchScanner::new(ScanConfig::default());
        let files = scanner.list(temp.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].path.ends_with("a.jpg"));
        assert_eq!(files[0].size, 3);
        assert!(files[0].modified.is_some());
    }

    #[test]
    fn flat_scan_ignores_subdirectories() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "top.jpg", b"x");
        let sub = temp.path().join("nested");
        fs::create_dir(&sub).unwrap();
        create_file(&sub, "deep.jpg", b"y");

        let scanner = WatchScanner::new(ScanConfig::default());
        let files = scanner.list(temp.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("top.jpg"));
    }

    #[test]
    fn recursive_scan_descends() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "top.jpg", b"x");
        let sub = temp.path().join("nested");
        fs::create_dir(&sub).unwrap();
        create_file(&sub, "deep.jpg", b"y");

        let scanner = WatchScanner::new(ScanConfig {
            recursive: true,
            ..Default::default()
        });
        let files = scanner.list(temp.path()).unwrap();

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn hidden_files_are_skipped_by_default() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "visible.jpg", b"x");
        create_file(temp.path(), ".hidden.jpg", b"y");

        let scanner = WatchScanner::new(ScanConfig::default());
        let files = scanner.list(temp.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("visible.jpg"));
    }

    #[test]
    fn listing_is_sorted_by_path() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "c.jpg", b"1");
        create_file(temp.path(), "a.jpg", b"2");
        create_file(temp.path(), "b.jpg", b"3");

        let scanner = WatchScanner::new(ScanConfig::default());
        let files = scanner.list(temp.path()).unwrap();

        let names: Vec<_> = files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn missing_watch_directory_is_fatal() {
        let scanner = WatchScanner::new(ScanConfig::default());
        let result = scanner.list(Path::new("/nonexistent/watch/dir"));
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
