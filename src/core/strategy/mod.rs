//! # Strategy Module
//!
//! Per-category timestamp and destination strategies.
//!
//! Photos carry capture metadata and get the full metadata-first
//! resolution chain plus a container sniff; videos have no readable
//! metadata in this engine and resolve from filename conventions or
//! mtime. Both share the same destination layout.

use crate::core::planner;
use crate::core::scanner::{MediaCategory, MediaFile};
use crate::core::timestamp::{self, CaptureTimestamp};
use image::ImageReader;
use std::path::{Path, PathBuf};

/// Timestamp/destination strategy selected by media category
pub trait MediaStrategy: Send + Sync {
    /// The category this strategy handles
    fn category(&self) -> MediaCategory;

    /// Basic validity check before the file enters the pipeline.
    /// Default: any readable file is acceptable.
    fn validate(&self, _file: &MediaFile) -> Result<(), String> {
        Ok(())
    }

    /// Resolve a best-effort capture timestamp
    fn resolve_timestamp(&self, file: &MediaFile) -> Option<CaptureTimestamp>;

    /// Plan the destination directory for a resolved timestamp
    fn plan_destination(&self, timestamp: &CaptureTimestamp, root: &Path) -> PathBuf {
        planner::plan_destination(timestamp, root)
    }
}

/// Strategy for photo files
pub struct PhotoStrategy;

/// Image formats the container sniff can recognize from magic bytes.
/// HEIC and camera-raw containers are outside the sniffer's vocabulary
/// and pass through unchecked.
const SNIFFABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp"];

impl MediaStrategy for PhotoStrategy {
    fn category(&self) -> MediaCategory {
        MediaCategory::Image
    }

    /// Sniff that the file is a decodable image container. Content-type
    /// only; pixels are never interpreted.
    fn validate(&self, file: &MediaFile) -> Result<(), String> {
        let ext = file
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !SNIFFABLE_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(());
        }

        let reader = ImageReader::open(&file.path)
            .map_err(|e| format!("cannot open image: {}", e))?
            .with_guessed_format()
            .map_err(|e| format!("cannot sniff image container: {}", e))?;

        match reader.format() {
            Some(_) => Ok(()),
            None => Err("not a decodable image container".to_string()),
        }
    }

    fn resolve_timestamp(&self, file: &MediaFile) -> Option<CaptureTimestamp> {
        timestamp::resolve(file)
    }
}

/// Strategy for video files
pub struct VideoStrategy;

impl MediaStrategy for VideoStrategy {
    fn category(&self) -> MediaCategory {
        MediaCategory::Video
    }

    fn resolve_timestamp(&self, file: &MediaFile) -> Option<CaptureTimestamp> {
        timestamp::resolve_without_metadata(file)
    }
}

/// Select the strategy for a media category
pub fn strategy_for(category: MediaCategory) -> &'static dyn MediaStrategy {
    static PHOTO: PhotoStrategy = PhotoStrategy;
    static VIDEO: VideoStrategy = VideoStrategy;
    match category {
        MediaCategory::Image => &PHOTO,
        MediaCategory::Video => &VIDEO,
    }
}
