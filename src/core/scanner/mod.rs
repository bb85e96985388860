//! # Scanner Module
//!
//! Lists candidate files in watch directories.
//!
//! The walker reports every regular file it finds; classification into
//! images, videos, and deny-listed files is the filter's job, so the
//! engine can report a per-file outcome for everything it saw.

mod filter;
mod walker;

pub use filter::{FileClass, MediaFilter};
pub use walker::{ScanConfig, WatchScanner};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// A candidate file discovered in a watch directory.
///
/// Transient: re-derived on every scan, never persisted.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified time, when the filesystem could report one
    pub modified: Option<SystemTime>,
}

impl MediaFile {
    /// File name component as a string, lossy for non-UTF-8 names
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Media category, used to select a timestamp/destination strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    Image,
    Video,
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaCategory::Image => write!(f, "image"),
            MediaCategory::Video => write!(f, "video"),
        }
    }
}
