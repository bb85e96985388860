//! Extension-based file classification.

use super::MediaCategory;
use std::collections::HashSet;
use std::path::Path;

/// How the filter classified a candidate file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// A supported image or video
    Media(MediaCategory),
    /// Extension is on the deny-list; the file should be purged
    Banned,
    /// Not a file this engine handles
    Unrecognized,
}

/// Classifies files by extension allow- and deny-lists
#[derive(Debug, Clone)]
pub struct MediaFilter {
    image_extensions: HashSet<String>,
    video_extensions: HashSet<String>,
    banned_extensions: HashSet<String>,
}

impl MediaFilter {
    /// Create a filter from explicit extension lists.
    ///
    /// Extensions are matched case-insensitively and without the dot.
    pub fn new(
        image_extensions: &[String],
        video_extensions: &[String],
        banned_extensions: &[String],
    ) -> Self {
        Self {
            image_extensions: normalize(image_extensions),
            video_extensions: normalize(video_extensions),
            banned_extensions: normalize(banned_extensions),
        }
    }

    /// Classify a path by its extension.
    ///
    /// The deny-list wins over the allow-lists, so a banned extension is
    /// purged even if it also appears in an allow-list.
    pub fn classify(&self, path: &Path) -> FileClass {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => return FileClass::Unrecognized,
        };

        if self.banned_extensions.contains(&ext) {
            return FileClass::Banned;
        }
        if self.image_extensions.contains(&ext) {
            return FileClass::Media(MediaCategory::Image);
        }
        if self.video_extensions.contains(&ext) {
            return FileClass::Media(MediaCategory::Video);
        }
        FileClass::Unrecognized
    }

    /// Check if a file name starts with one of the include prefixes.
    ///
    /// An empty prefix list includes everything.
    pub fn matches_prefix(file_name: &str, include_prefixes: &[String]) -> bool {
        if include_prefixes.is_empty() {
            return true;
        }
        include_prefixes.iter().any(|p| file_name.starts_with(p))
    }
}

fn normalize(extensions: &[String]) -> HashSet<String> {
    extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect()
}
