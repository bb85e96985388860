//! # Planner Module
//!
//! Maps a capture timestamp to a deterministic destination directory
//! and resolves filename collisions. Pure functions, no I/O.
//!
//! ## Layout
//! `root/YYYY/MM - MonthName/YYYY-MM-DD/`
//!
//! Year, month, and day components are zero-padded so lexicographic
//! sort order matches chronological order.

use crate::core::timestamp::CaptureTimestamp;
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Calendar key for a destination directory, derived from capture time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DestinationKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl From<NaiveDate> for DestinationKey {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl DestinationKey {
    /// Directory path for this key relative to the archive root
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(format!("{:04}", self.year))
            .join(format!("{:02} - {}", self.month, month_name(self.month)))
            .join(format!(
                "{:04}-{:02}-{:02}",
                self.year, self.month, self.day
            ))
    }
}

/// Plan the destination directory for a capture timestamp.
pub fn plan_destination(timestamp: &CaptureTimestamp, destination_root: &Path) -> PathBuf {
    destination_root.join(DestinationKey::from(timestamp.date()).relative_dir())
}

/// Resolve a filename against the set of names already claimed in this
/// run.
///
/// An unclaimed name is returned unchanged; otherwise an incrementing
/// numeric suffix is inserted before the extension, starting at the
/// first unclaimed candidate. Deterministic and collision-free for any
/// finite claimed set.
pub fn resolve_name_collision(file_name: &str, claimed: &HashSet<String>) -> String {
    if !claimed.contains(file_name) {
        return file_name.to_string();
    }

    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let mut counter = 1;
    loop {
        let candidate = if ext.is_empty() {
            format!("{}_{}", stem, counter)
        } else {
            format!("{}_{}.{}", stem, counter, ext)
        };
        if !claimed.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
