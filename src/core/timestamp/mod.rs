//! # Timestamp Module
//!
//! Derives a best-effort capture timestamp for a file.
//!
//! ## Priority Order
//! 1. Embedded capture metadata (DateTimeOriginal, then DateTime)
//! 2. Recognized filename conventions (vendor-marked 8-digit dates)
//! 3. Filesystem modification time
//!
//! The ordering is load-bearing: metadata is authoritative when
//! present, filename inference covers metadata-stripped transfers such
//! as messaging-app re-encodes, and mtime is the least trustworthy
//! fallback because it can reflect copy time rather than capture time.
//! Each stage that fails to parse cascades to the next instead of
//! failing the file.

use crate::core::scanner::MediaFile;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use exif::{In, Reader, Tag, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;

/// Which source produced a resolved timestamp, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    Metadata,
    FilenamePattern,
    FileModified,
}

impl std::fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampSource::Metadata => write!(f, "capture metadata"),
            TimestampSource::FilenamePattern => write!(f, "filename pattern"),
            TimestampSource::FileModified => write!(f, "file modification time"),
        }
    }
}

/// A resolved capture timestamp tagged with its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureTimestamp {
    pub datetime: NaiveDateTime,
    pub source: TimestampSource,
}

impl CaptureTimestamp {
    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }
}

/// Timestamp layouts accepted for embedded capture-time values.
/// The EXIF standard layout comes first; the rest cover writers that
/// deviate from it.
const METADATA_LAYOUTS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y:%m:%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Resolve a capture timestamp with the full metadata-first chain.
///
/// Total whenever the file has a readable modification time; `None`
/// only when every source, mtime included, is unavailable.
pub fn resolve(file: &MediaFile) -> Option<CaptureTimestamp> {
    if let Some(datetime) = from_metadata(&file.path) {
        return Some(CaptureTimestamp {
            datetime,
            source: TimestampSource::Metadata,
        });
    }
    resolve_without_metadata(file)
}

/// Resolve a capture timestamp for files that carry no readable
/// metadata (videos): filename conventions, then mtime.
pub fn resolve_without_metadata(file: &MediaFile) -> Option<CaptureTimestamp> {
    if let Some(datetime) = from_filename(&file.file_name()) {
        return Some(CaptureTimestamp {
            datetime,
            source: TimestampSource::FilenamePattern,
        });
    }
    file.modified.map(|modified| CaptureTimestamp {
        datetime: from_mtime(modified),
        source: TimestampSource::FileModified,
    })
}

/// Extract the embedded capture time, if the container decodes and any
/// known layout parses.
fn from_metadata(path: &Path) -> Option<NaiveDateTime> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;

    for tag in [Tag::DateTimeOriginal, Tag::DateTime] {
        if let Some(field) = exif.get_field(tag, In::PRIMARY) {
            if let Value::Ascii(ref vec) = field.value {
                if let Some(bytes) = vec.first() {
                    if let Ok(s) = std::str::from_utf8(bytes) {
                        if let Some(parsed) = parse_metadata_datetime(s) {
                            return Some(parsed);
                        }
                    }
                }
            }
        }
    }
    None
}

/// Parse an embedded capture-time value against the known layouts;
/// the first layout that parses wins.
pub fn parse_metadata_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_matches('"');
    METADATA_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(trimmed, layout).ok())
}

/// Filename conventions carrying a capture date.
///
/// Each pattern brackets an 8-digit date with a known vendor marker;
/// a 6-digit time segment is used when present, midnight otherwise.
fn filename_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // IMG_20230615_091500.jpg, VID_20230615_091500.mp4, PXL_...
            r"(?i)^(?:IMG|VID|PXL|PANO|MVIMG)[_-](\d{8})[_-](\d{6})",
            // WhatsApp: IMG-20230615-WA0007.jpg
            r"(?i)^(?:IMG|VID)-(\d{8})-WA\d+",
            // Screenshot_20230615-091500.png
            r"(?i)^Screenshot[_-](\d{8})[-_](\d{6})",
            // Date-only vendor names: IMG_20230615.jpg
            r"(?i)^(?:IMG|VID|PXL)[_-](\d{8})(?:\D|$)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("filename pattern must compile"))
        .collect()
    })
}

/// Infer a capture time from a recognized filename convention.
pub fn from_filename(file_name: &str) -> Option<NaiveDateTime> {
    for pattern in filename_patterns() {
        let Some(captures) = pattern.captures(file_name) else {
            continue;
        };
        let Some(date) = captures.get(1).and_then(|m| parse_compact_date(m.as_str())) else {
            // Eight digits that are not a calendar date; keep cascading.
            continue;
        };
        let time = captures
            .get(2)
            .and_then(|m| parse_compact_time(m.as_str()))
            .unwrap_or(NaiveTime::MIN);
        return Some(date.and_time(time));
    }
    None
}

/// Convert a filesystem modification time.
pub fn from_mtime(modified: SystemTime) -> NaiveDateTime {
    DateTime::<Utc>::from(modified).naive_utc()
}

fn parse_compact_date(d: &str) -> Option<NaiveDate> {
    let year: i32 = d.get(0..4)?.parse().ok()?;
    let month: u32 = d.get(4..6)?.parse().ok()?;
    let day: u32 = d.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_compact_time(t: &str) -> Option<NaiveTime> {
    let hour: u32 = t.get(0..2)?.parse().ok()?;
    let minute: u32 = t.get(2..4)?.parse().ok()?;
    let second: u32 = t.get(4..6)?.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn date_time(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_exif_standard_layout() {
        assert_eq!(
            parse_metadata_datetime("2023:06:15 09:15:00"),
            Some(date_time(2023, 6, 15, 9, 15, 0))
        );
    }

    #[test]
    fn parses_dashed_and_iso_layouts() {
        assert_eq!(
            parse_metadata_datetime("2023-06-15 09:15:00"),
            Some(date_time(2023, 6, 15, 9, 15, 0))
        );
        assert_eq!(
            parse_metadata_datetime("2023-06-15T09:15:00"),
            Some(date_time(2023, 6, 15, 9, 15, 0))
        );
    }

    #[test]
    fn parses_quoted_values() {
        assert_eq!(
            parse_metadata_datetime("\"2023:06:15 09:15:00\""),
            Some(date_time(2023, 6, 15, 9, 15, 0))
        );
    }

    #[test]
    fn garbage_metadata_value_cascades() {
        assert_eq!(parse_metadata_datetime("not a date"), None);
        assert_eq!(parse_metadata_datetime(""), None);
    }

    #[test]
    fn filename_with_date_and_time() {
        assert_eq!(
            from_filename("IMG_20230615_091500.heic"),
            Some(date_time(2023, 6, 15, 9, 15, 0))
        );
        assert_eq!(
            from_filename("VID_20230615_091500.mp4"),
            Some(date_time(2023, 6, 15, 9, 15, 0))
        );
    }

    #[test]
    fn whatsapp_name_defaults_to_midnight() {
        assert_eq!(
            from_filename("IMG-20230615-WA0007.jpg"),
            Some(date_time(2023, 6, 15, 0, 0, 0))
        );
    }

    #[test]
    fn screenshot_name_parses() {
        assert_eq!(
            from_filename("Screenshot_20230615-091500.jpg"),
            Some(date_time(2023, 6, 15, 9, 15, 0))
        );
    }

    #[test]
    fn date_only_vendor_name_defaults_to_midnight() {
        assert_eq!(
            from_filename("IMG_20230615.jpg"),
            Some(date_time(2023, 6, 15, 0, 0, 0))
        );
    }

    #[test]
    fn unmarked_or_invalid_dates_do_not_match() {
        // No vendor marker
        assert_eq!(from_filename("20230615_091500.jpg"), None);
        // Eight digits that are not a calendar date
        assert_eq!(from_filename("IMG_20231399.jpg"), None);
        assert_eq!(from_filename("holiday.jpg"), None);
    }

    #[test]
    fn resolution_falls_back_to_mtime() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("holiday.jpg");
        fs::File::create(&path).unwrap().write_all(b"no exif here").unwrap();
        let modified = fs::metadata(&path).unwrap().modified().unwrap();

        let file = MediaFile {
            path,
            size: 12,
            modified: Some(modified),
        };

        let resolved = resolve(&file).unwrap();
        assert_eq!(resolved.source, TimestampSource::FileModified);
        assert_eq!(resolved.datetime, from_mtime(modified));
    }

    #[test]
    fn filename_beats_mtime() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("IMG_20230615_091500.jpg");
        fs::File::create(&path).unwrap().write_all(b"no exif here").unwrap();
        let modified = fs::metadata(&path).unwrap().modified().unwrap();

        let file = MediaFile {
            path,
            size: 12,
            modified: Some(modified),
        };

        let resolved = resolve(&file).unwrap();
        assert_eq!(resolved.source, TimestampSource::FilenamePattern);
        assert_eq!(resolved.datetime, date_time(2023, 6, 15, 9, 15, 0));
    }

    #[test]
    fn resolution_is_total_when_mtime_is_present() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nodate.bin");
        fs::File::create(&path).unwrap().write_all(b"x").unwrap();
        let modified = fs::metadata(&path).unwrap().modified().unwrap();

        let file = MediaFile {
            path,
            size: 1,
            modified: Some(modified),
        };
        assert!(resolve(&file).is_some());
    }

    #[test]
    fn unresolvable_only_without_mtime() {
        let file = MediaFile {
            path: std::path::PathBuf::from("/gone/holiday.jpg"),
            size: 1,
            modified: None,
        };
        assert!(resolve(&file).is_none());
    }
}
