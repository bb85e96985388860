//! # Duplicates Module
//!
//! Groups files by identity and designates exactly one survivor per
//! group.
//!
//! ## Survivor Election
//! Candidates are ordered by resolved capture timestamp ascending;
//! entries whose resolution degraded to mtime participate at that
//! mtime, and ties or resolution failures break on path string order.
//! The earliest file survives, the rest become removal candidates.
//! Removal itself is delegated to the transfer executor.

use crate::core::identity::Identity;
use crate::core::scanner::{MediaCategory, MediaFile};
use crate::core::timestamp::CaptureTimestamp;
use std::collections::HashMap;

/// A file with its resolved identity and timestamp, ready for grouping
#[derive(Debug, Clone)]
pub struct Candidate {
    pub file: MediaFile,
    pub category: MediaCategory,
    pub identity: Identity,
    pub timestamp: Option<CaptureTimestamp>,
}

/// Files sharing one identity, with one designated survivor
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub identity: Identity,
    pub survivor: Candidate,
    pub removal_candidates: Vec<Candidate>,
}

impl DuplicateGroup {
    /// Total number of files in the group, survivor included
    pub fn member_count(&self) -> usize {
        self.removal_candidates.len() + 1
    }
}

/// Group candidates by identity and elect survivors.
///
/// Every input file appears in exactly one group; singleton groups have
/// no removal candidates. Output order is deterministic (by survivor
/// path) for reproducible runs.
pub fn resolve_groups(candidates: Vec<Candidate>) -> Vec<DuplicateGroup> {
    let mut by_identity: HashMap<Identity, Vec<Candidate>> = HashMap::new();
    for candidate in candidates {
        by_identity
            .entry(candidate.identity.clone())
            .or_default()
            .push(candidate);
    }

    let mut groups = Vec::with_capacity(by_identity.len());
    for (identity, mut members) in by_identity {
        members.sort_by(|a, b| {
            let key_a = a.timestamp.map(|t| t.datetime);
            let key_b = b.timestamp.map(|t| t.datetime);
            match (key_a, key_b) {
                (Some(ta), Some(tb)) => ta.cmp(&tb).then_with(|| a.file.path.cmp(&b.file.path)),
                // Unresolvable timestamps order after resolved ones
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.file.path.cmp(&b.file.path),
            }
        });

        let mut members = members.into_iter();
        let survivor = members.next().expect("group has at least one member");
        groups.push(DuplicateGroup {
            identity,
            survivor,
            removal_candidates: members.collect(),
        });
    }

    groups.sort_by(|a, b| a.survivor.file.path.cmp(&b.survivor.file.path));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{metadata_fingerprint, MetadataFields};
    use crate::core::timestamp::TimestampSource;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn identity(tag: &str) -> Identity {
        metadata_fingerprint(&MetadataFields {
            image_unique_id: tag.into(),
            ..Default::default()
        })
    }

    fn candidate(path: &str, id: &str, day: Option<u32>) -> Candidate {
        Candidate {
            file: MediaFile {
                path: PathBuf::from(path),
                size: 100,
                modified: None,
            },
            category: MediaCategory::Image,
            identity: identity(id),
            timestamp: day.map(|d| CaptureTimestamp {
                datetime: NaiveDate::from_ymd_opt(2023, 6, d)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
                source: TimestampSource::Metadata,
            }),
        }
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(resolve_groups(vec![]).is_empty());
    }

    #[test]
    fn singleton_has_no_removal_candidates() {
        let groups = resolve_groups(vec![candidate("/u/a.jpg", "one", Some(1))]);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].removal_candidates.is_empty());
    }

    #[test]
    fn earliest_timestamp_survives() {
        // T1 < T2 < T3: the T1 file is the survivor, the others are
        // removal candidates.
        let groups = resolve_groups(vec![
            candidate("/u/t3.jpg", "same", Some(3)),
            candidate("/u/t1.jpg", "same", Some(1)),
            candidate("/u/t2.jpg", "same", Some(2)),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].survivor.file.path, PathBuf::from("/u/t1.jpg"));
        assert_eq!(groups[0].removal_candidates.len(), 2);
        let removed: Vec<_> = groups[0]
            .removal_candidates
            .iter()
            .map(|c| c.file.path.clone())
            .collect();
        assert_eq!(
            removed,
            vec![PathBuf::from("/u/t2.jpg"), PathBuf::from("/u/t3.jpg")]
        );
    }

    #[test]
    fn timestamp_ties_break_on_path_order() {
        let groups = resolve_groups(vec![
            candidate("/u/B.jpg", "same", Some(1)),
            candidate("/u/A.jpg", "same", Some(1)),
        ]);
        assert_eq!(groups[0].survivor.file.path, PathBuf::from("/u/A.jpg"));
    }

    #[test]
    fn unresolved_timestamps_order_last_then_by_path() {
        let groups = resolve_groups(vec![
            candidate("/u/no_date_b.jpg", "same", None),
            candidate("/u/dated.jpg", "same", Some(5)),
            candidate("/u/no_date_a.jpg", "same", None),
        ]);
        assert_eq!(groups[0].survivor.file.path, PathBuf::from("/u/dated.jpg"));
        let removed: Vec<_> = groups[0]
            .removal_candidates
            .iter()
            .map(|c| c.file.path.clone())
            .collect();
        assert_eq!(
            removed,
            vec![
                PathBuf::from("/u/no_date_a.jpg"),
                PathBuf::from("/u/no_date_b.jpg")
            ]
        );
    }

    #[test]
    fn distinct_identities_form_distinct_groups() {
        let groups = resolve_groups(vec![
            candidate("/u/a.jpg", "one", Some(1)),
            candidate("/u/b.jpg", "two", Some(1)),
        ]);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.removal_candidates.is_empty()));
    }

    #[test]
    fn group_order_is_deterministic() {
        let make = || {
            vec![
                candidate("/u/z.jpg", "one", Some(1)),
                candidate("/u/m.jpg", "two", Some(1)),
                candidate("/u/a.jpg", "three", Some(1)),
            ]
        };
        let first: Vec<_> = resolve_groups(make())
            .into_iter()
            .map(|g| g.survivor.file.path)
            .collect();
        let second: Vec<_> = resolve_groups(make())
            .into_iter()
            .map(|g| g.survivor.file.path)
            .collect();
        assert_eq!(first, second);
    }
}
