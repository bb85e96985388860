//! Per-file outcomes and run-level reporting types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// What happened to a single candidate file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Moved into the archive, source removed
    Moved { dest: PathBuf },
    /// Copied into the archive, source kept
    Copied { dest: PathBuf },
    /// Deny-listed extension, removed from the watch directory
    Purged,
    /// Duplicate removal candidate, permanently deleted
    DuplicateDeleted,
    /// Duplicate removal candidate, moved to the quarantine directory
    DuplicateQuarantined { dest: PathBuf },
    /// Below the minimum file size threshold
    SkippedTooSmall,
    /// No capture timestamp could be resolved from any source
    SkippedNoDate,
    /// Destination already existed; idempotent no-op
    SkippedAlreadyExists,
    /// File name matched none of the job's include prefixes
    SkippedExcludedByPrefix,
    /// Source path already recorded in the processed-set ledger
    SkippedAlreadyProcessed,
    /// The file's own transfer failed; the run continued
    Failed { reason: String },
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            FileOutcome::SkippedTooSmall
                | FileOutcome::SkippedNoDate
                | FileOutcome::SkippedAlreadyExists
                | FileOutcome::SkippedExcludedByPrefix
                | FileOutcome::SkippedAlreadyProcessed
        )
    }
}

impl std::fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOutcome::Moved { dest } => write!(f, "moved to {}", dest.display()),
            FileOutcome::Copied { dest } => write!(f, "copied to {}", dest.display()),
            FileOutcome::Purged => write!(f, "purged (deny-listed extension)"),
            FileOutcome::DuplicateDeleted => write!(f, "duplicate deleted"),
            FileOutcome::DuplicateQuarantined { dest } => {
                write!(f, "duplicate quarantined to {}", dest.display())
            }
            FileOutcome::SkippedTooSmall => write!(f, "skipped: below minimum size"),
            FileOutcome::SkippedNoDate => write!(f, "skipped: no resolvable date"),
            FileOutcome::SkippedAlreadyExists => write!(f, "skipped: destination exists"),
            FileOutcome::SkippedExcludedByPrefix => write!(f, "skipped: excluded by prefix"),
            FileOutcome::SkippedAlreadyProcessed => write!(f, "skipped: already processed"),
            FileOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Outcome for one candidate file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Aggregate counts for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub moved: usize,
    pub copied: usize,
    pub purged: usize,
    pub duplicates_removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_transferred: u64,
}

/// Full result of one engine run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub id: String,
    pub files: Vec<FileReport>,
    pub summary: RunSummary,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new(files: Vec<FileReport>, bytes_transferred: u64, duration_ms: u64) -> Self {
        let mut summary = RunSummary {
            bytes_transferred,
            ..Default::default()
        };
        for report in &files {
            match &report.outcome {
                FileOutcome::Moved { .. } => summary.moved += 1,
                FileOutcome::Copied { .. } => summary.copied += 1,
                FileOutcome::Purged => summary.purged += 1,
                FileOutcome::DuplicateDeleted | FileOutcome::DuplicateQuarantined { .. } => {
                    summary.duplicates_removed += 1
                }
                FileOutcome::Failed { .. } => summary.failed += 1,
                outcome if outcome.is_skip() => summary.skipped += 1,
                _ => {}
            }
        }

        Self {
            id: Uuid::new_v4().to_string(),
            files,
            summary,
            duration_ms,
        }
    }
}
