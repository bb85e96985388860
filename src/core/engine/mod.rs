//! # Engine Module
//!
//! Orchestrates watch jobs into per-file outcomes.
//!
//! ## Control Flow
//! For each watch job: purge deny-listed files, list and filter
//! candidates, resolve timestamp and identity, then either run the
//! duplicate resolver (move jobs) or consult the processed-set ledger
//! (copy jobs), plan the destination, and invoke the transfer
//! executor. A single file's failure never aborts the batch; only an
//! unreadable watch directory or an unopenable ledger is fatal.

mod report;

pub use report::{FileOutcome, FileReport, RunReport, RunSummary};

use crate::core::duplicates::{self, Candidate};
use crate::core::identity;
use crate::core::ledger::ProcessedLedger;
use crate::core::planner;
use crate::core::scanner::{FileClass, MediaFilter, ScanConfig, WatchScanner};
use crate::core::strategy::strategy_for;
use crate::core::transfer::{RemovalOutcome, TransferExecutor, TransferMode, TransferOutcome};
use crate::error::ArchiveError;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// One watch directory with its transfer action and name filters
#[derive(Debug, Clone)]
pub struct WatchJob {
    /// Directory to consume files from
    pub path: PathBuf,
    /// Move (consume the source) or copy (leave the source in place)
    pub action: TransferMode,
    /// File-name prefixes to include; empty means everything
    pub include_prefixes: Vec<String>,
}

impl WatchJob {
    pub fn new(path: impl Into<PathBuf>, action: TransferMode) -> Self {
        Self {
            path: path.into(),
            action,
            include_prefixes: Vec::new(),
        }
    }
}

/// Immutable engine configuration, passed explicitly into every run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root of the date-partitioned archive
    pub destination_root: PathBuf,
    /// Image extension allow-list
    pub image_extensions: Vec<String>,
    /// Video extension allow-list
    pub video_extensions: Vec<String>,
    /// Extensions purged from watch directories before processing
    pub banned_extensions: Vec<String>,
    /// Files smaller than this many bytes are skipped entirely
    pub min_file_size: u64,
    /// Location of the processed-set ledger
    pub ledger_path: PathBuf,
    /// Holding directory for duplicates; `None` deletes them instead
    pub quarantine_dir: Option<PathBuf>,
    /// Descend into watch-directory subdirectories
    pub recursive: bool,
    /// Plan and report without touching the filesystem
    pub dry_run: bool,
}

impl EngineConfig {
    /// Configuration with the default camera-upload extension lists.
    pub fn new(destination_root: impl Into<PathBuf>, ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            destination_root: destination_root.into(),
            image_extensions: vec![
                "jpg".into(),
                "jpeg".into(),
                "heic".into(),
                "heif".into(),
            ],
            video_extensions: vec!["mp4".into(), "mov".into(), "m4v".into()],
            banned_extensions: Vec::new(),
            min_file_size: 1024,
            ledger_path: ledger_path.into(),
            quarantine_dir: None,
            recursive: false,
            dry_run: false,
        }
    }
}

/// The identity resolution and safe-migration engine
pub struct ArchiveEngine {
    config: EngineConfig,
    filter: MediaFilter,
    scanner: WatchScanner,
    executor: TransferExecutor,
    ledger: ProcessedLedger,
}

impl ArchiveEngine {
    /// Build an engine, opening the processed-set ledger.
    ///
    /// A ledger that cannot be opened is fatal: copy-mode idempotency
    /// cannot be guaranteed without it.
    pub fn new(config: EngineConfig) -> Result<Self, ArchiveError> {
        let filter = MediaFilter::new(
            &config.image_extensions,
            &config.video_extensions,
            &config.banned_extensions,
        );
        let scanner = WatchScanner::new(ScanConfig {
            recursive: config.recursive,
            include_hidden: false,
        });
        let executor = TransferExecutor::new(config.dry_run);
        let ledger = ProcessedLedger::open(&config.ledger_path)?;

        Ok(Self {
            config,
            filter,
            scanner,
            executor,
            ledger,
        })
    }

    /// Process every watch job and return per-file outcomes.
    pub fn run(&mut self, jobs: &[WatchJob]) -> Result<RunReport, ArchiveError> {
        let start = Instant::now();
        let mut files = Vec::new();
        let mut bytes_transferred = 0u64;
        // Destination names claimed during this run, per directory
        let mut claimed: HashMap<PathBuf, HashSet<String>> = HashMap::new();

        for job in jobs {
            let span = tracing::info_span!("watch_job", path = %job.path.display(), action = %job.action);
            let _guard = span.enter();
            self.run_job(job, &mut files, &mut claimed, &mut bytes_transferred)?;
        }

        let report = RunReport::new(files, bytes_transferred, start.elapsed().as_millis() as u64);
        tracing::info!(
            moved = report.summary.moved,
            copied = report.summary.copied,
            skipped = report.summary.skipped,
            failed = report.summary.failed,
            "run complete"
        );
        Ok(report)
    }

    fn run_job(
        &mut self,
        job: &WatchJob,
        files: &mut Vec<FileReport>,
        claimed: &mut HashMap<PathBuf, HashSet<String>>,
        bytes_transferred: &mut u64,
    ) -> Result<(), ArchiveError> {
        let listing = self.scanner.list(&job.path)?;
        tracing::info!(candidates = listing.len(), "listed watch directory");

        let mut candidates = Vec::new();
        for file in listing {
            let class = self.filter.classify(&file.path);
            let category = match class {
                FileClass::Banned => {
                    files.push(FileReport {
                        outcome: self.purge(&file.path),
                        path: file.path,
                    });
                    continue;
                }
                FileClass::Unrecognized => continue,
                FileClass::Media(category) => category,
            };

            if !MediaFilter::matches_prefix(&file.file_name(), &job.include_prefixes) {
                files.push(FileReport {
                    path: file.path,
                    outcome: FileOutcome::SkippedExcludedByPrefix,
                });
                continue;
            }

            if file.size < self.config.min_file_size {
                files.push(FileReport {
                    path: file.path,
                    outcome: FileOutcome::SkippedTooSmall,
                });
                continue;
            }

            let strategy = strategy_for(category);
            if let Err(reason) = strategy.validate(&file) {
                files.push(FileReport {
                    path: file.path,
                    outcome: FileOutcome::Failed { reason },
                });
                continue;
            }

            let timestamp = strategy.resolve_timestamp(&file);
            if timestamp.is_none() {
                files.push(FileReport {
                    path: file.path,
                    outcome: FileOutcome::SkippedNoDate,
                });
                continue;
            }

            let identity = match identity::compute_identity(&file.path) {
                Ok(identity) => identity,
                Err(e) => {
                    files.push(FileReport {
                        path: file.path,
                        outcome: FileOutcome::Failed {
                            reason: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            candidates.push(Candidate {
                file,
                category,
                identity,
                timestamp,
            });
        }

        match job.action {
            TransferMode::Move => self.run_move(candidates, files, claimed, bytes_transferred),
            TransferMode::Copy => self.run_copy(candidates, files, claimed, bytes_transferred),
        }
        Ok(())
    }

    /// Move workflow: duplicates are resolved first, the survivor is
    /// archived, and removal candidates are quarantined or deleted only
    /// after the survivor is safely in the archive.
    fn run_move(
        &mut self,
        candidates: Vec<Candidate>,
        files: &mut Vec<FileReport>,
        claimed: &mut HashMap<PathBuf, HashSet<String>>,
        bytes_transferred: &mut u64,
    ) {
        for group in duplicates::resolve_groups(candidates) {
            if !group.removal_candidates.is_empty() {
                tracing::info!(
                    identity = %group.identity,
                    members = group.member_count(),
                    survivor = %group.survivor.file.path.display(),
                    "duplicate group resolved"
                );
            }

            let survivor_outcome =
                self.transfer_one(&group.survivor, TransferMode::Move, claimed, bytes_transferred);
            let survivor_archived = matches!(
                survivor_outcome,
                FileOutcome::Moved { .. } | FileOutcome::SkippedAlreadyExists
            );
            files.push(FileReport {
                path: group.survivor.file.path.clone(),
                outcome: survivor_outcome,
            });

            for candidate in group.removal_candidates {
                let outcome = if survivor_archived {
                    match self
                        .executor
                        .remove_duplicate(&candidate.file.path, self.config.quarantine_dir.as_deref())
                    {
                        Ok(RemovalOutcome::Quarantined(dest)) => {
                            FileOutcome::DuplicateQuarantined { dest }
                        }
                        Ok(RemovalOutcome::Deleted) => FileOutcome::DuplicateDeleted,
                        Err(e) => FileOutcome::Failed {
                            reason: e.to_string(),
                        },
                    }
                } else {
                    // Survivor never reached the archive; removing its
                    // duplicates now would destroy the only copies.
                    FileOutcome::Failed {
                        reason: "duplicate kept: survivor transfer failed".to_string(),
                    }
                };
                files.push(FileReport {
                    path: candidate.file.path,
                    outcome,
                });
            }
        }
    }

    /// Copy workflow: the processed-set ledger makes repeated runs
    /// idempotent. A path is marked after a verified copy or when the
    /// destination already existed.
    fn run_copy(
        &mut self,
        candidates: Vec<Candidate>,
        files: &mut Vec<FileReport>,
        claimed: &mut HashMap<PathBuf, HashSet<String>>,
        bytes_transferred: &mut u64,
    ) {
        for candidate in candidates {
            if self.ledger.is_processed(&candidate.file.path) {
                files.push(FileReport {
                    path: candidate.file.path,
                    outcome: FileOutcome::SkippedAlreadyProcessed,
                });
                continue;
            }

            let outcome =
                self.transfer_one(&candidate, TransferMode::Copy, claimed, bytes_transferred);
            let completed = matches!(
                outcome,
                FileOutcome::Copied { .. } | FileOutcome::SkippedAlreadyExists
            );
            if completed && !self.config.dry_run {
                if let Err(e) = self.ledger.mark_processed(&candidate.file.path) {
                    files.push(FileReport {
                        path: candidate.file.path,
                        outcome: FileOutcome::Failed {
                            reason: e.to_string(),
                        },
                    });
                    continue;
                }
            }
            files.push(FileReport {
                path: candidate.file.path,
                outcome,
            });
        }
    }

    /// Plan a destination for one candidate and execute the transfer.
    fn transfer_one(
        &self,
        candidate: &Candidate,
        mode: TransferMode,
        claimed: &mut HashMap<PathBuf, HashSet<String>>,
        bytes_transferred: &mut u64,
    ) -> FileOutcome {
        let strategy = strategy_for(candidate.category);
        // Candidates without a timestamp never reach this point
        let Some(timestamp) = candidate.timestamp else {
            return FileOutcome::SkippedNoDate;
        };

        let dest_dir = strategy.plan_destination(&timestamp, &self.config.destination_root);
        let names = claimed.entry(dest_dir.clone()).or_default();
        let name = planner::resolve_name_collision(&candidate.file.file_name(), names);
        let dest = dest_dir.join(&name);

        match self.executor.transfer(&candidate.file.path, &dest, mode) {
            Ok(TransferOutcome::Transferred) => {
                names.insert(name);
                *bytes_transferred += candidate.file.size;
                match mode {
                    TransferMode::Move => FileOutcome::Moved { dest },
                    TransferMode::Copy => FileOutcome::Copied { dest },
                }
            }
            Ok(TransferOutcome::AlreadyExists) => FileOutcome::SkippedAlreadyExists,
            Err(e) => {
                tracing::error!(
                    path = %candidate.file.path.display(),
                    error = %e,
                    "transfer failed, continuing with remaining files"
                );
                FileOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Remove a deny-listed file from the watch directory.
    fn purge(&self, path: &std::path::Path) -> FileOutcome {
        tracing::warn!(path = %path.display(), "purging deny-listed file");
        if self.config.dry_run {
            return FileOutcome::Purged;
        }
        match fs::remove_file(path) {
            Ok(()) => FileOutcome::Purged,
            Err(e) => FileOutcome::Failed {
                reason: format!("failed to purge: {}", e),
            },
        }
    }
}
