//! # Transfer Module
//!
//! Performs moves and copies with write-verify-commit semantics.
//!
//! ## Integrity Contract
//! 1. An existing destination file is an idempotent skip, never an
//!    overwrite.
//! 2. The destination is created fresh (`create_new`), byte-copied,
//!    then re-read: sizes must match, checksums must match, and neither
//!    side may be empty.
//! 3. Any failure unwinds by deleting the partial destination; the
//!    source file is left untouched in every failure case.
//! 4. Only a fully verified move unlinks the source.
//!
//! Duplicate removal goes through the same executor so that every
//! destructive action is witnessed and logged: either a verified move
//! into a quarantine directory or an explicit, logged deletion.

use crate::core::identity::{content_digest, read_file_bytes};
use crate::error::TransferError;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Operation mode for a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// Copy to the destination, then unlink the verified source
    #[default]
    Move,
    /// Copy to the destination, keep the source
    Copy,
}

impl std::fmt::Display for TransferMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferMode::Move => write!(f, "move"),
            TransferMode::Copy => write!(f, "copy"),
        }
    }
}

/// Outcome of a single transfer attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Written and verified at the destination
    Transferred,
    /// Destination already existed; treated as a no-op success
    AlreadyExists,
}

/// What happened to a duplicate removal candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Moved (verified) into the quarantine directory
    Quarantined(PathBuf),
    /// Permanently deleted
    Deleted,
}

/// Fault injected between the destination write and its verification,
/// standing in for disk or interference failures the verify step must
/// catch.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
enum InjectedFault {
    TruncateAfterWrite,
    CorruptAfterWrite,
}

/// Executes verified moves, copies, and witnessed removals
#[derive(Debug, Clone)]
pub struct TransferExecutor {
    dry_run: bool,
    #[cfg(test)]
    fault: Option<InjectedFault>,
}

impl TransferExecutor {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            #[cfg(test)]
            fault: None,
        }
    }

    /// Transfer `source` to `dest` in the given mode.
    ///
    /// Creates intermediate destination directories as needed. An
    /// existing destination file short-circuits to
    /// [`TransferOutcome::AlreadyExists`].
    pub fn transfer(
        &self,
        source: &Path,
        dest: &Path,
        mode: TransferMode,
    ) -> Result<TransferOutcome, TransferError> {
        if dest.exists() {
            tracing::debug!(dest = %dest.display(), "destination exists, skipping");
            return Ok(TransferOutcome::AlreadyExists);
        }

        if self.dry_run {
            tracing::info!(source = %source.display(), dest = %dest.display(), %mode, "dry run");
            return Ok(TransferOutcome::Transferred);
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| TransferError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        if let TransferOutcome::AlreadyExists = self.copy_verified(source, dest)? {
            return Ok(TransferOutcome::AlreadyExists);
        }

        if mode == TransferMode::Move {
            tracing::info!(source = %source.display(), dest = %dest.display(), "unlinking verified source");
            fs::remove_file(source).map_err(|e| TransferError::UnlinkFailed {
                path: source.to_path_buf(),
                source: e,
            })?;
        } else {
            tracing::info!(source = %source.display(), dest = %dest.display(), "copied");
        }

        Ok(TransferOutcome::Transferred)
    }

    /// Remove a duplicate: a verified move into `quarantine` when one
    /// is configured, a logged deletion otherwise.
    pub fn remove_duplicate(
        &self,
        path: &Path,
        quarantine: Option<&Path>,
    ) -> Result<RemovalOutcome, TransferError> {
        match quarantine {
            Some(holding_dir) => {
                let dest = unclaimed_quarantine_path(holding_dir, path);
                self.transfer(path, &dest, TransferMode::Move)?;
                tracing::info!(path = %path.display(), dest = %dest.display(), "duplicate quarantined");
                Ok(RemovalOutcome::Quarantined(dest))
            }
            None => {
                tracing::warn!(path = %path.display(), "deleting duplicate");
                if !self.dry_run {
                    fs::remove_file(path).map_err(|e| TransferError::RemoveFailed {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                }
                Ok(RemovalOutcome::Deleted)
            }
        }
    }

    /// Copy with the full verify sequence, unwinding on any failure.
    ///
    /// A destination appearing between the exists probe and the
    /// `create_new` (an external writer) is reported as
    /// [`TransferOutcome::AlreadyExists`] and never touched.
    fn copy_verified(&self, source: &Path, dest: &Path) -> Result<TransferOutcome, TransferError> {
        let src_bytes = read_file_bytes(source).map_err(|e| TransferError::SourceRead {
            path: source.to_path_buf(),
            source: e,
        })?;

        if src_bytes.is_empty() {
            return Err(TransferError::EmptySource {
                path: source.to_path_buf(),
            });
        }

        let write_result = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .and_then(|mut file| {
                file.write_all(src_bytes.as_ref())?;
                file.sync_all()
            });

        if let Err(e) = write_result {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                // The file was not created by this executor; leave it.
                tracing::debug!(dest = %dest.display(), "destination appeared during transfer, skipping");
                return Ok(TransferOutcome::AlreadyExists);
            }
            self.unwind(dest);
            return Err(TransferError::DestinationWrite {
                path: dest.to_path_buf(),
                source: e,
            });
        }

        #[cfg(test)]
        self.apply_fault(dest);

        let dest_bytes = match read_file_bytes(dest) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.unwind(dest);
                return Err(TransferError::DestinationRead {
                    path: dest.to_path_buf(),
                    source: e,
                });
            }
        };

        if dest_bytes.is_empty() {
            self.unwind(dest);
            return Err(TransferError::EmptyDestination {
                path: dest.to_path_buf(),
            });
        }

        if dest_bytes.len() != src_bytes.len() {
            self.unwind(dest);
            return Err(TransferError::SizeMismatch {
                path: dest.to_path_buf(),
                source_bytes: src_bytes.len() as u64,
                dest_bytes: dest_bytes.len() as u64,
            });
        }

        if content_digest(dest_bytes.as_ref()) != content_digest(src_bytes.as_ref()) {
            self.unwind(dest);
            return Err(TransferError::ChecksumMismatch {
                path: dest.to_path_buf(),
            });
        }

        Ok(TransferOutcome::Transferred)
    }

    /// Damage the freshly written destination before verification runs.
    #[cfg(test)]
    fn apply_fault(&self, dest: &Path) {
        match self.fault {
            Some(InjectedFault::TruncateAfterWrite) => {
                let _ = OpenOptions::new()
                    .write(true)
                    .open(dest)
                    .and_then(|f| f.set_len(1));
            }
            Some(InjectedFault::CorruptAfterWrite) => {
                let _ = OpenOptions::new().write(true).open(dest).and_then(|mut f| {
                    use std::io::Seek;
                    f.seek(std::io::SeekFrom::Start(0))?;
                    f.write_all(b"?")
                });
            }
            None => {}
        }
    }

    /// Delete a partially-written destination. Best effort: the
    /// transfer is already failing and the original error wins.
    fn unwind(&self, dest: &Path) {
        if dest.exists() {
            if let Err(e) = fs::remove_file(dest) {
                tracing::error!(dest = %dest.display(), error = %e, "failed to remove partial destination");
            }
        }
    }
}

/// First unclaimed path for `path`'s file name inside the quarantine
/// directory, probing the filesystem with an incrementing suffix.
fn unclaimed_quarantine_path(holding_dir: &Path, path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "duplicate".to_string());

    let mut dest = holding_dir.join(&file_name);
    let mut counter = 1;
    while dest.exists() {
        dest = holding_dir.join(format!("{}_{}", file_name, counter));
        counter += 1;
    }
    dest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(contents).unwrap();
        path
    }

    #[test]
    fn copy_preserves_source_and_verifies_destination() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "photo.jpg", b"pixels");
        let dest = temp.path().join("archive/2023/photo.jpg");

        let executor = TransferExecutor::new(false);
        let outcome = executor
            .transfer(&source, &dest, TransferMode::Copy)
            .unwrap();

        assert_eq!(outcome, TransferOutcome::Transferred);
        assert!(source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"pixels");
    }

    #[test]
    fn move_unlinks_only_the_verified_source() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "photo.jpg", b"pixels");
        let dest = temp.path().join("archive/photo.jpg");

        let executor = TransferExecutor::new(false);
        let outcome = executor
            .transfer(&source, &dest, TransferMode::Move)
            .unwrap();

        assert_eq!(outcome, TransferOutcome::Transferred);
        assert!(!source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"pixels");
    }

    #[test]
    fn existing_destination_is_an_idempotent_skip() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "photo.jpg", b"new pixels");
        let dest = write_file(temp.path(), "existing.jpg", b"old pixels");

        let executor = TransferExecutor::new(false);
        let outcome = executor
            .transfer(&source, &dest, TransferMode::Move)
            .unwrap();

        assert_eq!(outcome, TransferOutcome::AlreadyExists);
        // Neither side was touched
        assert!(source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"old pixels");
    }

    #[test]
    fn empty_source_fails_and_leaves_no_destination() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "empty.jpg", b"");
        let dest = temp.path().join("archive/empty.jpg");

        let executor = TransferExecutor::new(false);
        let result = executor.transfer(&source, &dest, TransferMode::Move);

        assert!(matches!(result, Err(TransferError::EmptySource { .. })));
        assert!(source.exists());
        assert!(!dest.exists());
    }

    #[test]
    fn failed_transfer_leaves_source_byte_identical() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "photo.jpg", b"important pixels");
        // Destination parent is a file, so directory creation fails
        let blocker = write_file(temp.path(), "blocked", b"x");
        let dest = blocker.join("photo.jpg");

        let executor = TransferExecutor::new(false);
        let result = executor.transfer(&source, &dest, TransferMode::Move);

        assert!(result.is_err());
        assert_eq!(fs::read(&source).unwrap(), b"important pixels");
    }

    #[test]
    fn checksum_mismatch_unwinds_destination_and_keeps_source() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "photo.jpg", b"important pixels");
        let dest = temp.path().join("archive/photo.jpg");

        let executor = TransferExecutor {
            dry_run: false,
            fault: Some(InjectedFault::CorruptAfterWrite),
        };
        let result = executor.transfer(&source, &dest, TransferMode::Move);

        assert!(matches!(result, Err(TransferError::ChecksumMismatch { .. })));
        assert!(!dest.exists());
        assert_eq!(fs::read(&source).unwrap(), b"important pixels");
    }

    #[test]
    fn size_mismatch_unwinds_destination_and_keeps_source() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "photo.jpg", b"important pixels");
        let dest = temp.path().join("archive/photo.jpg");

        let executor = TransferExecutor {
            dry_run: false,
            fault: Some(InjectedFault::TruncateAfterWrite),
        };
        let result = executor.transfer(&source, &dest, TransferMode::Move);

        assert!(matches!(result, Err(TransferError::SizeMismatch { .. })));
        assert!(!dest.exists());
        assert_eq!(fs::read(&source).unwrap(), b"important pixels");
    }

    #[test]
    fn destination_appearing_mid_transfer_is_never_overwritten() {
        // An external writer creates the destination after the exists
        // probe; drive copy_verified directly to hit the create_new
        // collision.
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "photo.jpg", b"new pixels");
        let dest = write_file(temp.path(), "existing.jpg", b"external bytes");

        let executor = TransferExecutor::new(false);
        let outcome = executor.copy_verified(&source, &dest).unwrap();

        assert_eq!(outcome, TransferOutcome::AlreadyExists);
        assert_eq!(fs::read(&dest).unwrap(), b"external bytes");
        assert!(source.exists());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "photo.jpg", b"pixels");
        let dest = temp.path().join("archive/photo.jpg");

        let executor = TransferExecutor::new(true);
        let outcome = executor
            .transfer(&source, &dest, TransferMode::Move)
            .unwrap();

        assert_eq!(outcome, TransferOutcome::Transferred);
        assert!(source.exists());
        assert!(!dest.exists());
    }

    #[test]
    fn quarantine_moves_duplicate_into_holding_dir() {
        let temp = TempDir::new().unwrap();
        let dup = write_file(temp.path(), "dup.jpg", b"pixels");
        let holding = temp.path().join("quarantine");

        let executor = TransferExecutor::new(false);
        let outcome = executor.remove_duplicate(&dup, Some(&holding)).unwrap();

        let RemovalOutcome::Quarantined(dest) = outcome else {
            panic!("expected quarantine outcome");
        };
        assert!(!dup.exists());
        assert_eq!(fs::read(dest).unwrap(), b"pixels");
    }

    #[test]
    fn quarantine_suffixes_on_name_collision() {
        let temp = TempDir::new().unwrap();
        let holding = temp.path().join("quarantine");
        fs::create_dir(&holding).unwrap();
        write_file(&holding, "dup.jpg", b"earlier arrival");
        let dup = write_file(temp.path(), "dup.jpg", b"pixels");

        let executor = TransferExecutor::new(false);
        let outcome = executor.remove_duplicate(&dup, Some(&holding)).unwrap();

        let RemovalOutcome::Quarantined(dest) = outcome else {
            panic!("expected quarantine outcome");
        };
        assert_eq!(dest, holding.join("dup.jpg_1"));
        assert_eq!(fs::read(&holding.join("dup.jpg")).unwrap(), b"earlier arrival");
        assert_eq!(fs::read(dest).unwrap(), b"pixels");
    }

    #[test]
    fn delete_removes_duplicate_without_quarantine() {
        let temp = TempDir::new().unwrap();
        let dup = write_file(temp.path(), "dup.jpg", b"pixels");

        let executor = TransferExecutor::new(false);
        let outcome = executor.remove_duplicate(&dup, None).unwrap();

        assert_eq!(outcome, RemovalOutcome::Deleted);
        assert!(!dup.exists());
    }

    #[test]
    fn dry_run_removal_keeps_the_file() {
        let temp = TempDir::new().unwrap();
        let dup = write_file(temp.path(), "dup.jpg", b"pixels");

        let executor = TransferExecutor::new(true);
        let outcome = executor.remove_duplicate(&dup, None).unwrap();

        assert_eq!(outcome, RemovalOutcome::Deleted);
        assert!(dup.exists());
    }
}
