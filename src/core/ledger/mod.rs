//! # Ledger Module
//!
//! Persisted set of source paths already transferred, consulted before
//! copy-mode transfers so repeated runs are idempotent. Move-mode does
//! not need it: the source disappears.
//!
//! ## Format
//! A plain newline-delimited UTF-8 log, one source path per line,
//! append-only. Loaded fully into memory at open; each new entry is
//! appended and fsynced before the run moves to the next file, so a
//! crash never loses an already-flushed entry.
//!
//! The log is never pruned or rewritten in place. Unbounded growth is a
//! known, accepted tension; see DESIGN.md.

use crate::error::LedgerError;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only processed-set ledger keyed by source path string
pub struct ProcessedLedger {
    path: PathBuf,
    entries: HashSet<String>,
    file: File,
}

impl ProcessedLedger {
    /// Open the ledger, creating it (and its parent directories) if
    /// absent, and load all existing entries.
    ///
    /// Failure here is fatal for the run.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let open_err = |e: std::io::Error| LedgerError::Open {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(open_err)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;

        let entries = match fs::read_to_string(path) {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => return Err(open_err(e)),
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            file,
        })
    }

    /// Whether a source path has already been transferred
    pub fn is_processed(&self, source: &Path) -> bool {
        self.entries.contains(&key_for(source))
    }

    /// Record a source path as transferred: updates the in-memory set
    /// and durably appends before returning. Re-marking an existing
    /// entry is a no-op, so the log never accumulates duplicates from
    /// a single ledger instance.
    pub fn mark_processed(&mut self, source: &Path) -> Result<(), LedgerError> {
        let key = key_for(source);
        if !self.entries.insert(key.clone()) {
            return Ok(());
        }

        let append_err = |e: std::io::Error| LedgerError::Append {
            path: self.path.clone(),
            source: e,
        };
        writeln!(self.file, "{}", key).map_err(append_err)?;
        self.file.flush().map_err(append_err)?;
        self.file.sync_data().map_err(append_err)?;
        Ok(())
    }

    /// Number of entries loaded or appended so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn key_for(source: &Path) -> String {
    source.to_string_lossy().into_owned()
}
