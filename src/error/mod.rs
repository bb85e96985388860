//! # Error Module
//!
//! Error types for the photo archiver engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file failures stay per-file** - a bad photo aborts its own
//!   transfer, never the batch
//! - **Fatal means fatal** - only an unreadable watch directory or an
//!   unopenable ledger aborts a whole run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while listing a watch directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Watch directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while computing a file's identity fingerprint
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Failed to read source file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur during a verified move or copy
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Failed to read source file {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read back destination file {path}: {source}")]
    DestinationRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write destination file {path}: {source}")]
    DestinationWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create destination directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Size mismatch after copy to {path}: source {source_bytes} bytes, destination {dest_bytes} bytes")]
    SizeMismatch {
        path: PathBuf,
        source_bytes: u64,
        dest_bytes: u64,
    },

    #[error("Checksum mismatch after copy to {path}")]
    ChecksumMismatch { path: PathBuf },

    #[error("Source file is empty: {path}")]
    EmptySource { path: PathBuf },

    #[error("Destination file is empty after copy: {path}")]
    EmptyDestination { path: PathBuf },

    #[error("Failed to remove source file {path} after verified copy: {source}")]
    UnlinkFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove duplicate file {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur with the processed-set ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to open ledger file at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to ledger file at {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ArchiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/uploads"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/uploads"));
    }

    #[test]
    fn size_mismatch_reports_both_sizes() {
        let error = TransferError::SizeMismatch {
            path: PathBuf::from("/archive/2023/photo.jpg"),
            source_bytes: 100,
            dest_bytes: 50,
        };
        let message = error.to_string();
        assert!(message.contains("100"));
        assert!(message.contains("50"));
        assert!(message.contains("/archive/2023/photo.jpg"));
    }

    #[test]
    fn ledger_error_includes_path() {
        let error = LedgerError::Open {
            path: PathBuf::from("/var/lib/archiver/processed.log"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = error.to_string();
        assert!(message.contains("processed.log"));
    }
}
