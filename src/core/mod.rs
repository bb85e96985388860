//! # Core Module
//!
//! The host-agnostic identity resolution and safe-migration engine.
//!
//! ## Modules
//! - `scanner` - Lists candidate files in watch directories
//! - `identity` - Computes duplicate-detection fingerprints
//! - `timestamp` - Resolves best-effort capture timestamps
//! - `planner` - Maps capture time to a destination directory tree
//! - `duplicates` - Groups files by identity and elects survivors
//! - `transfer` - Performs verified moves and copies with rollback
//! - `ledger` - Persists the processed set for idempotent copy runs
//! - `strategy` - Per-category timestamp/destination strategies
//! - `engine` - Orchestrates watch jobs into per-file outcomes

pub mod duplicates;
pub mod engine;
pub mod identity;
pub mod ledger;
pub mod planner;
pub mod scanner;
pub mod strategy;
pub mod timestamp;
pub mod transfer;

// Re-export commonly used types
pub use duplicates::DuplicateGroup;
pub use engine::{ArchiveEngine, EngineConfig, FileOutcome, FileReport, RunReport, WatchJob};
pub use identity::Identity;
pub use scanner::{MediaCategory, MediaFile};
pub use timestamp::{CaptureTimestamp, TimestampSource};
pub use transfer::TransferMode;
