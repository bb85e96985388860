//! # Photo Archiver
//!
//! Consolidates camera uploads into a date-partitioned archive while
//! eliminating duplicates, without ever corrupting or silently
//! overwriting a photo.
//!
//! ## Core Philosophy
//! - **Verify before trusting** - every move or copy is re-read and
//!   checksummed before the source is touched
//! - **Idempotent runs** - re-running over the same inputs is a no-op
//! - **Witnessed removal** - duplicates are quarantined or deleted
//!   through a logged action, never silently
//!
//! ## Architecture
//! The library is split into a core engine (host-agnostic) and a thin
//! presentation layer:
//! - `core` - identity resolution and safe-migration engine
//! - `error` - error types with file context
//! - `cli` - command-line interface (binary only)

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use error::{ArchiveError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or host).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
