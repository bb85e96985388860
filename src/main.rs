//! # photo-archive CLI
//!
//! Command-line interface for the photo archiver.
//!
//! ## Usage
//! ```bash
//! photo-archive run ~/Dropbox/Camera\ Uploads --dest /mnt/media/Camera
//! photo-archive run ~/uploads --dest /archive --action copy --dry-run
//! ```

mod cli;

use photo_archiver::Result;

fn main() -> Result<()> {
    cli::run()
}
