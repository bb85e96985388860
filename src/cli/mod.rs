//! # CLI Module
//!
//! Command-line interface for the photo archiver.
//!
//! ## Usage
//! ```bash
//! # Move camera uploads into the archive
//! photo-archive run ~/Uploads --dest ~/Photos/Archive
//!
//! # Copy instead of move (sources stay in place)
//! photo-archive run ~/Uploads --dest ~/Photos/Archive --action copy
//!
//! # Only files with vendor prefixes, preview without touching disk
//! photo-archive run ~/Uploads --dest ~/Photos/Archive --prefix IMG --prefix PXL --dry-run
//!
//! # JSON report for scripting
//! photo-archive run ~/Uploads --dest ~/Photos/Archive --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_archiver::core::{ArchiveEngine, EngineConfig, RunReport, TransferMode, WatchJob};
use photo_archiver::error::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Photo Archiver - consolidate camera uploads without losing a byte
#[derive(Parser, Debug)]
#[command(name = "photo-archive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process watch directories into the archive
    Run {
        /// Watch directories to consume files from
        #[arg(required = true)]
        watch_dirs: Vec<PathBuf>,

        /// Root of the date-partitioned archive
        #[arg(short, long)]
        dest: PathBuf,

        /// Transfer action
        #[arg(short, long, default_value = "move")]
        action: Action,

        /// Only process files whose names start with one of these
        /// prefixes (repeatable); omit to process everything
        #[arg(short, long)]
        prefix: Vec<String>,

        /// Extensions to purge from watch directories (repeatable)
        #[arg(long)]
        banned_ext: Vec<String>,

        /// Minimum file size in bytes; smaller files are skipped
        #[arg(long, default_value = "1024")]
        min_size: u64,

        /// Processed-set ledger path
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Quarantine directory for duplicates; omit to delete them
        #[arg(long)]
        quarantine: Option<PathBuf>,

        /// Descend into watch-directory subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Plan and report without touching the filesystem
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output (per-file lines in pretty mode)
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    /// Move files into the archive, removing verified sources
    Move,
    /// Copy files into the archive, leaving sources in place
    Copy,
}

impl From<Action> for TransferMode {
    fn from(action: Action) -> Self {
        match action {
            Action::Move => TransferMode::Move,
            Action::Copy => TransferMode::Copy,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (failed paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    photo_archiver::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            watch_dirs,
            dest,
            action,
            prefix,
            banned_ext,
            min_size,
            ledger,
            quarantine,
            recursive,
            dry_run,
            output,
            verbose,
        } => run_archive(RunArgs {
            watch_dirs,
            dest,
            action: action.into(),
            prefixes: prefix,
            banned_ext,
            min_size,
            ledger,
            quarantine,
            recursive,
            dry_run,
            output,
            verbose,
        }),
    }
}

struct RunArgs {
    watch_dirs: Vec<PathBuf>,
    dest: PathBuf,
    action: TransferMode,
    prefixes: Vec<String>,
    banned_ext: Vec<String>,
    min_size: u64,
    ledger: Option<PathBuf>,
    quarantine: Option<PathBuf>,
    recursive: bool,
    dry_run: bool,
    output: OutputFormat,
    verbose: bool,
}

fn run_archive(args: RunArgs) -> Result<()> {
    let term = Term::stderr();

    if matches!(args.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Photo Archiver").bold().cyan(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
        if args.dry_run {
            term.write_line(&format!(
                "{}",
                style("Dry run: nothing will be written or removed").yellow()
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    let ledger_path = args.ledger.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photo-archiver")
            .join("processed.log")
    });

    let mut config = EngineConfig::new(args.dest, ledger_path);
    config.banned_extensions = args.banned_ext;
    config.min_file_size = args.min_size;
    config.quarantine_dir = args.quarantine;
    config.recursive = args.recursive;
    config.dry_run = args.dry_run;

    let mut engine = ArchiveEngine::new(config)?;

    let jobs: Vec<WatchJob> = args
        .watch_dirs
        .into_iter()
        .map(|path| {
            let mut job = WatchJob::new(path, args.action);
            job.include_prefixes = args.prefixes.clone();
            job
        })
        .collect();

    let progress = if matches!(args.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Processing watch directories...");
        Some(pb)
    } else {
        None
    };

    let result = engine.run(&jobs);

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = result?;

    match args.output {
        OutputFormat::Pretty => print_pretty_report(&term, &report, args.verbose),
        OutputFormat::Json => print_json_report(&report),
        OutputFormat::Minimal => print_minimal_report(&report),
    }

    Ok(())
}

fn print_pretty_report(term: &Term, report: &RunReport, verbose: bool) {
    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    let summary = &report.summary;
    term.write_line(&format!(
        "  {} files processed in {:.1}s",
        style(report.files.len()).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();

    if summary.moved > 0 {
        term.write_line(&format!("  {} moved", style(summary.moved).cyan()))
            .ok();
    }
    if summary.copied > 0 {
        term.write_line(&format!("  {} copied", style(summary.copied).cyan()))
            .ok();
    }
    if summary.duplicates_removed > 0 {
        term.write_line(&format!(
            "  {} duplicates removed",
            style(summary.duplicates_removed).yellow()
        ))
        .ok();
    }
    if summary.purged > 0 {
        term.write_line(&format!("  {} purged", style(summary.purged).yellow()))
            .ok();
    }
    if summary.skipped > 0 {
        term.write_line(&format!("  {} skipped", style(summary.skipped).dim()))
            .ok();
    }
    if summary.failed > 0 {
        term.write_line(&format!("  {} failed", style(summary.failed).red().bold()))
            .ok();
    }
    term.write_line(&format!(
        "  {} transferred",
        style(format_bytes(summary.bytes_transferred)).cyan()
    ))
    .ok();
    term.write_line("").ok();

    if verbose {
        for file in &report.files {
            term.write_line(&format!(
                "  {} {}",
                style(file.path.display()).dim(),
                file.outcome
            ))
            .ok();
        }
        term.write_line("").ok();
    } else {
        // Failures always print, even without --verbose
        for file in report.files.iter().filter(|f| f.outcome.is_failure()) {
            term.write_line(&format!(
                "  {} {} {}",
                style("✗").red(),
                file.path.display(),
                style(&file.outcome).red()
            ))
            .ok();
        }
    }
}

fn print_json_report(report: &RunReport) {
    println!("{}", serde_json::to_string_pretty(report).unwrap());
}

fn print_minimal_report(report: &RunReport) {
    for file in report.files.iter().filter(|f| f.outcome.is_failure()) {
        println!("{}", file.path.display());
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
