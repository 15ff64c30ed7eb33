/// ReadSleuth CLI — terminal frontend for the read-health verifier.
///
/// This crate contains argument parsing and terminal rendering. Scan logic
/// lives in `readsleuth-core`.
pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use readsleuth_core::model::Verdict;
use readsleuth_core::store::{StateStore, STATE_FILE_NAME};

#[derive(Parser)]
#[command(
    name = "readsleuth",
    version,
    about = "Throttled read-health verifier for suspect storage",
    long_about = "readsleuth reads every tracked file end to end under a \
                  throughput cap and records whether the device sustained a \
                  minimum speed. Progress persists in a snapshot file, so an \
                  interrupted run resumes at the exact byte it stopped at."
)]
pub struct Cli {
    /// Snapshot file (defaults to readsleuth_state.json in the current directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Verify every tracked file that is not yet OK
    Scan {
        /// Folder to enumerate before scanning (omit to resume the tracked set)
        root: Option<PathBuf>,

        /// Throughput cap in MB/s, clamped to 1-100 and persisted
        #[arg(short, long, value_name = "MBS")]
        speed_limit: Option<u32>,
    },

    /// Track additional files without touching the enumerated set
    Add {
        /// Files to track
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show the tracked set and per-file results
    Status {
        /// Show only files with this verdict
        #[arg(short, long, default_value = "all")]
        filter: VerdictFilter,
    },

    /// Write per-file results as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete the snapshot and forget all tracked files
    Clear,
}

/// Verdict filter for `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum VerdictFilter {
    /// Every tracked file
    #[default]
    All,
    /// Files that read cleanly at full length
    Ok,
    /// Files that failed or stalled below the speed floor
    Bad,
    /// Files not yet decided
    Pending,
}

impl VerdictFilter {
    /// Whether a record with this verdict passes the filter.
    pub fn matches(self, verdict: Verdict) -> bool {
        match self {
            VerdictFilter::All => true,
            VerdictFilter::Ok => verdict == Verdict::Ok,
            VerdictFilter::Bad => verdict == Verdict::Bad,
            VerdictFilter::Pending => verdict == Verdict::Pending,
        }
    }
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let store = StateStore::new(
        cli.state_file
            .unwrap_or_else(|| PathBuf::from(STATE_FILE_NAME)),
    );
    tracing::debug!("Using snapshot at {}", store.path().display());

    match cli.command {
        Command::Scan { root, speed_limit } => {
            commands::scan::run(&store, root.as_deref(), speed_limit)
        }
        Command::Add { files } => commands::add::run(&store, &files),
        Command::Status { filter } => commands::status::run(&store, filter),
        Command::Export { output } => commands::export::run(&store, output.as_deref()),
        Command::Clear => commands::clear::run(&store),
    }
}
