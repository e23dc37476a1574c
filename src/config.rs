//! Configuration types for xbio-scraper
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Index range parsing and validation
//! - Runtime configuration, built once and shared read-only

use crate::error::ConfigError;
use crate::partition::IndexWindow;
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 512;

/// Default location of the local record file
pub const DEFAULT_INPUT_PATH: &str = "./assets/journalists_info.csv";

/// Default location of the snapshot database
pub const DEFAULT_DB_PATH: &str = "./assets/presskit.db";

/// Regex for parsing index ranges
static RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // Matches: 0-100, " 5 - 10 "
    Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*$").expect("Invalid range regex")
});

/// Partition journalist profiles across parallel workers
#[derive(Parser, Debug, Clone)]
#[command(
    name = "xbio-scraper",
    version,
    about = "Partition journalist profiles across parallel workers",
    long_about = "Reads journalist profiles from a local record file, splits the selected\n\
                  index range into one contiguous batch per worker and drains every batch\n\
                  on its own worker thread.",
    after_help = "EXAMPLES:\n    \
        xbio-scraper -n 4\n    \
        xbio-scraper -n 8 -r 100-500 -p\n    \
        xbio-scraper --getfromdb --db-path ./assets/presskit.db -n 4\n    \
        xbio-scraper -i ./other.csv -r 0-10 -v"
)]
pub struct CliArgs {
    /// Refresh the local record file from the snapshot database first
    #[arg(short = 'g', long = "getfromdb")]
    pub get_from_db: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Record file with journalists' information
    #[arg(short = 'i', long, default_value = DEFAULT_INPUT_PATH, value_name = "FILE")]
    pub input_path: PathBuf,

    /// Number of workers to split the range across
    #[arg(
        short = 'n',
        long = "number-of-processes",
        visible_alias = "np",
        default_value_t = 1,
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Index range of records to process, as start-end (end exclusive)
    #[arg(
        short = 'r',
        long,
        default_value = "0-9999999",
        value_name = "START-END",
        value_parser = parse_range
    )]
    pub range: IndexWindow,

    /// Snapshot database used by --getfromdb
    #[arg(long, env = "XBIO_DB_PATH", default_value = DEFAULT_DB_PATH, value_name = "FILE")]
    pub db_path: PathBuf,

    /// Show an overall progress bar
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Quiet mode - suppress header and progress bar
    #[arg(short = 'q', long, conflicts_with = "progress")]
    pub quiet: bool,
}

/// Parse a `start-end` range string into an index window
pub fn parse_range(value: &str) -> Result<IndexWindow, ConfigError> {
    let format_err = || ConfigError::InvalidRangeFormat {
        input: value.to_string(),
    };

    let caps = RANGE_REGEX.captures(value).ok_or_else(format_err)?;

    // Digits-only captures can still overflow usize
    let start = caps[1].parse::<usize>().map_err(|_| format_err())?;
    let end = caps[2].parse::<usize>().map_err(|_| format_err())?;

    IndexWindow::new(start, end)
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Local record file
    pub input_path: PathBuf,

    /// Snapshot database path
    pub db_path: PathBuf,

    /// Refresh the record file before partitioning
    pub fetch_from_db: bool,

    /// Requested worker count (upper bound on batches)
    pub worker_count: usize,

    /// Requested (unclamped) index window
    pub window: IndexWindow,

    /// Verbose logging, threaded through to every worker
    pub verbose: bool,

    /// Show the header
    pub show_header: bool,

    /// Show the overall progress bar
    pub show_progress: bool,
}

impl ScrapeConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        // Validate worker count
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        // The record file only has to exist up front when it is not about to be exported
        if !args.get_from_db && !args.input_path.is_file() {
            return Err(ConfigError::InvalidInputPath {
                path: args.input_path.clone(),
                reason: "File does not exist".to_string(),
            });
        }

        Ok(Self {
            input_path: args.input_path,
            db_path: args.db_path,
            fetch_from_db: args.get_from_db,
            worker_count: args.workers,
            window: args.range,
            verbose: args.verbose,
            show_header: !args.quiet,
            show_progress: args.progress && !args.quiet,
        })
    }

    /// Configuration for an in-process run over an already available source
    pub fn new(worker_count: usize, window: IndexWindow) -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            fetch_from_db: false,
            worker_count,
            window,
            verbose: false,
            show_header: false,
            show_progress: false,
        }
    }
}
