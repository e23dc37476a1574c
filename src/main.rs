//! xbio-scraper - Partitioned Journalist Profile Scraper
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use xbio_scraper::config::{CliArgs, ScrapeConfig};
use xbio_scraper::export::{SnapshotExporter, SqliteExporter};
use xbio_scraper::processor::LogProcessor;
use xbio_scraper::progress::{print_header, print_summary};
use xbio_scraper::source::CsvRecordSource;
use xbio_scraper::ScrapeCoordinator;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Elapsed time covers the export and header as well as the scrape
    let start_time = Instant::now();

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = ScrapeConfig::from_args(args).context("Invalid configuration")?;

    // Refresh the record file before anything is partitioned
    if config.fetch_from_db {
        let written = SqliteExporter::new(&config.db_path)
            .export(&config.input_path)
            .context("Failed to retrieve journalists from the snapshot database")?;
        info!(records = written, "Record file refreshed");
    }

    let source = CsvRecordSource::new(&config.input_path);

    // Print header
    if config.show_header {
        let input_size = std::fs::metadata(source.path()).ok().map(|m| m.len());
        print_header(
            &source.path().display().to_string(),
            input_size,
            config.worker_count,
            &config.window.to_string(),
        );
    }

    let coordinator =
        ScrapeCoordinator::new(config, source, Arc::new(LogProcessor)).started_at(start_time);

    let result = coordinator.run().context("Scrape failed")?;

    // Print summary
    print_summary(
        result.jobs,
        result.failed,
        result.workers,
        result.abnormal_exits,
        result.duration,
        result.avg_per_job(),
    );

    if result.failed > 0 {
        info!(failed = result.failed, "Scrape completed with failed records");
    }
    if result.abnormal_exits > 0 {
        warn!(workers = result.abnormal_exits, "Some workers exited abnormally");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("xbio_scraper=debug,warn")
    } else {
        EnvFilter::new("xbio_scraper=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
