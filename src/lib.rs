//! xbio-scraper - Partitioned Journalist Profile Scraper
//!
//! Splits a bounded list of journalist profiles into contiguous index
//! ranges, drains each range on its own worker thread, and reports
//! aggregate throughput once every worker has finished.
//!
//! # Features
//!
//! - **Range Selection**: A requested `start-end` window is clamped to the
//!   actual record count; a window past the data is simply empty.
//!
//! - **Single-Pass Partitioning**: The record file is walked once. Each
//!   batch is handed to a new worker as soon as it fills.
//!
//! - **Isolated Workers**: Every worker owns exactly one frozen queue and
//!   a read-only view of the run configuration.
//!
//! - **Contained Failures**: A record that fails (or panics) in the
//!   processor is logged and counted; the worker keeps draining.
//!
//! # Data Flow
//!
//! ```text
//! Record Source ──► IndexWindow::clamp ──► Partitioner ──► N JobQueues
//!                                                              │
//!                                           ┌──────────────────┤
//!                                           ▼                  ▼
//!                                       Worker 0   ...     Worker N-1
//!                                           │                  │
//!                                           └──────► join ◄────┘
//!                                                     │
//!                                                  summary
//! ```
//!
//! # Example
//!
//! ```bash
//! # Four workers over the whole file
//! xbio-scraper -n 4
//!
//! # Refresh from the snapshot store, then process records 100..500
//! xbio-scraper --getfromdb -n 8 -r 100-500
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod partition;
pub mod pool;
pub mod processor;
pub mod progress;
pub mod source;

pub use config::{CliArgs, ScrapeConfig};
pub use error::{Result, ScraperError};
pub use partition::{IndexWindow, Partitioner};
pub use pool::{ScrapeCoordinator, ScrapeResult};
pub use processor::{JobContext, LogProcessor, Processor};
pub use source::{CsvRecordSource, MemorySource, Record, RecordSource};
