//! Error types for xbio-scraper
//!
//! This module defines the error hierarchy that covers:
//! - CLI and configuration validation errors
//! - Record file reading errors
//! - Snapshot export errors
//! - Worker thread and per-record processing errors
//!
//! Startup errors (configuration, export, source) are fatal to the run.
//! Per-record errors stay inside the worker that hit them.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the xbio-scraper application
#[derive(Error, Debug)]
pub enum ScraperError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Record source errors
    #[error("Record source error: {0}")]
    Source(#[from] SourceError),

    /// Snapshot export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Configuration and CLI errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Range string did not match `start-end`
    #[error("Invalid range format '{input}': should be start-end")]
    InvalidRangeFormat { input: String },

    /// Range start is past its end
    #[error("Invalid range: {start}-{end}. Start should be less than or equal to end")]
    InvertedRange { start: usize, end: usize },

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Input path error
    #[error("Invalid input path '{path}': {reason}")]
    InvalidInputPath { path: PathBuf, reason: String },
}

/// Record file reading errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to open the record file
    #[error("Failed to open record file '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record file has no header row
    #[error("Record file '{path}' has no header row")]
    MissingHeader { path: PathBuf },

    /// CSV decoding error
    #[error("Failed to read record at row {row}: {reason}")]
    Decode { row: u64, reason: String },

    /// CSV error outside a specific row
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Snapshot export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// Snapshot store could not be opened
    #[error("Failed to open snapshot store '{path}': {source}")]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query against the snapshot store failed
    #[error("Snapshot query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Failed to write the destination record file
    #[error("Failed to write record file '{path}': {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker thread could not be started
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked outside per-record processing
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Job queue rejected a record
    #[error("Job queue full at capacity {capacity}")]
    QueueFull { capacity: usize },
}

/// Per-record processing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Record is missing a field the processor needs
    #[error("Record is missing field '{field}'")]
    MissingField { field: String },

    /// Processor failed while handling the record
    #[error("Failed to process '{name}': {reason}")]
    Failed { name: String, reason: String },

    /// Processor panicked while handling the record
    #[error("Processor panicked: {message}")]
    Panicked { message: String },
}

/// Result type alias for ScraperError
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for SourceError
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Result type alias for ExportError
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Represents the outcome of processing a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Processor returned successfully
    Processed { position: usize },

    /// Processor failed; the worker keeps draining
    Failed { position: usize, error: ProcessError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::InvertedRange { start: 5, end: 2 };
        let err: ScraperError = config_err.into();
        assert!(matches!(err, ScraperError::Config(_)));
    }

    #[test]
    fn test_range_error_message() {
        let err = ConfigError::InvalidRangeFormat { input: "5-".into() };
        assert_eq!(
            err.to_string(),
            "Invalid range format '5-': should be start-end"
        );
    }

    #[test]
    fn test_worker_error_converts() {
        let err: ScraperError = WorkerError::QueueFull { capacity: 4 }.into();
        assert_eq!(err.to_string(), "Worker error: Job queue full at capacity 4");
    }
}
