//! Per-record processing contract
//!
//! A processor is invoked once per record, on the worker thread that owns
//! the record's batch. Errors and panics are caught at the record boundary
//! by the worker, so a failing processor never stalls the join barrier.

use crate::error::ProcessError;
use crate::source::Record;
use tracing::debug;

/// Where a record sits within its worker's batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobContext {
    /// Ordinal of the worker draining the batch
    pub worker: usize,

    /// 1-based position within the batch
    pub position: usize,

    /// Batch size at the time the worker was spawned
    pub total: usize,

    /// Verbose mode from the command line
    pub verbose: bool,
}

/// Handles one record
pub trait Processor: Send + Sync {
    fn process(&self, ctx: &JobContext, record: &Record) -> Result<(), ProcessError>;
}

impl<F> Processor for F
where
    F: Fn(&JobContext, &Record) -> Result<(), ProcessError> + Send + Sync,
{
    fn process(&self, ctx: &JobContext, record: &Record) -> Result<(), ProcessError> {
        self(ctx, record)
    }
}

/// Processor that only logs the record it was given
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProcessor;

impl Processor for LogProcessor {
    fn process(&self, ctx: &JobContext, record: &Record) -> Result<(), ProcessError> {
        debug!(
            worker = ctx.worker,
            position = ctx.position,
            total = ctx.total,
            name = record.name(),
            id = record.id().unwrap_or_default(),
            "Processing record"
        );
        Ok(())
    }
}
