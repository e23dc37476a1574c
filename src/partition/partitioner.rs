//! Single-pass partitioner
//!
//! Walks the record source once, skipping records before the window
//! start and stopping at the window end. Records are buffered into the
//! current batch; a batch is handed to the sink the moment it reaches
//! the target size, so workers start while the pass is still running.

use crate::error::{SourceError, SourceResult};
use crate::partition::IndexWindow;
use crate::source::{Record, RecordSource};
use std::mem;
use tracing::{debug, trace};

/// Target batch size: `ceil(window_len / workers)`, 0 for an empty window
pub fn batch_size(window_len: usize, workers: usize) -> usize {
    if window_len == 0 {
        return 0;
    }
    window_len.div_ceil(workers.max(1))
}

/// A contiguous run of records destined for one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    ordinal: usize,
    records: Vec<Record>,
}

impl Batch {
    fn new(ordinal: usize, records: Vec<Record>) -> Self {
        Self { ordinal, records }
    }

    /// Position of this batch in hand-off order, starting at 0
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// What a partitioning pass produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSummary {
    /// Clamped window that was walked
    pub window: IndexWindow,

    /// Target batch size
    pub batch_size: usize,

    /// Number of batches handed off
    pub batches: usize,

    /// Number of records handed off
    pub records: usize,
}

/// Splits a clamped window into per-worker batches
#[derive(Debug, Clone, Copy)]
pub struct Partitioner {
    window: IndexWindow,
    batch_size: usize,
}

impl Partitioner {
    /// Create a partitioner over `requested`, clamped to a source of `total` records
    pub fn new(requested: IndexWindow, total: usize, workers: usize) -> Self {
        let window = requested.clamp(total);
        Self {
            window,
            batch_size: batch_size(window.len(), workers),
        }
    }

    /// Count the source, clamp the requested window and build a partitioner
    pub fn select<S>(source: &S, requested: IndexWindow, workers: usize) -> SourceResult<Self>
    where
        S: RecordSource + ?Sized,
    {
        let total = source.count()?;
        let partitioner = Self::new(requested, total, workers);
        debug!(
            total,
            requested = %requested,
            window = %partitioner.window,
            "Selected index window"
        );
        Ok(partitioner)
    }

    pub fn window(&self) -> IndexWindow {
        self.window
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Walk the source once, handing every non-empty batch to `sink`.
    ///
    /// The sink is called in ordinal order, interleaved with iteration.
    /// A sink error stops the pass and is returned as is.
    pub fn run<S, F, E>(&self, source: &S, mut sink: F) -> Result<PartitionSummary, E>
    where
        S: RecordSource + ?Sized,
        F: FnMut(Batch) -> Result<(), E>,
        E: From<SourceError>,
    {
        let mut summary = PartitionSummary {
            window: self.window,
            batch_size: self.batch_size,
            batches: 0,
            records: 0,
        };

        if self.window.is_empty() {
            return Ok(summary);
        }

        let mut current = Vec::with_capacity(self.batch_size);

        for (index, result) in source.records()?.take(self.window.end()).enumerate() {
            let record = result?;
            if !self.window.contains(index) {
                continue;
            }

            current.push(record);
            summary.records += 1;

            if current.len() >= self.batch_size {
                let records = mem::replace(&mut current, Vec::with_capacity(self.batch_size));
                trace!(ordinal = summary.batches, size = records.len(), "Batch full");
                sink(Batch::new(summary.batches, records))?;
                summary.batches += 1;
            }
        }

        // Leftover jobs form one final short batch
        if !current.is_empty() {
            trace!(ordinal = summary.batches, size = current.len(), "Final batch");
            sink(Batch::new(summary.batches, current))?;
            summary.batches += 1;
        }

        debug!(
            batches = summary.batches,
            records = summary.records,
            batch_size = self.batch_size,
            "Partitioning complete"
        );

        Ok(summary)
    }

    /// Collect every batch instead of streaming them to a sink
    pub fn partition<S>(&self, source: &S) -> SourceResult<Vec<Batch>>
    where
        S: RecordSource + ?Sized,
    {
        let mut batches = Vec::new();
        self.run(source, |batch| {
            batches.push(batch);
            Ok::<(), SourceError>(())
        })?;
        Ok(batches)
    }
}
