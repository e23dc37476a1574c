//! Per-worker job queues
//!
//! Each worker owns exactly one queue. The partitioner fills it, then
//! [`JobQueue::freeze`] drops the sending side and hands the receiver to
//! the worker. Once frozen nothing can be written, so the worker sees
//! disconnect (not a transient empty) as the end of its batch.

use crate::error::WorkerError;
use crate::partition::Batch;
use crate::source::Record;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Statistics for a job queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total jobs enqueued
    pub enqueued: AtomicU64,

    /// Total jobs dequeued
    pub dequeued: AtomicU64,
}

impl QueueStats {
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }
}

/// Bounded single-producer, single-consumer job queue
pub struct JobQueue {
    sender: Sender<Record>,
    receiver: Receiver<Record>,
    capacity: usize,
    stats: Arc<QueueStats>,
}

impl JobQueue {
    /// Create an empty queue holding at most `capacity` jobs
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);

        Self {
            sender,
            receiver,
            capacity,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Fill a queue with every record of `batch` and freeze it
    pub fn from_batch(batch: Batch) -> Result<JobReceiver, WorkerError> {
        let queue = Self::new(batch.len());
        for record in batch.into_records() {
            queue.push(record)?;
        }
        Ok(queue.freeze())
    }

    /// Add a job without blocking
    pub fn push(&self, record: Record) -> Result<(), WorkerError> {
        match self.sender.try_send(record) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            // The receiver lives in self, so only Full is reachable
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                Err(WorkerError::QueueFull {
                    capacity: self.capacity,
                })
            }
        }
    }

    /// Close the producing side and return the consumer handle
    pub fn freeze(self) -> JobReceiver {
        let Self {
            sender,
            receiver,
            stats,
            ..
        } = self;
        drop(sender);

        JobReceiver {
            total: receiver.len(),
            receiver,
            stats,
        }
    }
}

/// Consumer side of a frozen job queue
pub struct JobReceiver {
    receiver: Receiver<Record>,
    total: usize,
    stats: Arc<QueueStats>,
}

impl JobReceiver {
    /// Number of jobs in the queue when it was frozen
    pub fn total(&self) -> usize {
        self.total
    }

    /// Jobs not yet taken
    pub fn remaining(&self) -> usize {
        self.receiver.len()
    }

    /// Take the next job, `None` once the queue is drained
    pub fn recv(&self) -> Option<Record> {
        match self.receiver.recv() {
            Ok(record) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(record)
            }
            Err(_) => None,
        }
    }

    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}
