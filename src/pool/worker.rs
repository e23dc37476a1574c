//! Worker thread logic
//!
//! Each worker:
//! - Owns exactly one frozen job queue
//! - Drains it front to back, invoking the processor on every record
//! - Reports `(k/total)` progress lines in its palette color
//! - Catches processor errors and panics per record and keeps draining
//!
//! Lifecycle: `Created -> Draining -> Terminated`, never back.

use crate::config::ScrapeConfig;
use crate::error::{ProcessError, RecordOutcome, WorkerError};
use crate::pool::palette::color_for;
use crate::pool::queue::JobReceiver;
use crate::processor::{JobContext, Processor};
use crate::progress::ProgressReporter;
use crate::source::Record;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Lifecycle state of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Spawned, holding its queue, not yet draining
    Created = 0,

    /// Taking records off its queue
    Draining = 1,

    /// Queue drained or the thread exited abnormally
    Terminated = 2,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Created,
            1 => WorkerState::Draining,
            _ => WorkerState::Terminated,
        }
    }
}

/// Marks the worker terminated when the thread leaves its loop, even by unwinding
struct TerminateGuard(Arc<AtomicU8>);

impl Drop for TerminateGuard {
    fn drop(&mut self) {
        self.0.store(WorkerState::Terminated as u8, Ordering::SeqCst);
    }
}

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Records the processor accepted
    pub processed: AtomicU64,

    /// Records the processor failed on
    pub failed: AtomicU64,
}

impl WorkerStats {
    fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Final account of one worker, produced at join time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    pub total: usize,
    pub processed: u64,
    pub failed: u64,

    /// Set when the thread itself died rather than draining cleanly
    pub error: Option<String>,
}

impl WorkerReport {
    /// Records that went through the processor, successfully or not
    pub fn handled(&self) -> u64 {
        self.processed + self.failed
    }
}

/// Read-only context shared by every worker of a run
#[derive(Clone)]
pub struct WorkerContext {
    pub config: Arc<ScrapeConfig>,
    pub processor: Arc<dyn Processor>,
    pub progress: ProgressReporter,
}

/// A spawned worker thread
pub struct Worker {
    /// Worker ordinal
    id: usize,

    /// Queue size at spawn time
    total: usize,

    /// Thread handle
    handle: Option<JoinHandle<()>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,

    /// Lifecycle state
    state: Arc<AtomicU8>,
}

impl Worker {
    /// Spawn a worker draining `queue`
    pub fn spawn(id: usize, ctx: WorkerContext, queue: JobReceiver) -> Result<Self, WorkerError> {
        let total = queue.total();
        let stats = Arc::new(WorkerStats::default());
        let state = Arc::new(AtomicU8::new(WorkerState::Created as u8));

        let stats_clone = Arc::clone(&stats);
        let state_clone = Arc::clone(&state);

        let handle = thread::Builder::new()
            .name(format!("scraper-{}", id))
            .spawn(move || worker_loop(id, ctx, queue, stats_clone, state_clone))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            total,
            handle: Some(handle),
            stats,
            state,
        })
    }

    /// Get worker ordinal
    pub fn id(&self) -> usize {
        self.id
    }

    /// Number of jobs the worker was spawned with
    pub fn total(&self) -> usize {
        self.total
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Wait for the worker to finish and collect its report
    pub fn join(mut self) -> WorkerReport {
        let error = match self.handle.take().map(JoinHandle::join) {
            Some(Err(payload)) => {
                let err = WorkerError::Panicked {
                    id: self.id,
                    message: panic_message(payload.as_ref()),
                };
                warn!(worker = self.id, error = %err, "Worker exited abnormally");
                Some(err.to_string())
            }
            _ => None,
        };

        WorkerReport {
            id: self.id,
            total: self.total,
            processed: self.stats.processed(),
            failed: self.stats.failed(),
            error,
        }
    }
}

/// Main worker loop
fn worker_loop(
    id: usize,
    ctx: WorkerContext,
    queue: JobReceiver,
    stats: Arc<WorkerStats>,
    state: Arc<AtomicU8>,
) {
    let _guard = TerminateGuard(Arc::clone(&state));
    let total = queue.total();
    let style = color_for(id).style();

    state.store(WorkerState::Draining as u8, Ordering::SeqCst);
    debug!(worker = id, jobs = total, "Worker starting");
    ctx.progress
        .worker_line(&style, id, &format!("Process started with {} jobs...", total));

    let mut position = 0;
    while let Some(record) = queue.recv() {
        position += 1;

        ctx.progress.worker_line(
            &style,
            id,
            &format!("({}/{}) Processing {}...", position, total, record.name()),
        );

        let job = JobContext {
            worker: id,
            position,
            total,
            verbose: ctx.config.verbose,
        };

        match process_record(ctx.processor.as_ref(), &job, &record) {
            RecordOutcome::Processed { .. } => stats.record_processed(),
            RecordOutcome::Failed { position, error } => {
                stats.record_failed();
                warn!(
                    worker = id,
                    position,
                    name = record.name(),
                    error = %error,
                    "Record failed"
                );
            }
        }

        ctx.progress.inc();
    }

    info!(
        worker = id,
        processed = stats.processed(),
        failed = stats.failed(),
        "Worker finished"
    );
}

/// Run the processor on one record, containing errors and panics
fn process_record(processor: &dyn Processor, job: &JobContext, record: &Record) -> RecordOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| processor.process(job, record)));

    match result {
        Ok(Ok(())) => RecordOutcome::Processed {
            position: job.position,
        },
        Ok(Err(error)) => RecordOutcome::Failed {
            position: job.position,
            error,
        },
        Err(payload) => RecordOutcome::Failed {
            position: job.position,
            error: ProcessError::Panicked {
                message: panic_message(payload.as_ref()),
            },
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::IndexWindow;
    use crate::pool::queue::JobQueue;
    use crate::processor::LogProcessor;
    use std::time::{Duration, Instant};

    fn queue_of(names: &[&str]) -> JobReceiver {
        let queue = JobQueue::new(names.len());
        for name in names {
            queue.push(Record::from_pairs([("name", *name)])).unwrap();
        }
        queue.freeze()
    }

    fn context(processor: Arc<dyn Processor>) -> WorkerContext {
        WorkerContext {
            config: Arc::new(ScrapeConfig::new(1, IndexWindow::full(0))),
            processor,
            progress: ProgressReporter::capture(),
        }
    }

    #[test]
    fn test_worker_stats() {
        let stats = WorkerStats::default();
        stats.record_processed();
        stats.record_processed();
        stats.record_failed();
        assert_eq!(stats.processed(), 2);
        assert_eq!(stats.failed(), 1);
    }

    #[test]
    fn test_worker_drains_in_order() {
        let ctx = context(Arc::new(LogProcessor));
        let progress = ctx.progress.clone();

        let worker = Worker::spawn(2, ctx, queue_of(&["Ada", "Grace", "Linus"])).unwrap();
        assert_eq!(worker.id(), 2);
        assert_eq!(worker.total(), 3);

        let report = worker.join();
        assert_eq!(report.processed, 3);
        assert_eq!(report.failed, 0);
        assert!(report.error.is_none());

        assert_eq!(
            progress.captured(),
            vec![
                "Process 2: \tProcess started with 3 jobs...",
                "Process 2: \t(1/3) Processing Ada...",
                "Process 2: \t(2/3) Processing Grace...",
                "Process 2: \t(3/3) Processing Linus...",
            ]
        );
    }

    #[test]
    fn test_worker_survives_failures_and_panics() {
        let processor = |_: &JobContext, record: &Record| match record.name() {
            "bad" => Err(ProcessError::Failed {
                name: "bad".into(),
                reason: "timeout".into(),
            }),
            "boom" => panic!("processor exploded"),
            _ => Ok(()),
        };

        let worker = Worker::spawn(
            0,
            context(Arc::new(processor)),
            queue_of(&["a", "bad", "boom", "b"]),
        )
        .unwrap();

        let report = worker.join();
        assert_eq!(report.processed, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.handled(), 4);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_worker_state_terminates() {
        let worker = Worker::spawn(0, context(Arc::new(LogProcessor)), queue_of(&["a"])).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while worker.state() != WorkerState::Terminated {
            assert!(Instant::now() < deadline, "worker never terminated");
            thread::sleep(Duration::from_millis(1));
        }

        let report = worker.join();
        assert_eq!(report.processed, 1);
    }

    #[test]
    fn test_state_after_panic_in_loop() {
        let state = Arc::new(AtomicU8::new(WorkerState::Draining as u8));
        let guarded = Arc::clone(&state);
        let result = panic::catch_unwind(move || {
            let _guard = TerminateGuard(guarded);
            panic!("loop died");
        });

        assert!(result.is_err());
        assert_eq!(
            WorkerState::from_u8(state.load(Ordering::SeqCst)),
            WorkerState::Terminated
        );
    }

    #[test]
    fn test_process_record_outcomes() {
        let processor = |_: &JobContext, record: &Record| match record.name() {
            "ok" => Ok(()),
            "bad" => Err(ProcessError::MissingField {
                field: "twitter".into(),
            }),
            _ => panic!("no such journalist"),
        };
        let job = JobContext {
            worker: 0,
            position: 3,
            total: 5,
            verbose: false,
        };

        let outcome = |name: &str| {
            process_record(&processor, &job, &Record::from_pairs([("name", name)]))
        };
        assert_eq!(outcome("ok"), RecordOutcome::Processed { position: 3 });
        assert_eq!(
            outcome("bad"),
            RecordOutcome::Failed {
                position: 3,
                error: ProcessError::MissingField {
                    field: "twitter".into()
                },
            }
        );
        assert_eq!(
            outcome("ghost"),
            RecordOutcome::Failed {
                position: 3,
                error: ProcessError::Panicked {
                    message: "no such journalist".into()
                },
            }
        );
    }

    #[test]
    fn test_worker_empty_queue() {
        let worker = Worker::spawn(0, context(Arc::new(LogProcessor)), queue_of(&[])).unwrap();
        let report = worker.join();
        assert_eq!(report.total, 0);
        assert_eq!(report.handled(), 0);
    }

    #[test]
    fn test_verbose_reaches_processor() {
        let processor = |job: &JobContext, _: &Record| {
            if job.verbose {
                Ok(())
            } else {
                Err(ProcessError::MissingField {
                    field: "verbose".into(),
                })
            }
        };

        let mut config = ScrapeConfig::new(1, IndexWindow::full(0));
        config.verbose = true;
        let ctx = WorkerContext {
            config: Arc::new(config),
            processor: Arc::new(processor),
            progress: ProgressReporter::capture(),
        };

        let report = Worker::spawn(0, ctx, queue_of(&["a", "b"])).unwrap().join();
        assert_eq!(report.processed, 2);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
