//! Scrape coordinator - orchestrates the partitioned run
//!
//! The coordinator is responsible for:
//! - Selecting the index window against the record count
//! - Spawning one worker per batch as the partitioner emits it
//! - Joining every worker (the join barrier)
//! - Final statistics

use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::partition::{Batch, IndexWindow, Partitioner};
use crate::pool::queue::JobQueue;
use crate::pool::worker::{Worker, WorkerContext, WorkerReport};
use crate::processor::Processor;
use crate::progress::ProgressReporter;
use crate::source::RecordSource;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    /// Clamped window that was processed
    pub window: IndexWindow,

    /// Target batch size
    pub batch_size: usize,

    /// Records in the window
    pub jobs: usize,

    /// Records the processor accepted
    pub processed: u64,

    /// Records the processor failed on
    pub failed: u64,

    /// Workers spawned
    pub workers: usize,

    /// Workers whose thread died abnormally
    pub abnormal_exits: usize,

    /// Per-worker reports in spawn order
    pub reports: Vec<WorkerReport>,

    /// Time from the run start to the end of the join barrier
    pub duration: Duration,
}

impl ScrapeResult {
    /// Average time per job, `None` when there were no jobs
    pub fn avg_per_job(&self) -> Option<Duration> {
        if self.jobs == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(
            self.duration.as_secs_f64() / self.jobs as f64,
        ))
    }
}

/// Coordinates a partitioned run over a record source
pub struct ScrapeCoordinator<S> {
    /// Configuration
    config: Arc<ScrapeConfig>,

    /// Record source
    source: S,

    /// Per-record processor
    processor: Arc<dyn Processor>,

    /// Progress sink override
    progress: Option<ProgressReporter>,

    /// Start instant override, so elapsed time can cover work done before `run`
    start_time: Option<Instant>,
}

impl<S: RecordSource> ScrapeCoordinator<S> {
    /// Create a new coordinator
    pub fn new(config: ScrapeConfig, source: S, processor: Arc<dyn Processor>) -> Self {
        Self {
            config: Arc::new(config),
            source,
            processor,
            progress: None,
            start_time: None,
        }
    }

    /// Send worker lines to `progress` instead of choosing from the config
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Measure elapsed time from `start` instead of from the call to `run`
    pub fn started_at(mut self, start: Instant) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Run the partitioned scrape to completion
    pub fn run(mut self) -> Result<ScrapeResult> {
        let start_time = self.start_time.take().unwrap_or_else(Instant::now);
        let start_datetime: DateTime<Utc> = Utc::now();

        let partitioner =
            Partitioner::select(&self.source, self.config.window, self.config.worker_count)?;
        let window = partitioner.window();

        info!(
            window = %window,
            jobs = window.len(),
            workers = self.config.worker_count,
            batch_size = partitioner.batch_size(),
            "Starting scrape"
        );
        debug!(start_time = %start_datetime.to_rfc3339(), "Run started");

        let progress = match self.progress.take() {
            Some(progress) => progress,
            None if self.config.show_progress => ProgressReporter::with_bar(window.len() as u64),
            None => ProgressReporter::stdout(),
        };

        let ctx = WorkerContext {
            config: Arc::clone(&self.config),
            processor: Arc::clone(&self.processor),
            progress: progress.clone(),
        };

        // Spawning is interleaved with the partitioning pass
        let mut workers = Vec::new();
        let partitioned = partitioner.run(&self.source, |batch| {
            spawn_worker(&ctx, &mut workers, batch)
        });

        // Join whatever was spawned, even if the pass failed part way
        let reports = join_workers(workers);
        progress.finish();
        let summary = partitioned?;

        let duration = start_time.elapsed();
        let processed: u64 = reports.iter().map(|r| r.processed).sum();
        let failed: u64 = reports.iter().map(|r| r.failed).sum();
        let abnormal_exits = reports.iter().filter(|r| r.error.is_some()).count();

        info!(
            jobs = summary.records,
            processed = processed,
            failed = failed,
            workers = reports.len(),
            duration_secs = duration.as_secs_f64(),
            "Scrape completed"
        );

        Ok(ScrapeResult {
            window,
            batch_size: summary.batch_size,
            jobs: summary.records,
            processed,
            failed,
            workers: reports.len(),
            abnormal_exits,
            reports,
            duration,
        })
    }
}

/// Freeze a batch into a queue and spawn its worker
fn spawn_worker(ctx: &WorkerContext, workers: &mut Vec<Worker>, batch: Batch) -> Result<()> {
    let ordinal = workers.len();
    let queue = JobQueue::from_batch(batch)?;

    let worker = Worker::spawn(ordinal, ctx.clone(), queue)?;
    debug!(worker = worker.id(), jobs = worker.total(), "Worker spawned");

    workers.push(worker);
    Ok(())
}

/// Join barrier: wait for every worker, whatever order they finish in
fn join_workers(workers: Vec<Worker>) -> Vec<WorkerReport> {
    let count = workers.len();
    let reports: Vec<WorkerReport> = workers.into_iter().map(Worker::join).collect();

    for report in reports.iter().filter(|r| r.handled() < r.total as u64) {
        warn!(
            worker = report.id,
            handled = report.handled(),
            total = report.total,
            "Worker did not drain its queue"
        );
    }

    debug!(count, "All workers joined");
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessError;
    use crate::processor::{JobContext, LogProcessor};
    use crate::source::{MemorySource, Record};
    use std::sync::Mutex;
    use std::thread;

    fn run(total: usize, start: usize, end: usize, workers: usize) -> ScrapeResult {
        let config = ScrapeConfig::new(workers, IndexWindow::new(start, end).unwrap());
        ScrapeCoordinator::new(config, MemorySource::synthetic(total), Arc::new(LogProcessor))
            .with_progress(ProgressReporter::capture())
            .run()
            .unwrap()
    }

    #[test]
    fn test_avg_per_job() {
        let mut result = run(0, 0, 0, 1);
        assert_eq!(result.avg_per_job(), None);

        result.jobs = 4;
        result.duration = Duration::from_secs(2);
        assert_eq!(result.avg_per_job(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_middle_window() {
        let result = run(10, 2, 8, 3);
        assert_eq!(result.jobs, 6);
        assert_eq!(result.workers, 3);
        assert_eq!(result.batch_size, 2);
        let totals: Vec<_> = result.reports.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![2, 2, 2]);
        assert_eq!(result.processed, 6);
    }

    #[test]
    fn test_full_window_remainder() {
        let result = run(10, 0, 10, 4);
        let totals: Vec<_> = result.reports.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![3, 3, 3, 1]);
        assert_eq!(result.workers, 4);
    }

    #[test]
    fn test_empty_window() {
        let result = run(5, 5, 5, 3);
        assert_eq!(result.jobs, 0);
        assert_eq!(result.workers, 0);
        assert_eq!(result.processed, 0);
        assert!(result.avg_per_job().is_none());
    }

    #[test]
    fn test_each_record_visited_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let processor = move |job: &JobContext, record: &Record| -> std::result::Result<(), ProcessError> {
            seen_clone
                .lock()
                .unwrap()
                .push((job.worker, record.name().to_string()));
            Ok(())
        };

        let config = ScrapeConfig::new(4, IndexWindow::new(0, 17).unwrap());
        let result = ScrapeCoordinator::new(config, MemorySource::synthetic(17), Arc::new(processor))
            .with_progress(ProgressReporter::capture())
            .run()
            .unwrap();
        assert_eq!(result.processed, 17);

        let mut seen = seen.lock().unwrap().clone();
        seen.sort_by_key(|(worker, name)| {
            let index: usize = name.trim_start_matches("journalist-").parse().unwrap();
            (*worker, index)
        });
        let names: Vec<_> = seen.iter().map(|(_, name)| name.clone()).collect();
        let expected: Vec<_> = (0..17).map(|i| format!("journalist-{}", i)).collect();
        assert_eq!(names, expected);

        // ceil(17/4) = 5: workers 0..=2 get 5 each, worker 3 gets 2
        assert!(seen[..5].iter().all(|(w, _)| *w == 0));
        assert!(seen[15..].iter().all(|(w, _)| *w == 3));
    }

    #[test]
    fn test_barrier_waits_for_slow_worker() {
        // Worker 0 is the slowest, so join order differs from completion order
        let processor = |job: &JobContext, _: &Record| -> std::result::Result<(), ProcessError> {
            if job.worker == 0 {
                thread::sleep(Duration::from_millis(50));
            }
            Ok(())
        };

        let config = ScrapeConfig::new(3, IndexWindow::full(6));
        let result = ScrapeCoordinator::new(config, MemorySource::synthetic(6), Arc::new(processor))
            .with_progress(ProgressReporter::capture())
            .run()
            .unwrap();

        assert_eq!(result.processed, 6);
        assert!(result.duration >= Duration::from_millis(100));
        assert!(result.reports.iter().all(|r| r.handled() == r.total as u64));
    }

    #[test]
    fn test_failures_stay_local() {
        let processor = |_: &JobContext, record: &Record| {
            if record.name() == "journalist-1" {
                return Err(ProcessError::Failed {
                    name: record.name().to_string(),
                    reason: "unreachable".into(),
                });
            }
            Ok(())
        };

        let config = ScrapeConfig::new(2, IndexWindow::full(4));
        let result = ScrapeCoordinator::new(config, MemorySource::synthetic(4), Arc::new(processor))
            .with_progress(ProgressReporter::capture())
            .run()
            .unwrap();

        assert_eq!(result.processed, 3);
        assert_eq!(result.failed, 1);
        assert_eq!(result.reports[0].failed, 1);
        assert_eq!(result.reports[1].failed, 0);
        assert_eq!(result.abnormal_exits, 0);
    }

    #[test]
    fn test_elapsed_counts_from_given_start() {
        let earlier = Instant::now() - Duration::from_millis(200);
        let config = ScrapeConfig::new(2, IndexWindow::full(4));
        let result = ScrapeCoordinator::new(config, MemorySource::synthetic(4), Arc::new(LogProcessor))
            .with_progress(ProgressReporter::capture())
            .started_at(earlier)
            .run()
            .unwrap();

        assert!(result.duration >= Duration::from_millis(200));
        assert!(result.avg_per_job().unwrap() >= Duration::from_millis(50));
    }

    #[test]
    fn test_progress_lines_per_worker() {
        let progress = ProgressReporter::capture();
        let config = ScrapeConfig::new(2, IndexWindow::full(3));
        ScrapeCoordinator::new(config, MemorySource::synthetic(3), Arc::new(LogProcessor))
            .with_progress(progress.clone())
            .run()
            .unwrap();

        let lines = progress.captured();
        let worker_1: Vec<_> = lines
            .iter()
            .filter(|l| l.starts_with("Process 1:"))
            .cloned()
            .collect();
        assert_eq!(
            worker_1,
            vec![
                "Process 1: \tProcess started with 1 jobs...",
                "Process 1: \t(1/1) Processing journalist-2...",
            ]
        );
        assert_eq!(lines.len(), 2 + 3);
    }
}
