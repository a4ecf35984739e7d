//! End-to-end run orchestration
//!
//! Wires the dispatcher, worker pool and report sink together for a single
//! run: start the pool, walk the root, then drain, all against one run
//! deadline. A run that hits the deadline or a shutdown request is
//! truncated, not failed - every report already delivered stands.

use crate::classify::FileClassifier;
use crate::config::ProcessConfig;
use crate::error::Result;
use crate::process::dispatcher::Dispatcher;
use crate::process::pool::WorkerPool;
use crate::registry::WorkerRegistry;
use crate::report::ReportSink;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counters for one completed (or truncated) run
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    /// Entries offered to the registry
    pub visited: u64,
    /// Entries skipped by exclude patterns
    pub skipped: u64,
    /// Entries that matched no worker
    pub unmatched: u64,
    /// Children that could not be read or statted
    pub read_errors: u64,
    /// Tasks handed to the pool
    pub submitted: u64,
    /// Tasks whose report reached the sink
    pub completed: u64,
    /// Tasks that produced a failure report
    pub failed: u64,
    /// Wall time for the whole run
    pub elapsed: Duration,
}

/// Final disposition of a run
#[derive(Debug, Clone, Copy)]
pub struct RunOutcome {
    /// The walk saw every entry and every task delivered its report
    pub completed: bool,
    /// The run deadline passed or shutdown was requested
    pub truncated: bool,
    pub stats: RunStats,
}

/// Single-run coordinator
pub struct FileProcessor {
    config: Arc<ProcessConfig>,
    registry: Arc<WorkerRegistry>,
    classifier: Arc<dyn FileClassifier>,
    sink: Arc<dyn ReportSink>,
    shutdown: Arc<AtomicBool>,
}

impl FileProcessor {
    pub fn new(
        config: ProcessConfig,
        registry: Arc<WorkerRegistry>,
        classifier: Arc<dyn FileClassifier>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            classifier,
            sink,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag observed by the walk and the pool; raise it to stop early
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Walk the root, run every matched task, drain and report
    ///
    /// One deadline covers the whole run: submission waits are bounded
    /// by it and the drain gets whatever remains after the walk.
    pub fn run(&self) -> Result<RunOutcome> {
        let started = Instant::now();
        let deadline = started + self.config.timeout;
        tracing::info!(
            root = %self.config.root.display(),
            operations = ?self.config.operations,
            workers = self.config.worker_count,
            "Starting run"
        );

        let pool = WorkerPool::start(
            self.config.worker_count,
            self.config.queue_size,
            Arc::clone(&self.sink),
            Arc::clone(&self.shutdown),
        )?;

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.config),
            Arc::clone(&self.registry),
            Arc::clone(&self.classifier),
            Arc::clone(&self.shutdown),
        );

        // Always drain the pool, even when the walk failed partway, so
        // already-submitted tasks still deliver their reports.
        let walk_result = dispatcher.walk(&pool, deadline);
        let pool_outcome = pool.shutdown(deadline.saturating_duration_since(Instant::now()));
        let dispatch = walk_result?;

        let interrupted = self.shutdown.load(std::sync::atomic::Ordering::Relaxed);
        let completed = pool_outcome.drained && dispatch.finished && !interrupted;

        let stats = RunStats {
            visited: dispatch.visited,
            skipped: dispatch.skipped,
            unmatched: dispatch.unmatched,
            read_errors: dispatch.read_errors,
            submitted: pool_outcome.submitted,
            completed: pool_outcome.completed,
            failed: pool_outcome.failed,
            elapsed: started.elapsed(),
        };

        if completed {
            tracing::info!(
                visited = stats.visited,
                tasks = stats.submitted,
                failed = stats.failed,
                elapsed_ms = stats.elapsed.as_millis() as u64,
                "Run complete"
            );
        } else {
            tracing::warn!(
                completed = stats.completed,
                submitted = stats.submitted,
                "Run truncated"
            );
        }

        Ok(RunOutcome {
            completed,
            truncated: !completed,
            stats,
        })
    }
}
