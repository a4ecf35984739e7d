//! Fixed-size worker thread pool
//!
//! Tasks flow through a bounded crossbeam channel: when the queue is full,
//! [`WorkerPool::submit`] waits in short slices and gives up at the run
//! deadline or on shutdown rather than parking until a worker finishes.
//! Each pool thread loops on a short receive timeout so it can notice the
//! shutdown flag even when the queue is idle.

use crate::error::{PoolError, PoolResult};
use crate::registry::FileWorker;
use crate::report::{ReportSink, WorkerReport};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const RECV_TIMEOUT: Duration = Duration::from_millis(100);
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const SUBMIT_RETRY: Duration = Duration::from_millis(100);

/// One unit of work: a worker applied to a path
pub struct Task {
    pub worker: Arc<dyn FileWorker>,
    pub path: PathBuf,
}

/// Outcome of a [`WorkerPool::submit`] attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Task is on the queue
    Queued,
    /// Pool gave up before the task was queued; the task is dropped
    Rejected,
}

/// Counters shared between producers and pool threads
#[derive(Default)]
struct PoolStats {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Result of draining the pool at shutdown
#[derive(Debug, Clone, Copy)]
pub struct PoolOutcome {
    /// Whether every submitted task finished before the deadline
    pub drained: bool,
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
}

/// Pool of threads executing [`Task`]s and delivering reports to a sink
pub struct WorkerPool {
    sender: Option<Sender<Task>>,
    handles: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    /// Spawn `worker_count` threads reading from a queue of `queue_size`
    pub fn start(
        worker_count: usize,
        queue_size: usize,
        sink: Arc<dyn ReportSink>,
        shutdown: Arc<AtomicBool>,
    ) -> PoolResult<Self> {
        let (sender, receiver) = bounded::<Task>(queue_size);
        let stats = Arc::new(PoolStats::default());

        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let receiver = receiver.clone();
            let sink = Arc::clone(&sink);
            let shutdown = Arc::clone(&shutdown);
            let stats = Arc::clone(&stats);

            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker_loop(id, receiver, sink, shutdown, stats))
                .map_err(|e| PoolError::SpawnFailed {
                    id,
                    reason: e.to_string(),
                })?;
            handles.push(handle);
        }

        Ok(Self {
            sender: Some(sender),
            handles,
            shutdown,
            stats,
        })
    }

    /// Queue a task, waiting in short slices while the queue is full
    ///
    /// Backpressure never outlasts the run: each wait slice rechecks the
    /// shutdown flag and `deadline`, and the attempt gives up with
    /// [`SubmitOutcome::Rejected`] when either fires before space opens.
    pub fn submit(&self, mut task: Task, deadline: Instant) -> PoolResult<SubmitOutcome> {
        let sender = self.sender.as_ref().ok_or(PoolError::QueueClosed)?;
        loop {
            if self.shutdown.load(Ordering::Relaxed) || Instant::now() >= deadline {
                return Ok(SubmitOutcome::Rejected);
            }
            match sender.send_timeout(task, SUBMIT_RETRY) {
                Ok(()) => {
                    self.stats.submitted.fetch_add(1, Ordering::Relaxed);
                    return Ok(SubmitOutcome::Queued);
                }
                Err(SendTimeoutError::Timeout(returned)) => task = returned,
                Err(SendTimeoutError::Disconnected(_)) => {
                    // Workers already gone. During shutdown that is the
                    // normal truncation path, otherwise the pool is broken.
                    if self.shutdown.load(Ordering::Relaxed) {
                        return Ok(SubmitOutcome::Rejected);
                    }
                    return Err(PoolError::QueueClosed);
                }
            }
        }
    }

    pub fn submitted(&self) -> u64 {
        self.stats.submitted.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.stats.completed.load(Ordering::Relaxed)
    }

    /// Stop accepting tasks and wait up to `timeout` for the queue to drain
    ///
    /// If the deadline passes or the shutdown flag is raised, in-flight
    /// tasks finish on their own but are no longer waited on.
    pub fn shutdown(mut self, timeout: Duration) -> PoolOutcome {
        // Dropping the sender disconnects the channel once drained, which
        // lets idle threads exit without waiting out the deadline.
        drop(self.sender.take());

        let deadline = Instant::now() + timeout;
        let drained = loop {
            let submitted = self.stats.submitted.load(Ordering::Relaxed);
            let completed = self.stats.completed.load(Ordering::Relaxed);
            if completed >= submitted {
                break true;
            }
            if self.shutdown.load(Ordering::Relaxed) {
                tracing::warn!(
                    remaining = submitted - completed,
                    "Shutdown requested, abandoning queued tasks"
                );
                break false;
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    remaining = submitted - completed,
                    timeout_secs = timeout.as_secs(),
                    "Drain timeout reached, abandoning queued tasks"
                );
                break false;
            }
            thread::sleep(POLL_INTERVAL);
        };

        if drained {
            for handle in self.handles.drain(..) {
                if handle.join().is_err() {
                    tracing::warn!("Worker thread panicked outside task execution");
                }
            }
        } else {
            // Raise the flag so threads stop pulling from the queue, then
            // detach rather than block on tasks mid-execution.
            self.shutdown.store(true, Ordering::SeqCst);
            self.handles.clear();
        }

        PoolOutcome {
            drained,
            submitted: self.stats.submitted.load(Ordering::Relaxed),
            completed: self.stats.completed.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
        }
    }
}

fn worker_loop(
    id: usize,
    receiver: Receiver<Task>,
    sink: Arc<dyn ReportSink>,
    shutdown: Arc<AtomicBool>,
    stats: Arc<PoolStats>,
) {
    tracing::debug!(worker_id = id, "Worker thread started");

    while !shutdown.load(Ordering::Relaxed) {
        let task = match receiver.recv_timeout(RECV_TIMEOUT) {
            Ok(task) => task,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let report = run_task(&task);
        let failed = !report.success;
        // Deliver before counting completion, so completed == submitted
        // implies every report has reached the sink.
        sink.accept(report);
        if failed {
            stats.failed.fetch_add(1, Ordering::Relaxed);
        }
        stats.completed.fetch_add(1, Ordering::Relaxed);
    }

    tracing::debug!(worker_id = id, "Worker thread exiting");
}

/// Execute one task, converting panics into failure reports
fn run_task(task: &Task) -> WorkerReport {
    let result = panic::catch_unwind(AssertUnwindSafe(|| task.worker.handle(&task.path)));

    match result {
        Ok(report) => report,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else {
                "worker panicked".to_string()
            };
            tracing::warn!(
                worker = task.worker.name(),
                path = %task.path.display(),
                error = %message,
                "Worker panicked while handling file"
            );
            WorkerReport::failure(&task.path, task.worker.name(), message)
        }
    }
}
