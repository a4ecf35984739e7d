//! Depth-1 directory walk and task dispatch
//!
//! The dispatcher visits the root and its immediate children only. For each
//! entry it decides the file type once - directories get the fixed
//! [`DIRECTORY_TYPE`] sentinel, everything else goes through the classifier -
//! then submits one task per matching worker per requested operation.

use crate::classify::{FileClassifier, DIRECTORY_TYPE};
use crate::config::ProcessConfig;
use crate::error::{DispatchOutcome, ProcessError, Result};
use crate::process::pool::{SubmitOutcome, Task, WorkerPool};
use crate::registry::WorkerRegistry;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters describing one walk
#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchStats {
    /// Entries offered to the registry (root plus children)
    pub visited: u64,
    /// Tasks handed to the pool
    pub matched_tasks: u64,
    /// Entries no worker matched for any requested operation
    pub unmatched: u64,
    /// Entries skipped by exclude patterns
    pub skipped: u64,
    /// Children that could not be read or statted
    pub read_errors: u64,
    /// True when the walk saw every entry; false when it stopped early
    pub finished: bool,
}

/// Walks the root directory and feeds the worker pool
pub struct Dispatcher {
    config: Arc<ProcessConfig>,
    registry: Arc<WorkerRegistry>,
    classifier: Arc<dyn FileClassifier>,
    shutdown: Arc<AtomicBool>,
}

impl Dispatcher {
    pub fn new(
        config: Arc<ProcessConfig>,
        registry: Arc<WorkerRegistry>,
        classifier: Arc<dyn FileClassifier>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            registry,
            classifier,
            shutdown,
        }
    }

    /// Visit the root and its direct children, submitting matched tasks
    ///
    /// The root itself is dispatched first. If it is a directory its
    /// children follow, but never their descendants. The walk stops early
    /// when the shutdown flag is raised, `deadline` passes, or the pool
    /// refuses a task; `finished` stays false on those paths.
    pub fn walk(&self, pool: &WorkerPool, deadline: Instant) -> Result<DispatchStats> {
        let root = &self.config.root;
        let metadata = std::fs::metadata(root).map_err(|e| ProcessError::RootUnreadable {
            path: root.clone(),
            reason: e.to_string(),
        })?;

        let mut stats = DispatchStats::default();

        if !metadata.is_dir() {
            let outcome = self.visit_entry(root, false, pool, deadline)?;
            stats.finished = !record(&mut stats, outcome);
            return Ok(stats);
        }

        // Open the directory before dispatching anything, so an unreadable
        // root fails the run with zero tasks submitted.
        let entries = std::fs::read_dir(root).map_err(|e| ProcessError::RootUnreadable {
            path: root.clone(),
            reason: e.to_string(),
        })?;

        let outcome = self.visit_entry(root, true, pool, deadline)?;
        if record(&mut stats, outcome) {
            return Ok(stats);
        }

        for entry in entries {
            if self.shutdown.load(Ordering::Relaxed) {
                tracing::info!("Shutdown requested, stopping walk");
                return Ok(stats);
            }
            if Instant::now() >= deadline {
                tracing::warn!("Run deadline reached, stopping walk");
                return Ok(stats);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read directory entry");
                    stats.read_errors += 1;
                    continue;
                }
            };

            let path = entry.path();
            let is_dir = match entry.file_type() {
                Ok(file_type) => file_type.is_dir(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to stat entry");
                    stats.read_errors += 1;
                    continue;
                }
            };

            let outcome = self.visit_entry(&path, is_dir, pool, deadline)?;
            if record(&mut stats, outcome) {
                return Ok(stats);
            }
        }

        stats.finished = true;
        Ok(stats)
    }

    /// Type one entry, look up workers for every operation, submit tasks
    fn visit_entry(
        &self,
        path: &Path,
        is_dir: bool,
        pool: &WorkerPool,
        deadline: Instant,
    ) -> Result<DispatchOutcome> {
        if self.config.is_excluded(path) {
            return Ok(DispatchOutcome::Skipped {
                path: path.to_path_buf(),
                reason: "matched exclude pattern".to_string(),
            });
        }

        // Directories are typed by the walk itself, never by content.
        let file_type = if is_dir {
            Some(DIRECTORY_TYPE.to_string())
        } else {
            self.classifier.classify(path)
        };

        let mut tasks = 0usize;
        for operation in &self.config.operations {
            let workers = self.registry.lookup(operation, file_type.as_deref());
            for worker in workers.iter() {
                let task = Task {
                    worker: Arc::clone(worker),
                    path: path.to_path_buf(),
                };
                match pool.submit(task, deadline)? {
                    SubmitOutcome::Queued => tasks += 1,
                    SubmitOutcome::Rejected => {
                        return Ok(DispatchOutcome::Rejected {
                            path: path.to_path_buf(),
                            tasks,
                        });
                    }
                }
            }
        }

        if tasks == 0 {
            Ok(DispatchOutcome::Unmatched {
                path: path.to_path_buf(),
                file_type,
            })
        } else {
            Ok(DispatchOutcome::Submitted {
                path: path.to_path_buf(),
                tasks,
            })
        }
    }
}

/// Fold one outcome into the counters; true means the pool refused the
/// entry and the walk must stop
fn record(stats: &mut DispatchStats, outcome: DispatchOutcome) -> bool {
    match outcome {
        DispatchOutcome::Submitted { path, tasks } => {
            stats.visited += 1;
            stats.matched_tasks += tasks as u64;
            tracing::trace!(path = %path.display(), tasks, "Dispatched");
            false
        }
        DispatchOutcome::Unmatched { path, file_type } => {
            stats.visited += 1;
            stats.unmatched += 1;
            tracing::info!(
                path = %path.display(),
                file_type = file_type.as_deref().unwrap_or("unknown"),
                "No worker found for entry"
            );
            false
        }
        DispatchOutcome::Skipped { path, reason } => {
            stats.skipped += 1;
            tracing::debug!(path = %path.display(), reason = %reason, "Skipped");
            false
        }
        DispatchOutcome::Rejected { path, tasks } => {
            stats.visited += 1;
            stats.matched_tasks += tasks as u64;
            tracing::warn!(path = %path.display(), "Gave up submitting tasks, stopping walk");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::InferClassifier;
    use crate::registry::FileWorker;
    use crate::report::{CollectingSink, ReportDetail, WorkerReport};
    use regex::Regex;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    struct RecordingWorker {
        name: &'static str,
        operation: &'static str,
        directories_only: bool,
    }

    impl FileWorker for RecordingWorker {
        fn name(&self) -> &str {
            self.name
        }

        fn can_handle(&self, operation: &str, file_type: Option<&str>) -> bool {
            if operation != self.operation {
                return false;
            }
            let is_dir = file_type == Some(DIRECTORY_TYPE);
            if self.directories_only {
                is_dir
            } else {
                !is_dir
            }
        }

        fn handle(&self, path: &Path) -> WorkerReport {
            WorkerReport::success(path, self.name, ReportDetail::None)
        }
    }

    fn test_config(root: PathBuf, operations: Vec<&str>) -> ProcessConfig {
        ProcessConfig {
            root,
            operations: operations.into_iter().map(String::from).collect(),
            worker_count: 2,
            queue_size: 64,
            timeout: Duration::from_secs(10),
            exclude_patterns: Vec::new(),
            show_summary: false,
            verbose: false,
        }
    }

    fn run_walk(
        config: ProcessConfig,
        registry: Arc<WorkerRegistry>,
    ) -> (DispatchStats, Vec<WorkerReport>) {
        let sink = Arc::new(CollectingSink::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let pool = WorkerPool::start(
            config.worker_count,
            config.queue_size,
            Arc::clone(&sink) as _,
            Arc::clone(&shutdown),
        )
        .unwrap();

        let dispatcher = Dispatcher::new(
            Arc::new(config),
            registry,
            Arc::new(InferClassifier::new()),
            shutdown,
        );
        let stats = dispatcher.walk(&pool, far_deadline()).unwrap();
        let outcome = pool.shutdown(Duration::from_secs(10));
        assert!(outcome.drained);
        (stats, sink.take())
    }

    #[test]
    fn test_walk_dispatches_root_and_children() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        fs::write(dir.path().join("b.txt"), b"world").unwrap();

        let registry = Arc::new(WorkerRegistry::new());
        registry
            .register(Arc::new(RecordingWorker {
                name: "files",
                operation: "scan",
                directories_only: false,
            }))
            .unwrap();
        registry
            .register(Arc::new(RecordingWorker {
                name: "dirs",
                operation: "scan",
                directories_only: true,
            }))
            .unwrap();

        let config = test_config(dir.path().to_path_buf(), vec!["scan"]);
        let (stats, reports) = run_walk(config, registry);

        // Root matched the directory worker, both files the file worker
        assert_eq!(stats.visited, 3);
        assert_eq!(stats.matched_tasks, 3);
        assert_eq!(stats.unmatched, 0);
        assert!(stats.finished);
        assert_eq!(reports.len(), 3);

        let dir_reports: Vec<_> = reports.iter().filter(|r| r.worker == "dirs").collect();
        assert_eq!(dir_reports.len(), 1);
        assert_eq!(dir_reports[0].path, dir.path());
    }

    #[test]
    fn test_walk_is_depth_one() {
        let dir = TempDir::new().unwrap();
        let child = dir.path().join("sub");
        fs::create_dir(&child).unwrap();
        fs::write(child.join("nested.txt"), b"deep").unwrap();

        let registry = Arc::new(WorkerRegistry::new());
        registry
            .register(Arc::new(RecordingWorker {
                name: "any",
                operation: "scan",
                directories_only: false,
            }))
            .unwrap();
        registry
            .register(Arc::new(RecordingWorker {
                name: "dirs",
                operation: "scan",
                directories_only: true,
            }))
            .unwrap();

        let config = test_config(dir.path().to_path_buf(), vec!["scan"]);
        let (stats, reports) = run_walk(config, registry);

        // Root and sub, never nested.txt
        assert_eq!(stats.visited, 2);
        assert!(reports.iter().all(|r| !r.path.ends_with("nested.txt")));
    }

    #[test]
    fn test_unmatched_entries_are_counted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("orphan.txt"), b"no one wants me").unwrap();

        let registry = Arc::new(WorkerRegistry::new());
        registry
            .register(Arc::new(RecordingWorker {
                name: "dirs",
                operation: "scan",
                directories_only: true,
            }))
            .unwrap();

        let config = test_config(dir.path().to_path_buf(), vec!["scan"]);
        let (stats, reports) = run_walk(config, registry);

        assert_eq!(stats.visited, 2);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_exclude_pattern_skips_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("keep.txt"), b"keep").unwrap();
        fs::write(dir.path().join("skip.tmp"), b"skip").unwrap();

        let registry = Arc::new(WorkerRegistry::new());
        registry
            .register(Arc::new(RecordingWorker {
                name: "files",
                operation: "scan",
                directories_only: false,
            }))
            .unwrap();
        registry
            .register(Arc::new(RecordingWorker {
                name: "dirs",
                operation: "scan",
                directories_only: true,
            }))
            .unwrap();

        let mut config = test_config(dir.path().to_path_buf(), vec!["scan"]);
        config.exclude_patterns = vec![Regex::new(r"\.tmp$").unwrap()];
        let (stats, reports) = run_walk(config, registry);

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.visited, 2);
        assert!(reports.iter().all(|r| !r.path.ends_with("skip.tmp")));
    }

    #[test]
    fn test_file_root_is_dispatched_alone() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("single.txt");
        fs::write(&file, b"alone").unwrap();

        let registry = Arc::new(WorkerRegistry::new());
        registry
            .register(Arc::new(RecordingWorker {
                name: "files",
                operation: "scan",
                directories_only: false,
            }))
            .unwrap();

        let config = test_config(file.clone(), vec!["scan"]);
        let (stats, reports) = run_walk(config, registry);

        assert_eq!(stats.visited, 1);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, file);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let registry = Arc::new(WorkerRegistry::new());
        let config = test_config(PathBuf::from("/nonexistent/road"), vec!["scan"]);

        let sink = Arc::new(CollectingSink::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let pool = WorkerPool::start(1, 16, sink as _, Arc::clone(&shutdown)).unwrap();
        let dispatcher = Dispatcher::new(
            Arc::new(config),
            registry,
            Arc::new(InferClassifier::new()),
            shutdown,
        );

        let err = dispatcher.walk(&pool, far_deadline()).unwrap_err();
        assert!(matches!(err, ProcessError::RootUnreadable { .. }));
        pool.shutdown(Duration::from_secs(5));
    }

    #[test]
    fn test_duplicate_operations_dispatch_twice() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("twice.txt"), b"again").unwrap();

        let registry = Arc::new(WorkerRegistry::new());
        registry
            .register(Arc::new(RecordingWorker {
                name: "files",
                operation: "scan",
                directories_only: false,
            }))
            .unwrap();
        registry
            .register(Arc::new(RecordingWorker {
                name: "dirs",
                operation: "scan",
                directories_only: true,
            }))
            .unwrap();

        let config = test_config(dir.path().to_path_buf(), vec!["scan", "scan"]);
        let (stats, reports) = run_walk(config, registry);

        // Each occurrence of the operation dispatches independently
        assert_eq!(stats.matched_tasks, 4);
        assert_eq!(reports.len(), 4);
    }
}
