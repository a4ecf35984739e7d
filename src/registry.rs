//! Worker registry with memoized capability lookups
//!
//! Workers advertise the operations they perform and the file types they
//! accept through [`FileWorker::can_handle`]. Operations and types are plain
//! strings rather than enums: new workers can be added without touching the
//! core, at the cost of compile-time type safety.
//!
//! Lookups are memoized per (operation, type) pair. The memo relies on the
//! worker set being fixed, so the registry refuses registrations once any
//! lookup has been answered - including a lookup that matched nothing.

use crate::error::{RegistryError, RegistryResult};
use crate::report::WorkerReport;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A pluggable unit of work
///
/// Implementations are stateless: they are registered once at startup,
/// shared across worker threads for the whole run, and never mutated.
pub trait FileWorker: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Whether this worker performs `operation` on files of `file_type`
    ///
    /// `file_type` is `None` when classification failed, which is a valid
    /// input rather than an error. Must be pure: the result is memoized.
    fn can_handle(&self, operation: &str, file_type: Option<&str>) -> bool;

    /// Run the operation against `path`, producing exactly one report
    ///
    /// May block on I/O. Failures are expressed in the report, not panics.
    fn handle(&self, path: &Path) -> WorkerReport;
}

/// Memoized set of workers matching one (operation, type) pair
pub type WorkerSet = Arc<Vec<Arc<dyn FileWorker>>>;

type LookupKey = (String, Option<String>);

/// Registry of all available workers
///
/// Thread-safe: lookups may race freely. When two threads miss the memo on
/// the same key at once, one computed set is stored and the loser returns
/// the stored one.
#[derive(Default)]
pub struct WorkerRegistry {
    workers: RwLock<Vec<Arc<dyn FileWorker>>>,
    memo: RwLock<HashMap<LookupKey, WorkerSet>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a worker
    ///
    /// Fails once any lookup has been answered, because memoized sets would
    /// not include the new worker.
    pub fn register(&self, worker: Arc<dyn FileWorker>) -> RegistryResult<()> {
        // No lookup can cache a result while this guard is held, so the
        // closed-check stays valid through the push. Callers register
        // every worker before the first lookup; the guard does not order
        // a racing lookup's scan against the push.
        let memo = read(&self.memo);
        if !memo.is_empty() {
            return Err(RegistryError::RegisteredAfterLookup {
                name: worker.name().to_string(),
            });
        }

        write(&self.workers).push(worker);
        Ok(())
    }

    /// All workers that perform `operation` on files of `file_type`
    ///
    /// The returned set is the memoized instance: repeated lookups with the
    /// same key return the same allocation. Empty results are memoized too,
    /// so the very first lookup closes registration.
    pub fn lookup(&self, operation: &str, file_type: Option<&str>) -> WorkerSet {
        let key: LookupKey = (operation.to_string(), file_type.map(str::to_string));

        if let Some(set) = read(&self.memo).get(&key) {
            return Arc::clone(set);
        }

        // Scan outside the memo lock; a racing thread may scan too, but
        // only one result is stored below.
        let matched: Vec<Arc<dyn FileWorker>> = read(&self.workers)
            .iter()
            .filter(|worker| worker.can_handle(operation, file_type))
            .map(Arc::clone)
            .collect();

        let mut memo = write(&self.memo);
        Arc::clone(memo.entry(key).or_insert_with(|| Arc::new(matched)))
    }

    /// Number of registered workers
    pub fn worker_count(&self) -> usize {
        read(&self.workers).len()
    }

    /// Whether registration has been closed by a lookup
    pub fn is_closed(&self) -> bool {
        !read(&self.memo).is_empty()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
