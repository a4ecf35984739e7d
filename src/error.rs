//! Error types for fileproc
//!
//! This module defines the error hierarchy covering:
//! - Configuration and CLI errors
//! - Worker registry misuse
//! - Traversal and worker pool errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include context about what to do
//! - Per-task failures are reports, not errors; only pipeline-level
//!   problems surface here

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the fileproc application
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker registry misuse
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Worker pool errors
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    /// The entry point of the walk could not be read
    #[error("Failed to read root '{path}': {reason}")]
    RootUnreadable { path: PathBuf, reason: String },

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Root path missing or inaccessible
    #[error("Invalid root '{path}': {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// No operations requested
    #[error("No operations requested: pass at least one with -o")]
    EmptyOperations,

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid queue size
    #[error("Invalid queue size {size}: must be at least {min}")]
    InvalidQueueSize { size: usize, min: usize },

    /// Invalid run timeout
    #[error("Invalid timeout {secs}s: must be at least 1 second")]
    InvalidTimeout { secs: u64 },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },
}

/// Worker registry misuse
///
/// The registry accepts registrations only until the first lookup; the
/// memoized match sets would go stale otherwise.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Registration attempted after the registry answered a lookup
    #[error("Cannot register worker '{name}': all workers must be registered before the first lookup")]
    RegisteredAfterLookup { name: String },
}

/// Worker pool errors
#[derive(Error, Debug)]
pub enum PoolError {
    /// Worker thread could not be spawned
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Task queue closed while the traversal was still submitting
    #[error("Task queue closed before submission finished")]
    QueueClosed,
}

/// Result type alias for ProcessError
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Result type alias for RegistryError
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Result type alias for PoolError
pub type PoolResult<T> = std::result::Result<T, PoolError>;

/// Outcome of dispatching a single visited entry
#[derive(Debug)]
pub enum DispatchOutcome {
    /// At least one worker matched; tasks were handed to the pool
    Submitted { path: PathBuf, tasks: usize },

    /// No worker matched any requested operation for this entry
    Unmatched {
        path: PathBuf,
        file_type: Option<String>,
    },

    /// Entry was not considered (exclude pattern)
    Skipped { path: PathBuf, reason: String },

    /// Pool gave up queueing mid-entry; `tasks` counts what got through
    Rejected { path: PathBuf, tasks: usize },
}

impl DispatchOutcome {
    /// Returns true if this outcome produced at least one task
    pub fn is_submitted(&self) -> bool {
        matches!(self, DispatchOutcome::Submitted { .. })
    }

    /// Returns the path associated with this outcome
    pub fn path(&self) -> &PathBuf {
        match self {
            DispatchOutcome::Submitted { path, .. } => path,
            DispatchOutcome::Unmatched { path, .. } => path,
            DispatchOutcome::Skipped { path, .. } => path,
            DispatchOutcome::Rejected { path, .. } => path,
        }
    }
}
