//! fileproc - Pluggable File Processing Pipeline
//!
//! A tool that walks a directory one level deep and applies registered
//! workers to every entry, concurrently. Workers advertise which operations
//! they perform and which file types they accept; the pipeline matches them
//! to entries and collects one report per executed task.
//!
//! # Features
//!
//! - **Pluggable Workers**: Operations and file types are plain strings,
//!   so new workers drop in without touching the dispatch core.
//!
//! - **Memoized Matching**: Worker lookups are computed once per
//!   (operation, type) pair and reused for every entry after that.
//!
//! - **Parallel Execution**: A fixed thread pool with a bounded queue
//!   applies backpressure instead of growing memory on large directories.
//!
//! - **Contained Failures**: A worker that fails, or even panics, produces
//!   a failure report; the rest of the run is unaffected.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Root Directory                         │
//! │                 (root + immediate children)                  │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ stat + classify
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Dispatcher                           │
//! │   entry type ──► WorkerRegistry.lookup(operation, type)      │
//! │                  (memoized per key, one task per match)      │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ bounded queue (crossbeam)
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Worker Pool                           │
//! │   ┌─────────┐  ┌─────────┐  ┌─────────┐      ┌─────────┐     │
//! │   │Worker 1 │  │Worker 2 │  │Worker 3 │ ...  │Worker N │     │
//! │   └────┬────┘  └────┬────┘  └────┬────┘      └────┬────┘     │
//! │        └────────────┴─────┬──────┴────────────────┘          │
//! │                           ▼                                  │
//! │                    ┌────────────┐                            │
//! │                    │ ReportSink │                            │
//! │                    └────────────┘                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Size every file and list every directory under /data
//! fileproc -d /data -o dir,sizeof
//!
//! # More workers, skip temp files
//! fileproc -d /data -o sizeof -w 16 --exclude '\.tmp$'
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod process;
pub mod registry;
pub mod report;
pub mod summary;
pub mod workers;

pub use classify::{FileClassifier, InferClassifier, DIRECTORY_TYPE};
pub use config::{CliArgs, ProcessConfig};
pub use error::{ProcessError, Result};
pub use process::{FileProcessor, RunOutcome, RunStats};
pub use registry::{FileWorker, WorkerRegistry, WorkerSet};
pub use report::{ReportSink, WorkerReport};
