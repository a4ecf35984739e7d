//! Worker reports and report sinks
//!
//! Every task execution produces exactly one [`WorkerReport`], delivered to a
//! [`ReportSink`] from the worker thread that ran the task. Sinks must not
//! block indefinitely and must contain their own failures; a sink problem
//! never propagates back into the pipeline.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// Kind of a single entry inside a directory listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    /// The entry's type could not be read
    Unknown,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: EntryKind,
}

/// Operation-specific payload of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportDetail {
    /// No payload (failure reports and payload-free operations)
    None,

    /// File size in bytes
    Size { bytes: u64 },

    /// Contents of a directory
    Listing { entries: Vec<DirEntryInfo> },

    /// Member paths of an archive
    ArchiveContents { entries: Vec<String> },
}

impl ReportDetail {
    fn is_none(&self) -> bool {
        matches!(self, ReportDetail::None)
    }
}

/// Result of running one worker against one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    /// Entry the worker ran on
    pub path: PathBuf,

    /// Name of the worker that produced this report
    pub worker: String,

    /// Whether the operation succeeded
    pub success: bool,

    /// Failure message, present iff the operation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Operation-specific payload
    #[serde(skip_serializing_if = "ReportDetail::is_none")]
    pub detail: ReportDetail,
}

impl WorkerReport {
    /// Build a successful report carrying `detail`
    pub fn success(
        path: impl Into<PathBuf>,
        worker: impl Into<String>,
        detail: ReportDetail,
    ) -> Self {
        Self {
            path: path.into(),
            worker: worker.into(),
            success: true,
            error: None,
            detail,
        }
    }

    /// Build a failure report carrying an error message
    pub fn failure(
        path: impl Into<PathBuf>,
        worker: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            worker: worker.into(),
            success: false,
            error: Some(error.into()),
            detail: ReportDetail::None,
        }
    }
}

/// Consumer of completed reports
///
/// `accept` runs inline on pool worker threads, so implementations must be
/// concurrency-safe and reasonably quick.
pub trait ReportSink: Send + Sync {
    fn accept(&self, report: WorkerReport);
}

/// Sink that serializes each report to JSON and emits it on the log
#[derive(Debug, Default)]
pub struct JsonLogSink;

impl JsonLogSink {
    pub fn new() -> Self {
        Self
    }
}

impl ReportSink for JsonLogSink {
    fn accept(&self, report: WorkerReport) {
        match serde_json::to_string(&report) {
            Ok(json) => info!("{}", json),
            Err(e) => warn!(
                path = %report.path.display(),
                error = %e,
                "Could not serialize report"
            ),
        }
    }
}

/// Sink that holds every report in memory
///
/// Mainly useful in tests and for embedding the pipeline in other programs.
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<WorkerReport>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all collected reports, leaving the sink empty
    pub fn take(&self) -> Vec<WorkerReport> {
        std::mem::take(&mut *self.lock())
    }

    /// Copy of the collected reports
    pub fn reports(&self) -> Vec<WorkerReport> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<WorkerReport>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportSink for CollectingSink {
    fn accept(&self, report: WorkerReport) {
        self.lock().push(report);
    }
}
