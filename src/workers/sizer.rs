//! Worker reporting file sizes

use crate::classify::DIRECTORY_TYPE;
use crate::registry::FileWorker;
use crate::report::{ReportDetail, WorkerReport};
use std::path::Path;

/// Reports the byte size of any non-directory entry
///
/// The operation name is matched exactly; `sizeof` and `SIZEOF` are
/// different operations. Unclassified files are accepted, directories are
/// not regardless of casing.
#[derive(Debug, Default)]
pub struct SizeWorker;

impl SizeWorker {
    pub fn new() -> Self {
        Self
    }
}

impl FileWorker for SizeWorker {
    fn name(&self) -> &str {
        "SizeWorker"
    }

    fn can_handle(&self, operation: &str, file_type: Option<&str>) -> bool {
        operation == "sizeof" && !file_type.is_some_and(|t| t.eq_ignore_ascii_case(DIRECTORY_TYPE))
    }

    fn handle(&self, path: &Path) -> WorkerReport {
        match std::fs::metadata(path) {
            Ok(metadata) => WorkerReport::success(
                path,
                self.name(),
                ReportDetail::Size {
                    bytes: metadata.len(),
                },
            ),
            Err(e) => WorkerReport::failure(
                path,
                self.name(),
                format!("could not get size of file: {}", e),
            ),
        }
    }
}
