//! Worker listing directory contents

use crate::classify::DIRECTORY_TYPE;
use crate::registry::FileWorker;
use crate::report::{DirEntryInfo, EntryKind, ReportDetail, WorkerReport};
use std::path::Path;

/// Lists the immediate children of a directory
///
/// Matches the `dir` operation, case-insensitively, and only entries the
/// walk typed as directories. Plain files never reach it even when the
/// operation matches.
#[derive(Debug, Default)]
pub struct DirectoryLister;

impl DirectoryLister {
    pub fn new() -> Self {
        Self
    }
}

impl FileWorker for DirectoryLister {
    fn name(&self) -> &str {
        "DirectoryLister"
    }

    fn can_handle(&self, operation: &str, file_type: Option<&str>) -> bool {
        operation.eq_ignore_ascii_case("dir")
            && file_type.is_some_and(|t| t.eq_ignore_ascii_case(DIRECTORY_TYPE))
    }

    fn handle(&self, path: &Path) -> WorkerReport {
        match list_entries(path) {
            Ok(entries) => {
                WorkerReport::success(path, self.name(), ReportDetail::Listing { entries })
            }
            Err(e) => WorkerReport::failure(
                path,
                self.name(),
                format!("could not read contents: {}", e),
            ),
        }
    }
}

fn list_entries(path: &Path) -> std::io::Result<Vec<DirEntryInfo>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let kind = match entry.file_type() {
            Ok(t) if t.is_dir() => EntryKind::Directory,
            Ok(t) if t.is_file() => EntryKind::File,
            _ => EntryKind::Unknown,
        };
        entries.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
        });
    }
    Ok(entries)
}
