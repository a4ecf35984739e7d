//! Worker listing tar archive members

use crate::registry::FileWorker;
use crate::report::{ReportDetail, WorkerReport};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tar::Archive;

const TAR_TYPE: &str = "application/x-tar";
const GZIP_TYPE: &str = "application/gzip";
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Lists member paths of tar and gzipped tar archives
///
/// Answers the same `dir` operation as [`crate::workers::DirectoryLister`],
/// for archive types instead of directories. Gzip is detected again from
/// the file header at handling time, since the classified type is not
/// carried into the task.
#[derive(Debug, Default)]
pub struct ArchiveLister;

impl ArchiveLister {
    pub fn new() -> Self {
        Self
    }
}

impl FileWorker for ArchiveLister {
    fn name(&self) -> &str {
        "ArchiveLister"
    }

    fn can_handle(&self, operation: &str, file_type: Option<&str>) -> bool {
        operation.eq_ignore_ascii_case("dir")
            && file_type.is_some_and(|t| {
                t.eq_ignore_ascii_case(TAR_TYPE) || t.eq_ignore_ascii_case(GZIP_TYPE)
            })
    }

    fn handle(&self, path: &Path) -> WorkerReport {
        match list_members(path) {
            Ok(entries) => WorkerReport::success(
                path,
                self.name(),
                ReportDetail::ArchiveContents { entries },
            ),
            Err(e) => WorkerReport::failure(
                path,
                self.name(),
                format!("could not list archive contents: {}", e),
            ),
        }
    }
}

fn list_members(path: &Path) -> std::io::Result<Vec<String>> {
    let mut file = File::open(path)?;

    let mut magic = [0u8; 2];
    let gzipped = match file.read_exact(&mut magic) {
        Ok(()) => magic == GZIP_MAGIC,
        // Too short for a magic number; let the tar reader reject it
        Err(_) => false,
    };
    file.seek(SeekFrom::Start(0))?;

    if gzipped {
        collect_members(&mut Archive::new(GzDecoder::new(file)))
    } else {
        collect_members(&mut Archive::new(file))
    }
}

fn collect_members<R: Read>(archive: &mut Archive<R>) -> std::io::Result<Vec<String>> {
    let mut members = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        members.push(entry.path()?.display().to_string());
    }
    Ok(members)
}
