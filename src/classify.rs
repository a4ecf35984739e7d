//! File type classification using magic bytes
//!
//! Uses the `infer` crate to detect file types from magic bytes (file
//! headers). This is more accurate than extension-based detection and works
//! even when files are renamed or have missing extensions.
//!
//! Only the first few kilobytes of a file are read, so classification stays
//! cheap even on large trees.
//!
//! Directories never reach a classifier: the dispatcher detects them with a
//! stat check and assigns [`DIRECTORY_TYPE`] directly.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Type label assigned to directories, which have no MIME type
pub const DIRECTORY_TYPE: &str = "directory";

/// Number of leading bytes read when probing a file
const HEADER_LEN: usize = 8192;

/// Maps a file to a MIME-like type label
///
/// Implementations are best effort: `None` means the type could not be
/// determined, which is a normal outcome rather than an error.
pub trait FileClassifier: Send + Sync {
    fn classify(&self, path: &Path) -> Option<String>;
}

/// Detect the MIME type of a file from its header bytes
///
/// Returns the detected MIME type as a string, or None if the type is
/// unknown.
pub fn detect_type(header: &[u8]) -> Option<String> {
    infer::get(header).map(|kind| kind.mime_type().to_string())
}

/// Classifier backed by the `infer` magic-byte database
#[derive(Debug, Default)]
pub struct InferClassifier;

impl InferClassifier {
    pub fn new() -> Self {
        Self
    }

    fn read_header(path: &Path) -> io::Result<Vec<u8>> {
        let mut file = File::open(path)?;
        let mut header = vec![0u8; HEADER_LEN];
        let mut len = 0;

        while len < header.len() {
            match file.read(&mut header[len..]) {
                Ok(0) => break,
                Ok(n) => len += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        header.truncate(len);
        Ok(header)
    }
}

impl FileClassifier for InferClassifier {
    fn classify(&self, path: &Path) -> Option<String> {
        match Self::read_header(path) {
            Ok(header) => detect_type(&header),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Could not read file header");
                None
            }
        }
    }
}
