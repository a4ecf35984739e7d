//! Built-in workers
//!
//! Each worker is self-contained: its `can_handle` advertises the
//! operation and type combinations it accepts, and its `handle` produces
//! one report. Adding a worker means adding a module here and registering
//! it in `main` before the run starts.

pub mod archive;
pub mod lister;
pub mod sizer;

pub use archive::ArchiveLister;
pub use lister::DirectoryLister;
pub use sizer::SizeWorker;
