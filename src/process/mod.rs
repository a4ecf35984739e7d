//! Run orchestration: dispatch, pooling, and lifecycle

pub mod dispatcher;
pub mod pool;
pub mod processor;

pub use dispatcher::{DispatchStats, Dispatcher};
pub use pool::{PoolOutcome, SubmitOutcome, Task, WorkerPool};
pub use processor::{FileProcessor, RunOutcome, RunStats};
