pub mod batch;
pub mod pool;

pub use batch::{batch_ranges, run_balance_batches, BatchError};
pub use pool::WorkerPool;
