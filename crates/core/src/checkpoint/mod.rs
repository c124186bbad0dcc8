//! Run bookkeeping persisted between runs: the detail cursor, the
//! accumulated link set and the link batches.

mod batch;
mod error;
mod json_file;
mod memory;
mod store;

pub use batch::BatchStore;
pub use error::CheckpointError;
pub use json_file::JsonFileCheckpoint;
pub use memory::MemoryCheckpoint;
pub use store::KeyValueCheckpoint;
