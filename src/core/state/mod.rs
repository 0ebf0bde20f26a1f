// Checkpoint model and persistence

pub mod checkpoint;
pub mod store;

pub use checkpoint::CheckpointState;
pub use store::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
