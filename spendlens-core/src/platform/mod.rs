//! Clock and storage adapters
//!
//! Everything stateful in the core reads time and persisted values through
//! these two seams so hosts can wire real backends and tests can wire fakes.

pub mod clock;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{KeyValueStore, MemoryStore};

#[cfg(test)]
pub use storage::MockKeyValueStore;
