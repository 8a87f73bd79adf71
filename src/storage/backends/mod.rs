//! Storage backend implementations

pub mod file;
pub mod memory;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
