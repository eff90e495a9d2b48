//! Key-value store backends for extension storage.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
