//! Key-value cache backends for provider responses

pub mod disk;
pub mod memory;

pub use disk::DiskCollection;
pub use memory::MemoryCollection;
