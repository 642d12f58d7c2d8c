//! Session-scoped staging backend

mod memory;

pub use memory::MemorySessionStore;
