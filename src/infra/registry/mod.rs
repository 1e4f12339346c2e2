//! Registry backends.

pub mod memory;

pub use memory::InMemoryRegistry;
