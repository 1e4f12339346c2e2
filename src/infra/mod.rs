//! Infrastructure adapters for registry backends.

pub mod registry;

pub use registry::InMemoryRegistry;
