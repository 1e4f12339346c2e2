//! Configuration models for the classifier policy and the engine.

pub mod engine;
pub mod policy;

pub use engine::EngineConfig;
pub use policy::PolicyConfig;
