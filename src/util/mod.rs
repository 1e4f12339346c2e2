//! Shared utilities.

pub mod clock;
pub mod format;
pub mod telemetry;

pub use clock::{monotonic_after, now};
pub use format::{percent, utilization};
pub use telemetry::init_tracing;
