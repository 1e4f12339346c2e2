//! Runtime adapters and API surface.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod ticker;

pub use api::{handle, health, ApiResponse, Health, RebalanceResponse};
#[cfg(feature = "tokio-runtime")]
pub use ticker::RebalanceTicker;
