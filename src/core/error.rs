//! Error types for engine operations.

use thiserror::Error;

/// Errors produced by the tier engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Input rejected before any state mutation.
    #[error("{0}")]
    Validation(String),
    /// No live process with the given identifier.
    #[error("Process not found: {0}")]
    NotFound(String),
    /// Reported memory exceeds the active tier's limit.
    #[error("Memory usage {used_mb}MB exceeds limit {limit_mb}MB")]
    ResourceLimitViolation {
        /// Reported memory in megabytes.
        used_mb: u64,
        /// Memory limit of the current tier in megabytes.
        limit_mb: u64,
    },
}

impl EngineError {
    /// HTTP status code this error maps to at the API boundary.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::ResourceLimitViolation { .. } => 400,
            Self::NotFound(_) => 404,
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_violation_message_names_both_values() {
        let err = EngineError::ResourceLimitViolation {
            used_mb: 51200,
            limit_mb: 2048,
        };
        let msg = err.to_string();
        assert_eq!(msg, "Memory usage 51200MB exceeds limit 2048MB");
        assert!(msg.to_lowercase().contains("exceeds limit"));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(EngineError::NotFound("abc".into()).status_code(), 404);
        assert_eq!(EngineError::Validation("bad".into()).status_code(), 400);
    }
}
