//! List engine errors
//!
//! Remote failures during a fetch are reported as `ApiError` and surfaced to
//! the user by the engine itself; this type only covers misconfiguration.

use thiserror::Error;

/// Engine construction errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required collaborator was not supplied to the builder
    #[error("Failed to build list engine: {0}")]
    BuildError(String),
}
