//! Error types for the diagq core.
//!
//! Per-target build problems never show up here. They degrade the result set
//! instead: a target whose build fails or produces an unexpected number of
//! artifacts is dropped from the output, and the run still succeeds. Only
//! failures of the engine itself are fatal.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Fatal pipeline errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The graph or build engine is unreachable or failed at the transport
    /// level.
    #[error("engine infrastructure failure: {0}")]
    Infrastructure(String),

    /// The engine answered, but with a malformed or contract-violating
    /// response.
    #[error("engine protocol error: {0}")]
    Protocol(String),

    /// A target build failed while the scheduler was configured to treat the
    /// first failure as fatal.
    #[error("build of {reference} failed: {reason}")]
    BuildAborted {
        /// Rendered form of the sub-target ref that failed.
        reference: String,
        /// Failure reason reported by the build backend.
        reason: String,
    },
}

/// Failure of a single unit of work, reported by the build backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// The action itself failed (compile error, linter crash). Isolated to
    /// the refs that depend on this unit.
    #[error("build action failed: {0}")]
    Action(String),

    /// The engine broke underneath the action. Aborts the whole batch.
    #[error("engine infrastructure failure: {0}")]
    Infrastructure(String),
}
