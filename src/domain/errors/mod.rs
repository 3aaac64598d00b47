// Domain errors - Error taxonomy for the editing session

use thiserror::Error;

use crate::domain::model::JobKind;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A picker was dismissed; the operation aborts and state is unchanged
    #[error("Operation cancelled by user")]
    UserCancelled,

    /// The external encoder returned non-success
    #[error("{kind} job failed: {detail}")]
    JobFailed { kind: JobKind, detail: String },

    /// A delete call failed; logged by reclamation, never propagated by it
    #[error("Failed to reclaim {path}: {detail}")]
    ReclaimFailed { path: String, detail: String },

    /// The caller broke a session contract (e.g. a second job while one is active)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// Operation not valid in the current session state
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Filesystem operation failed
    #[error("Filesystem failure: {0}")]
    FsFail(String),

    /// The encoder process could not be started
    #[error("Encoder unavailable: {0}")]
    EncoderUnavailable(String),

    /// Media probing failed
    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
}

impl DomainError {
    /// True for errors that indicate a caller bug rather than an environment condition
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, DomainError::InvariantViolation(_))
    }

    /// True when the user dismissed a picker
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::UserCancelled)
    }
}
