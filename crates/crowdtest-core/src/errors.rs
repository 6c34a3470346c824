//! Top-level error taxonomy for the engine's public operations.
//!
//! Per-call simulation failures are deliberately absent: they are absorbed and
//! retried inside the collector and never escape it.

use uuid::Uuid;

use crate::session::{SessionStateError, SessionStatus};

/// Errors returned by the session manager's public operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Submission rejected synchronously (empty or over-length description).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Unknown session id.
    #[error("test session not found: {0}")]
    NotFound(Uuid),
    /// Results requested before the session completed. Polling-friendly: the
    /// current status is carried along.
    #[error("results not ready: session is {0}")]
    NotReady(SessionStatus),
    /// The session ended in `Error`; carries the recorded reason.
    #[error("test session failed: {0}")]
    Failed(String),
    /// Every profile in the panel exhausted its retry budget.
    #[error("no agent responses collected")]
    NoResponses,
    /// Illegal session state transition (for example `run` on a session that
    /// is not pending).
    #[error(transparent)]
    State(#[from] SessionStateError),
}
