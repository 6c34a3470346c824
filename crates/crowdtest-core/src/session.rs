//! Test session record and its state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::insights::InsightResults;
use crate::sentiment::Sentiment;

/// Lifecycle of a test session.
///
/// Transitions are monotonic and one-directional; any non-terminal state may
/// move to `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Running,
    Aggregating,
    Complete,
    Error,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Complete | SessionStatus::Error)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Running => "running",
            SessionStatus::Aggregating => "aggregating",
            SessionStatus::Complete => "complete",
            SessionStatus::Error => "error",
        })
    }
}

/// Rejected session state transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid session transition: {from} -> {to}")]
pub struct SessionStateError {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

/// One collected simulation result. Immutable once produced; failed calls
/// produce no `AgentResponse` at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Derived from the source profile's `customer_id`.
    pub agent_id: String,
    pub profile_name: String,
    pub age: u32,
    /// The one segment this response is attributed to.
    pub segment: String,
    pub response_text: String,
    pub sentiment: Sentiment,
    /// Start of the successful attempt to its completion, in milliseconds.
    pub response_time_ms: f64,
}

/// One end-to-end test request, tracked through the state machine.
///
/// Owned exclusively by the session manager; polling clients receive clones
/// taken under the registry lock, so a read always observes a consistent
/// (possibly stale) snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSession {
    pub test_id: Uuid,
    pub status: SessionStatus,
    pub product_description: String,
    #[serde(default)]
    pub target_segments: Vec<String>,
    /// Arrival order; membership is what matters, not position.
    #[serde(default)]
    pub responses: Vec<AgentResponse>,
    pub created_at: DateTime<Utc>,
    /// Human-readable reason recorded when the session ends in `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Profiles dispatched for this run (not just successes).
    #[serde(default)]
    pub total_agents: usize,
    /// Published exactly once, at the aggregating -> complete transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<InsightResults>,
}

impl TestSession {
    pub fn new(product_description: String, target_segments: Vec<String>) -> Self {
        Self {
            test_id: Uuid::new_v4(),
            status: SessionStatus::Pending,
            product_description,
            target_segments,
            responses: Vec::new(),
            created_at: Utc::now(),
            error: None,
            total_agents: 0,
            results: None,
        }
    }

    /// Advance the state machine one step forward, or to `Error` from any
    /// non-terminal state.
    pub fn transition(&mut self, to: SessionStatus) -> Result<(), SessionStateError> {
        let allowed = matches!(
            (self.status, to),
            (SessionStatus::Pending, SessionStatus::Running)
                | (SessionStatus::Running, SessionStatus::Aggregating)
                | (SessionStatus::Aggregating, SessionStatus::Complete)
        ) || (to == SessionStatus::Error && !self.status.is_terminal());

        if !allowed {
            return Err(SessionStateError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Move to `Error` and record the diagnostic reason.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), SessionStateError> {
        self.transition(SessionStatus::Error)?;
        self.error = Some(reason.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> TestSession {
        TestSession::new("a new product".into(), Vec::new())
    }

    #[test]
    fn happy_path_transitions_in_order() {
        let mut s = session();
        assert_eq!(s.status, SessionStatus::Pending);
        s.transition(SessionStatus::Running).unwrap();
        s.transition(SessionStatus::Aggregating).unwrap();
        s.transition(SessionStatus::Complete).unwrap();
        assert!(s.status.is_terminal());
    }

    #[test]
    fn transitions_cannot_skip_or_go_back() {
        let mut s = session();
        assert!(s.transition(SessionStatus::Aggregating).is_err());
        s.transition(SessionStatus::Running).unwrap();
        assert!(s.transition(SessionStatus::Pending).is_err());
        assert!(s.transition(SessionStatus::Complete).is_err());
    }

    #[test]
    fn error_is_reachable_from_any_non_terminal_state() {
        for advance in 0..3 {
            let mut s = session();
            for _ in 0..advance {
                let next = match s.status {
                    SessionStatus::Pending => SessionStatus::Running,
                    SessionStatus::Running => SessionStatus::Aggregating,
                    _ => unreachable!(),
                };
                s.transition(next).unwrap();
            }
            s.fail("boom").unwrap();
            assert_eq!(s.status, SessionStatus::Error);
            assert_eq!(s.error.as_deref(), Some("boom"));
        }
    }

    #[test]
    fn terminal_states_reject_further_transitions() {
        let mut s = session();
        s.transition(SessionStatus::Running).unwrap();
        s.fail("cancelled").unwrap();
        assert!(s.transition(SessionStatus::Error).is_err());

        let mut done = session();
        done.transition(SessionStatus::Running).unwrap();
        done.transition(SessionStatus::Aggregating).unwrap();
        done.transition(SessionStatus::Complete).unwrap();
        assert!(done.fail("too late").is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Aggregating).unwrap(),
            "\"aggregating\""
        );
    }
}
