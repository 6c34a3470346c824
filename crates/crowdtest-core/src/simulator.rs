//! Agent simulator contract.
//!
//! The simulator is the engine's one non-deterministic, possibly slow
//! collaborator. It is injected as a trait object so the collector's
//! concurrency and retry behavior can be tested with scripted fakes.

use async_trait::async_trait;

use crate::profile::CustomerProfile;

/// Errors from a single simulation call, normalized across backends.
///
/// These never escape the collector: failed calls are retried and then
/// dropped from the response set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulatorError {
    /// The backend reported an application-level failure.
    #[error("simulation failed: {message}")]
    Failed {
        message: String,
        status_code: Option<u16>,
    },
    /// The request never reached the backend or the connection dropped.
    #[error("simulator transport error: {0}")]
    Transport(String),
    /// The backend answered with an unusable shape.
    #[error("simulator protocol error: {0}")]
    Protocol(String),
}

impl SimulatorError {
    pub fn failed(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::Failed {
            message: message.into(),
            status_code,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

/// Produces one customer's free-text reaction to a product description.
///
/// Implementations must be safe to call concurrently; the collector issues
/// every panel member's call in parallel under its own timeout.
#[async_trait]
pub trait AgentSimulator: Send + Sync {
    async fn simulate(
        &self,
        profile: &CustomerProfile,
        product_description: &str,
    ) -> Result<String, SimulatorError>;
}
