//! Test orchestration and insight aggregation engine.
//!
//! A single product description is fanned out to a panel of simulated
//! customers ([`AgentSimulator`] calls, one per [`CustomerProfile`]), the
//! surviving free-text reactions are classified and grouped, and the result is
//! published as an [`InsightResults`] report that clients poll for through the
//! [`TestSessionManager`].

pub mod collector;
pub mod config;
pub mod errors;
pub mod insights;
pub mod manager;
pub mod observability;
pub mod profile;
pub mod segmentation;
pub mod sentiment;
pub mod session;
pub mod simulator;
pub mod themes;

pub use collector::{CollectorConfig, CollectorOutcome, ResponseCollector};
pub use config::EngineConfig;
pub use errors::EngineError;
pub use insights::{InsightResults, SentimentBreakdown, build_insights};
pub use manager::{SessionStore, TestRequest, TestSessionManager};
pub use observability::init_observability;
pub use profile::{CustomerProfile, ProfileSource, ProfileSourceError};
pub use segmentation::{SegmentData, SegmentSentiment};
pub use sentiment::Sentiment;
pub use session::{AgentResponse, SessionStatus, TestSession};
pub use simulator::{AgentSimulator, SimulatorError};
