//! Session registry and run orchestration.
//!
//! The manager owns every [`TestSession`] for its lifetime: it creates one on
//! submission, sequences the collector and the aggregation stages, and serves
//! the read path that clients poll. The registry is an explicitly owned store
//! passed in at construction, not an ambient singleton; entries are retained
//! until the embedding application evicts them via [`TestSessionManager::remove`].

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::collector::ResponseCollector;
use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::insights::{self, InsightResults};
use crate::profile::ProfileSource;
use crate::session::{SessionStateError, SessionStatus, TestSession};
use crate::simulator::AgentSimulator;

/// Submission payload for a new test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRequest {
    pub product_description: String,
    /// Targeting context for the run; drives segment attribution.
    #[serde(default)]
    pub target_segments: Vec<String>,
}

impl TestRequest {
    pub fn new(product_description: impl Into<String>) -> Self {
        Self {
            product_description: product_description.into(),
            target_segments: Vec::new(),
        }
    }

    pub fn with_target_segments(mut self, segments: Vec<String>) -> Self {
        self.target_segments = segments;
        self
    }
}

/// Process-wide session registry. Reads hand out clones taken under the shard
/// lock, so polling clients always observe a consistent snapshot.
pub type SessionStore = Arc<DashMap<Uuid, TestSession>>;

struct ManagerInner {
    store: SessionStore,
    profiles: Arc<dyn ProfileSource>,
    collector: ResponseCollector,
    config: EngineConfig,
    cancels: DashMap<Uuid, watch::Sender<bool>>,
}

/// Entry point for submitting, driving, and polling test sessions.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct TestSessionManager {
    inner: Arc<ManagerInner>,
}

impl TestSessionManager {
    pub fn new(
        store: SessionStore,
        profiles: Arc<dyn ProfileSource>,
        simulator: Arc<dyn AgentSimulator>,
        config: EngineConfig,
    ) -> Self {
        let collector = ResponseCollector::new(simulator, config.collector.clone());
        Self {
            inner: Arc::new(ManagerInner {
                store,
                profiles,
                collector,
                config,
                cancels: DashMap::new(),
            }),
        }
    }

    /// Validate and register a new session. Returns its id immediately; the
    /// simulation work happens later, in [`TestSessionManager::run`].
    pub fn submit(&self, request: TestRequest) -> Result<Uuid, EngineError> {
        if request.product_description.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "product description must not be empty".into(),
            ));
        }
        if request.product_description.chars().count() > self.inner.config.max_description_len {
            return Err(EngineError::InvalidInput(format!(
                "product description exceeds {} characters",
                self.inner.config.max_description_len
            )));
        }

        let session = TestSession::new(request.product_description, request.target_segments);
        let test_id = session.test_id;
        self.inner.store.insert(test_id, session);
        info!(%test_id, "test session submitted");
        Ok(test_id)
    }

    /// Current snapshot of a session, callable in any state.
    pub fn get(&self, test_id: Uuid) -> Result<TestSession, EngineError> {
        self.inner
            .store
            .get(&test_id)
            .map(|session| session.clone())
            .ok_or(EngineError::NotFound(test_id))
    }

    /// Published report of a completed session.
    pub fn results(&self, test_id: Uuid) -> Result<InsightResults, EngineError> {
        let session = self.get(test_id)?;
        match session.status {
            SessionStatus::Complete => session.results.ok_or_else(|| {
                EngineError::Failed("completed session has no published results".into())
            }),
            SessionStatus::Error => Err(EngineError::Failed(
                session.error.unwrap_or_else(|| "session failed".into()),
            )),
            status => Err(EngineError::NotReady(status)),
        }
    }

    /// Request cancellation of an in-flight run. No new simulation calls are
    /// dispatched; the session ends in `Error` with a cancellation reason.
    pub fn cancel(&self, test_id: Uuid) -> Result<(), EngineError> {
        if !self.inner.store.contains_key(&test_id) {
            return Err(EngineError::NotFound(test_id));
        }
        if let Some(cancel) = self.inner.cancels.get(&test_id) {
            let _ = cancel.send(true);
            info!(%test_id, "cancellation requested");
        }
        Ok(())
    }

    /// Evict a session from the registry. Retention policy belongs to the
    /// embedding application, not the engine.
    pub fn remove(&self, test_id: Uuid) -> Option<TestSession> {
        self.inner.store.remove(&test_id).map(|(_, session)| session)
    }

    /// Drive a submitted session end to end: collect the panel's responses,
    /// aggregate, and publish the report.
    pub async fn run(&self, test_id: Uuid) -> Result<(), EngineError> {
        let (description, targets) = self.begin_run(test_id)?;

        let profiles = match self.inner.profiles.list_profiles().await {
            Ok(profiles) => profiles,
            Err(err) => {
                let reason = format!("profile source failed: {err}");
                self.fail_session(test_id, &reason);
                return Err(EngineError::Failed(reason));
            }
        };
        let panel: Vec<_> = profiles
            .into_iter()
            .take(self.inner.config.max_agents)
            .collect();
        info!(%test_id, panel = panel.len(), "dispatching panel");

        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.inner.cancels.insert(test_id, cancel_tx);
        let outcome = self
            .inner
            .collector
            .collect(&panel, &description, &targets, cancel_rx)
            .await;
        let cancelled = self
            .inner
            .cancels
            .remove(&test_id)
            .map(|(_, cancel)| *cancel.borrow())
            .unwrap_or(false);

        if cancelled {
            self.fail_session(test_id, "cancelled by client");
            return Err(EngineError::Failed("cancelled by client".into()));
        }
        if outcome.responses.is_empty() {
            self.fail_session(test_id, "no agent responses collected");
            return Err(EngineError::NoResponses);
        }

        // The collector has fully settled; aggregation runs over an immutable
        // snapshot and each publish below is one atomic registry update.
        self.update_session(test_id, |session| {
            session.transition(SessionStatus::Aggregating)?;
            session.total_agents = outcome.dispatched;
            session.responses = outcome.responses.clone();
            Ok(())
        })?;

        let results = insights::build_insights(&outcome.responses, outcome.dispatched);
        self.update_session(test_id, |session| {
            session.transition(SessionStatus::Complete)?;
            session.results = Some(results.clone());
            Ok(())
        })?;
        info!(
            %test_id,
            collected = outcome.responses.len(),
            dispatched = outcome.dispatched,
            "test session complete"
        );
        Ok(())
    }

    /// Spawn `run` on the runtime; the caller keeps polling via `get`.
    pub fn spawn_run(&self, test_id: Uuid) -> tokio::task::JoinHandle<Result<(), EngineError>> {
        let manager = self.clone();
        tokio::spawn(async move { manager.run(test_id).await })
    }

    fn begin_run(&self, test_id: Uuid) -> Result<(String, Vec<String>), EngineError> {
        let mut session = self
            .inner
            .store
            .get_mut(&test_id)
            .ok_or(EngineError::NotFound(test_id))?;
        session.transition(SessionStatus::Running)?;
        Ok((
            session.product_description.clone(),
            session.target_segments.clone(),
        ))
    }

    fn update_session<F>(&self, test_id: Uuid, update: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut TestSession) -> Result<(), SessionStateError>,
    {
        let mut session = self
            .inner
            .store
            .get_mut(&test_id)
            .ok_or(EngineError::NotFound(test_id))?;
        update(&mut session).map_err(EngineError::from)
    }

    fn fail_session(&self, test_id: Uuid, reason: &str) {
        match self.inner.store.get_mut(&test_id) {
            Some(mut session) => {
                if session.fail(reason).is_err() {
                    warn!(%test_id, reason, "session already terminal, reason dropped");
                }
            }
            None => warn!(%test_id, reason, "session evicted before failure could be recorded"),
        }
    }
}
