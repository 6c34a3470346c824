//! Concurrent fan-out of simulation calls with per-call timeout and retry.
//!
//! All N panel calls are dispatched at once (bounded by a semaphore), each
//! attempt runs under its own timeout, and the whole run settles within a
//! global deadline. Individual failures are retried and then dropped; only
//! total failure of the panel is fatal, and that decision belongs to the
//! session manager.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};

use crate::profile::CustomerProfile;
use crate::sentiment;
use crate::session::AgentResponse;
use crate::simulator::AgentSimulator;

/// Tuning for one collection run.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Timeout applied to each simulation attempt.
    pub call_timeout: Duration,
    /// Total attempts per profile: the first call plus retries. Calls are
    /// side-effect-free, so retries use no backoff.
    pub max_attempts: u32,
    /// Wall-clock bound for the whole panel; results arriving after this are
    /// discarded.
    pub global_timeout: Duration,
    /// Concurrent in-flight simulation calls.
    pub max_concurrent: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            max_attempts: 2,
            global_timeout: Duration::from_secs(120),
            max_concurrent: 50,
        }
    }
}

/// What a collection run produced: M <= N responses plus dispatch accounting.
#[derive(Debug, Clone)]
pub struct CollectorOutcome {
    pub responses: Vec<AgentResponse>,
    /// Profiles dispatched (N), successes included.
    pub dispatched: usize,
    /// Profiles that exhausted their retry budget or missed the deadline.
    pub failed: usize,
}

/// Fans a product description out to every profile in the panel concurrently.
pub struct ResponseCollector {
    simulator: Arc<dyn AgentSimulator>,
    config: CollectorConfig,
}

impl ResponseCollector {
    pub fn new(simulator: Arc<dyn AgentSimulator>, config: CollectorConfig) -> Self {
        Self { simulator, config }
    }

    /// Dispatch all profiles and gather whatever subset succeeds.
    ///
    /// Returns once every call has produced a response or exhausted its
    /// retries, or once the global deadline passes, whichever comes first.
    /// Flipping `cancel` stops new attempts; in-flight calls are abandoned at
    /// their next timeout.
    pub async fn collect(
        &self,
        profiles: &[CustomerProfile],
        product_description: &str,
        target_segments: &[String],
        cancel: watch::Receiver<bool>,
    ) -> CollectorOutcome {
        let dispatched = profiles.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut tasks = JoinSet::new();
        for profile in profiles {
            tasks.spawn(simulate_profile(
                self.simulator.clone(),
                profile.clone(),
                product_description.to_string(),
                select_segment(profile, target_segments),
                self.config.clone(),
                semaphore.clone(),
                cancel.clone(),
            ));
        }

        let deadline = Instant::now() + self.config.global_timeout;
        let mut responses = Vec::with_capacity(dispatched);
        while !tasks.is_empty() {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok(Some(response)))) => responses.push(response),
                Ok(Some(Ok(None))) => {}
                Ok(Some(Err(err))) => warn!(error = %err, "simulation task panicked"),
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        pending = tasks.len(),
                        "collector deadline reached, discarding late responses"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        let failed = dispatched - responses.len();
        info!(
            dispatched,
            collected = responses.len(),
            failed,
            "panel collection settled"
        );
        CollectorOutcome {
            responses,
            dispatched,
            failed,
        }
    }
}

/// Segment a response is attributed to: the first declared profile segment
/// that matches the run's targeting context, else the profile's first
/// declared segment. This rule is fixed up front, never inferred from the
/// response text.
pub(crate) fn select_segment(profile: &CustomerProfile, target_segments: &[String]) -> String {
    profile
        .segments
        .iter()
        .find(|segment| target_segments.contains(segment))
        .or_else(|| profile.segments.first())
        .cloned()
        .unwrap_or_else(|| "unknown".to_string())
}

async fn simulate_profile(
    simulator: Arc<dyn AgentSimulator>,
    profile: CustomerProfile,
    product_description: String,
    segment: String,
    config: CollectorConfig,
    semaphore: Arc<Semaphore>,
    cancel: watch::Receiver<bool>,
) -> Option<AgentResponse> {
    let Ok(_permit) = semaphore.acquire_owned().await else {
        return None;
    };

    for attempt in 1..=config.max_attempts.max(1) {
        if *cancel.borrow() {
            debug!(agent = %profile.customer_id, "cancelled, skipping attempt");
            return None;
        }
        // Timed-out attempts are discarded wholesale, so the reported
        // response time covers only the attempt that succeeded.
        let start = Instant::now();
        match timeout(
            config.call_timeout,
            simulator.simulate(&profile, &product_description),
        )
        .await
        {
            Ok(Ok(text)) => {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                return Some(AgentResponse {
                    agent_id: profile.customer_id.clone(),
                    profile_name: profile.name.clone(),
                    age: profile.age,
                    segment,
                    sentiment: sentiment::classify(&text),
                    response_text: text,
                    response_time_ms: (elapsed_ms * 10.0).round() / 10.0,
                });
            }
            Ok(Err(err)) => {
                debug!(agent = %profile.customer_id, attempt, error = %err, "simulation attempt failed");
            }
            Err(_) => {
                debug!(agent = %profile.customer_id, attempt, timeout_ms = config.call_timeout.as_millis() as u64, "simulation attempt timed out");
            }
        }
    }

    warn!(agent = %profile.customer_id, attempts = config.max_attempts, "agent exhausted retry budget");
    None
}
