//! End-to-end runs through the public engine API: submit, drive, poll.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crowdtest_core::{
    AgentSimulator, CollectorConfig, CustomerProfile, EngineConfig, EngineError, ProfileSource,
    ProfileSourceError, Sentiment, SessionStatus, SimulatorError, TestRequest, TestSessionManager,
};
use dashmap::DashMap;

struct FixedPanel(Vec<CustomerProfile>);

#[async_trait]
impl ProfileSource for FixedPanel {
    async fn list_profiles(&self) -> Result<Vec<CustomerProfile>, ProfileSourceError> {
        Ok(self.0.clone())
    }
}

/// Per-agent scripted replies; agents in `fail` never answer.
struct ScriptedSimulator {
    delay: Duration,
    fail: HashSet<String>,
}

#[async_trait]
impl AgentSimulator for ScriptedSimulator {
    async fn simulate(
        &self,
        profile: &CustomerProfile,
        product_description: &str,
    ) -> Result<String, SimulatorError> {
        tokio::time::sleep(self.delay).await;
        if self.fail.contains(&profile.customer_id) {
            return Err(SimulatorError::failed("upstream unavailable", Some(503)));
        }
        Ok(match profile.segments.first().map(String::as_str) {
            Some("eco_conscious") => format!(
                "Love the sustainability angle of {product_description}, definitely buying."
            ),
            Some("budget_conscious") => {
                "Seems too expensive for what it is, not for me.".to_string()
            }
            _ => "I might consider it, depends on the details.".to_string(),
        })
    }
}

fn profile(id: &str, segment: &str) -> CustomerProfile {
    serde_json::from_value(serde_json::json!({
        "customer_id": id,
        "name": format!("Customer {id}"),
        "age": 34,
        "gender": "female",
        "location": "Lisbon",
        "segments": [segment],
    }))
    .unwrap()
}

fn panel() -> Vec<CustomerProfile> {
    let mut profiles = Vec::new();
    for i in 0..4 {
        profiles.push(profile(&format!("eco_{i}"), "eco_conscious"));
    }
    for i in 0..3 {
        profiles.push(profile(&format!("budget_{i}"), "budget_conscious"));
    }
    for i in 0..3 {
        profiles.push(profile(&format!("casual_{i}"), "casual"));
    }
    profiles
}

fn manager_with(simulator: ScriptedSimulator, profiles: Vec<CustomerProfile>) -> TestSessionManager {
    let mut config = EngineConfig::default();
    config.collector = CollectorConfig {
        call_timeout: Duration::from_millis(500),
        max_attempts: 2,
        global_timeout: Duration::from_secs(10),
        max_concurrent: 50,
    };
    TestSessionManager::new(
        Arc::new(DashMap::new()),
        Arc::new(FixedPanel(profiles)),
        Arc::new(simulator),
        config,
    )
}

#[tokio::test(start_paused = true)]
async fn partial_panel_failure_still_completes_with_full_report() {
    let simulator = ScriptedSimulator {
        delay: Duration::from_millis(20),
        fail: ["eco_3", "casual_2", "budget_2"]
            .into_iter()
            .map(String::from)
            .collect(),
    };
    let manager = manager_with(simulator, panel());
    let test_id = manager
        .submit(TestRequest::new("A refillable water bottle with a built-in filter"))
        .unwrap();
    manager.run(test_id).await.unwrap();

    let session = manager.get(test_id).unwrap();
    assert_eq!(session.status, SessionStatus::Complete);
    assert_eq!(session.total_agents, 10);
    assert_eq!(session.responses.len(), 7);

    let results = manager.results(test_id).unwrap();
    assert_eq!(results.total_agents, 10);
    assert!((results.response_rate - 0.7).abs() < 1e-9);
    // 3 eco positives, 2 budget negatives, 2 casual neutrals.
    assert_eq!(results.sentiment_breakdown.positive, 3);
    assert_eq!(results.sentiment_breakdown.negative, 2);
    assert_eq!(results.sentiment_breakdown.neutral, 2);

    let labels: Vec<&str> = results
        .segments
        .iter()
        .map(|s| s.segment_name.as_str())
        .collect();
    assert_eq!(labels, vec!["eco_conscious", "budget_conscious", "casual"]);
    assert!(!results.executive_summary.is_empty());
}

#[tokio::test(start_paused = true)]
async fn total_panel_failure_ends_in_error() {
    let simulator = ScriptedSimulator {
        delay: Duration::from_millis(10),
        fail: (0..4)
            .map(|i| format!("eco_{i}"))
            .chain((0..3).map(|i| format!("budget_{i}")))
            .chain((0..3).map(|i| format!("casual_{i}")))
            .collect(),
    };
    let manager = manager_with(simulator, panel());
    let test_id = manager.submit(TestRequest::new("a product nobody answers about")).unwrap();

    assert_eq!(manager.run(test_id).await.unwrap_err(), EngineError::NoResponses);

    let session = manager.get(test_id).unwrap();
    assert_eq!(session.status, SessionStatus::Error);
    assert!(session.error.is_some());
    assert!(matches!(
        manager.results(test_id).unwrap_err(),
        EngineError::Failed(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn cancellation_mid_run_fails_the_session() {
    let simulator = ScriptedSimulator {
        delay: Duration::from_secs(2),
        fail: (0..4)
            .map(|i| format!("eco_{i}"))
            .chain((0..3).map(|i| format!("budget_{i}")))
            .chain((0..3).map(|i| format!("casual_{i}")))
            .collect(),
    };
    let manager = manager_with(simulator, panel());
    let test_id = manager.submit(TestRequest::new("a slow product")).unwrap();

    let handle = manager.spawn_run(test_id);
    tokio::time::sleep(Duration::from_millis(100)).await;
    manager.cancel(test_id).unwrap();
    let result = handle.await.unwrap();

    assert!(matches!(result, Err(EngineError::Failed(_))));
    let session = manager.get(test_id).unwrap();
    assert_eq!(session.status, SessionStatus::Error);
    assert_eq!(session.error.as_deref(), Some("cancelled by client"));
}

#[tokio::test(start_paused = true)]
async fn targeting_context_steers_segment_attribution() {
    let mut profiles = panel();
    // Every eco profile also carries a broader label listed first.
    for p in &mut profiles {
        if p.segments == vec!["eco_conscious".to_string()] {
            p.segments = vec!["general".into(), "eco_conscious".into()];
        }
    }
    let simulator = ScriptedSimulator {
        delay: Duration::from_millis(10),
        fail: HashSet::new(),
    };
    let manager = manager_with(simulator, profiles);
    let test_id = manager
        .submit(
            TestRequest::new("an eco-targeted launch")
                .with_target_segments(vec!["eco_conscious".into()]),
        )
        .unwrap();
    manager.run(test_id).await.unwrap();

    let session = manager.get(test_id).unwrap();
    let eco_count = session
        .responses
        .iter()
        .filter(|r| r.segment == "eco_conscious")
        .count();
    assert_eq!(eco_count, 4);
    assert!(!session.responses.iter().any(|r| r.segment == "general"));
}

#[tokio::test(start_paused = true)]
async fn results_polled_mid_run_are_not_ready() {
    let simulator = ScriptedSimulator {
        delay: Duration::from_millis(200),
        fail: HashSet::new(),
    };
    let manager = manager_with(simulator, panel());
    let test_id = manager.submit(TestRequest::new("a slow-ish product")).unwrap();

    let handle = manager.spawn_run(test_id);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        manager.results(test_id).unwrap_err(),
        EngineError::NotReady(SessionStatus::Running)
    );

    handle.await.unwrap().unwrap();
    assert!(manager.results(test_id).is_ok());
}

#[tokio::test]
async fn responses_carry_classified_sentiment_and_timing() {
    let simulator = ScriptedSimulator {
        delay: Duration::from_millis(1),
        fail: HashSet::new(),
    };
    let manager = manager_with(simulator, vec![profile("eco_0", "eco_conscious")]);
    let test_id = manager.submit(TestRequest::new("a bottle")).unwrap();
    manager.run(test_id).await.unwrap();

    let session = manager.get(test_id).unwrap();
    let response = &session.responses[0];
    assert_eq!(response.sentiment, Sentiment::Positive);
    assert_eq!(response.profile_name, "Customer eco_0");
    assert!(response.response_time_ms >= 0.0);
}
