//! End-to-end demo: submit a product description to a small in-memory panel
//! and print the published report.
//!
//! With `ANTHROPIC_API_KEY` set the panel answers through the real messages
//! API; otherwise a deterministic scripted simulator stands in, so the demo
//! runs offline.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crowdtest_agent::AnthropicSimulator;
use crowdtest_core::{
    AgentSimulator, CustomerProfile, EngineConfig, ProfileSource, ProfileSourceError,
    SimulatorError, TestRequest, TestSessionManager, init_observability,
};
use crowdtest_profiles::{DirProfileSource, panel_stats};
use dashmap::DashMap;
use tracing::info;

/// Small built-in panel used when no profile directory is configured.
struct DemoPanel;

#[async_trait]
impl ProfileSource for DemoPanel {
    async fn list_profiles(&self) -> Result<Vec<CustomerProfile>, ProfileSourceError> {
        let raw = serde_json::json!([
            {
                "customer_id": "customer_001",
                "name": "Elena",
                "age": 31,
                "gender": "female",
                "location": "Madrid",
                "segments": ["eco_conscious"],
                "preferences": { "sustainability_interest": true, "style": ["minimalist"] }
            },
            {
                "customer_id": "customer_002",
                "name": "Marcus",
                "age": 44,
                "gender": "male",
                "location": "Hamburg",
                "segments": ["budget_conscious"],
                "preferences": { "price_sensitivity": "high", "sale_shopper": true }
            },
            {
                "customer_id": "customer_003",
                "name": "Priya",
                "age": 26,
                "gender": "female",
                "location": "London",
                "segments": ["trend_follower"],
                "preferences": { "style": ["streetwear"] }
            },
            {
                "customer_id": "customer_004",
                "name": "Jonas",
                "age": 35,
                "gender": "male",
                "location": "Stockholm",
                "segments": ["eco_conscious", "budget_conscious"],
                "preferences": { "sustainability_interest": true, "price_sensitivity": "high" }
            },
            {
                "customer_id": "customer_005",
                "name": "Sofia",
                "age": 52,
                "gender": "female",
                "location": "Milan",
                "segments": ["casual"]
            }
        ]);
        serde_json::from_value(raw).map_err(|e| ProfileSourceError::Invalid(e.to_string()))
    }
}

/// Offline stand-in: each segment answers with a fixed voice.
struct ScriptedSimulator {
    flaky: HashSet<&'static str>,
}

#[async_trait]
impl AgentSimulator for ScriptedSimulator {
    async fn simulate(
        &self,
        profile: &CustomerProfile,
        product_description: &str,
    ) -> Result<String, SimulatorError> {
        tokio::time::sleep(Duration::from_millis(30)).await;
        if self.flaky.contains(profile.customer_id.as_str()) {
            return Err(SimulatorError::failed("scripted outage", Some(503)));
        }
        Ok(match profile.segments.first().map(String::as_str) {
            Some("eco_conscious") => format!(
                "I love that {product_description} takes sustainability seriously, \
                 I'd definitely buy one."
            ),
            Some("budget_conscious") => {
                "Looks overpriced to me, I'll pass unless it goes on sale.".to_string()
            }
            Some("trend_follower") => {
                "This looks amazing, sign me up before everyone else has one!".to_string()
            }
            _ => "I could take it or leave it, depends how it fits my routine.".to_string(),
        })
    }
}

fn simulator() -> Arc<dyn AgentSimulator> {
    match AnthropicSimulator::from_env() {
        Ok(simulator) => {
            info!("using anthropic-backed simulator");
            Arc::new(simulator)
        }
        Err(_) => {
            info!("no api key found, using scripted simulator");
            Arc::new(ScriptedSimulator {
                flaky: HashSet::from(["customer_005"]),
            })
        }
    }
}

fn profile_source() -> Arc<dyn ProfileSource> {
    match std::env::var("CROWDTEST_PROFILES_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            info!(dir, "loading profiles from directory");
            Arc::new(DirProfileSource::new(dir))
        }
        _ => Arc::new(DemoPanel),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_observability();

    let profiles = profile_source();
    let panel = profiles.list_profiles().await?;
    println!("=== Panel ===\n");
    println!("{}\n", serde_json::to_string_pretty(&panel_stats(&panel))?);

    let manager = TestSessionManager::new(
        Arc::new(DashMap::new()),
        profiles,
        simulator(),
        EngineConfig::from_env(),
    );

    let description = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "a refillable water bottle with a built-in filter".to_string());
    let test_id = manager.submit(
        TestRequest::new(&description)
            .with_target_segments(vec!["eco_conscious".to_string()]),
    )?;
    println!("=== Running test {test_id} ===\n");
    manager.run(test_id).await?;

    let session = manager.get(test_id)?;
    println!(
        "Collected {} of {} responses\n",
        session.responses.len(),
        session.total_agents
    );
    let results = manager.results(test_id)?;
    println!("=== Report ===\n");
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
