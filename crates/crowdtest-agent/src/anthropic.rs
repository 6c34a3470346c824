//! Anthropic messages API client implementing the simulator contract.

use async_trait::async_trait;
use crowdtest_core::profile::CustomerProfile;
use crowdtest_core::simulator::{AgentSimulator, SimulatorError};
use crowdtest_profiles::persona;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AgentConfigError, AnthropicConfig};
use crate::prompts;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// [`AgentSimulator`] backed by an Anthropic-style messages endpoint.
///
/// Each call renders the profile's persona as the system prompt and the
/// product description as the single user message; the first text block of
/// the reply is the customer's reaction.
pub struct AnthropicSimulator {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicSimulator {
    pub fn new(config: AnthropicConfig) -> Result<Self, AgentConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(AgentConfigError::Config(
                "anthropic api_key must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentConfigError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, AgentConfigError> {
        Self::new(AnthropicConfig::from_env()?)
    }
}

fn build_request_body(
    config: &AnthropicConfig,
    profile: &CustomerProfile,
    product_description: &str,
) -> MessagesRequest {
    MessagesRequest {
        model: config.model.clone(),
        max_tokens: config.max_tokens,
        system: prompts::format_agent_prompt(&persona::generate(profile)),
        messages: vec![Message {
            role: "user",
            content: prompts::format_evaluation_prompt(product_description),
        }],
    }
}

fn extract_text(response: MessagesResponse) -> Result<String, SimulatorError> {
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text" && !block.text.is_empty())
        .map(|block| block.text)
        .ok_or_else(|| SimulatorError::protocol("messages response carried no text block"))
}

#[async_trait]
impl AgentSimulator for AnthropicSimulator {
    async fn simulate(
        &self,
        profile: &CustomerProfile,
        product_description: &str,
    ) -> Result<String, SimulatorError> {
        let body = build_request_body(&self.config, profile, product_description);
        debug!(agent = %profile.customer_id, model = %self.config.model, "sending messages request");

        let response = self
            .client
            .post(self.config.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| SimulatorError::transport(format!("messages request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SimulatorError::failed(
                format!("messages request failed with status {status}: {body}"),
                Some(status.as_u16()),
            ));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| SimulatorError::protocol(format!("invalid messages response: {e}")))?;
        extract_text(parsed)
    }
}
