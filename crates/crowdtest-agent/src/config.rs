//! Configuration for the Anthropic-backed simulator.

use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
/// Reactions are short by design; a few paragraphs at most.
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// Configuration error raised before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentConfigError {
    #[error("agent config error: {0}")]
    Config(String),
}

/// Client configuration for the messages endpoint.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    /// Override for proxies or local test servers.
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Default HTTP timeout for requests. The collector applies its own
    /// per-attempt timeout on top.
    pub timeout: Duration,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(60),
        }
    }

    /// Builds a config from `ANTHROPIC_API_KEY`, with `CROWDTEST_AGENT_MODEL`
    /// and `CROWDTEST_ANTHROPIC_URL` as optional overrides.
    pub fn from_env() -> Result<Self, AgentConfigError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(AgentConfigError::Config(
                "missing ANTHROPIC_API_KEY for agent simulator".into(),
            ));
        }
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("CROWDTEST_AGENT_MODEL")
            && !model.trim().is_empty()
        {
            config.model = model;
        }
        if let Ok(url) = std::env::var("CROWDTEST_ANTHROPIC_URL")
            && !url.trim().is_empty()
        {
            config.base_url = url;
        }
        Ok(config)
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}
