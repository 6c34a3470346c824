//! LLM-backed [`AgentSimulator`](crowdtest_core::AgentSimulator) speaking an
//! Anthropic-style messages HTTP API.

pub mod anthropic;
pub mod config;
pub mod prompts;

pub use anthropic::AnthropicSimulator;
pub use config::{AgentConfigError, AnthropicConfig};
