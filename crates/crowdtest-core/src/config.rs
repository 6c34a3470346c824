//! Engine-wide settings.

use std::time::Duration;

use crate::collector::CollectorConfig;

/// Settings for the session manager and the collection runs it drives.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Longest accepted product description, in characters.
    pub max_description_len: usize,
    /// Panel size cap per run; the profile list is truncated beyond this.
    pub max_agents: usize,
    pub collector: CollectorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_description_len: 10_000,
            max_agents: 200,
            collector: CollectorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by environment variables, all optional:
    ///
    /// - `CROWDTEST_MAX_AGENTS`: panel size cap per run.
    /// - `CROWDTEST_MAX_CONCURRENT`: concurrent in-flight simulation calls.
    /// - `CROWDTEST_CALL_TIMEOUT_SECS`: per-attempt timeout.
    /// - `CROWDTEST_GLOBAL_TIMEOUT_SECS`: wall-clock bound per run.
    /// - `CROWDTEST_MAX_DESCRIPTION_LEN`: submission length cap.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = parse_env("CROWDTEST_MAX_AGENTS") {
            config.max_agents = value;
        }
        if let Some(value) = parse_env("CROWDTEST_MAX_CONCURRENT") {
            config.collector.max_concurrent = value;
        }
        if let Some(secs) = parse_env("CROWDTEST_CALL_TIMEOUT_SECS") {
            config.collector.call_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env("CROWDTEST_GLOBAL_TIMEOUT_SECS") {
            config.collector.global_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = parse_env("CROWDTEST_MAX_DESCRIPTION_LEN") {
            config.max_description_len = value;
        }
        config
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
