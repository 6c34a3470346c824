//! Process-wide tracing setup.

use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

fn enabled() -> bool {
    for key in ["CROWDTEST_OBSERVABILITY_ENABLED", "CROWDTEST_OBSERVABILITY"] {
        if let Ok(value) = std::env::var(key) {
            return match value.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "no" | "off" | "disabled" => false,
                _ => true,
            };
        }
    }
    true
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    if let Ok(level) = std::env::var("CROWDTEST_LOG_LEVEL")
        && let Ok(filter) = tracing_subscriber::EnvFilter::try_new(level)
    {
        return filter;
    }
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Initialize tracing once per process. Safe to call from every entry point;
/// later calls are no-ops.
///
/// Environment variables:
/// - `CROWDTEST_OBSERVABILITY_ENABLED` / `CROWDTEST_OBSERVABILITY`: disable
///   logging entirely (default enabled).
/// - `CROWDTEST_LOG_LEVEL` / `RUST_LOG`: level or filter override.
/// - `CROWDTEST_JSON_LOG_PATH`: when set, logs go to that file as JSONL
///   instead of human-readable stdout.
pub fn init_observability() {
    INIT.get_or_init(|| {
        if !enabled() {
            return;
        }

        if let Ok(path_raw) = std::env::var("CROWDTEST_JSON_LOG_PATH") {
            let path = std::path::PathBuf::from(path_raw);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                let _ = std::fs::create_dir_all(parent);
            }
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("crowdtest.logs.jsonl");
            let writer = tracing_appender::rolling::never(dir, file_name);
            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(false)
                        .with_writer(writer),
                )
                .try_init();
        } else {
            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(std::io::stdout),
                )
                .try_init();
        }
    });
}
