// src/telemetry.rs
//! Logging setup for the binaries and metric descriptions for the library.

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Install a global subscriber. `RUST_LOG` wins over `default_filter`;
/// `LOG_FORMAT=json` switches to JSON lines. A second call is a no-op.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json = std::env::var(ENV_LOG_FORMAT)
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry
            .with(fmt::layer().compact().with_target(false))
            .try_init()
    };
}

/// One-time metrics registration (so series carry descriptions once a recorder exists).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "github_requests_total",
            "HTTP requests sent to the GitHub API, by status."
        );
        describe_histogram!("github_request_ms", "GitHub API round trip in milliseconds.");
        describe_counter!(
            "github_rate_limit_waits_total",
            "Retries caused by rate limiting."
        );
        describe_counter!(
            "collector_queries_total",
            "Search counts recorded into the snapshot."
        );
        describe_gauge!(
            "collector_last_run_ts",
            "Unix ts when the collector last completed a snapshot."
        );
    });
}
