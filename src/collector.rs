// src/collector.rs
//! Weekly aggregation: one search per (assistant, week, signal), assembled into a snapshot.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use metrics::{counter, gauge};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::CollectError;
use crate::github::{SearchBackend, SearchQuery};
use crate::model::{week_buckets, SignalType};
use crate::snapshot::{Snapshot, SnapshotBuilder};
use crate::telemetry::ensure_metrics_described;

/// Query every (assistant, week, signal) combination from the anchor date up to `today`.
///
/// Queries run strictly one after another. The first failure aborts the whole
/// collection; no partial snapshot is returned.
pub async fn collect_snapshot(
    backend: &dyn SearchBackend,
    config: &AnalysisConfig,
    today: NaiveDate,
) -> Result<Snapshot, CollectError> {
    ensure_metrics_described();

    let weeks = week_buckets(config.anchor_date, today);
    if weeks.is_empty() {
        warn!(anchor = %config.anchor_date, %today, "today precedes the anchor date, no weeks to collect");
    }

    let mut builder = SnapshotBuilder::new(
        config.assistants.iter().map(|a| a.name.as_str()),
        &SignalType::ALL,
        &weeks,
    );

    let n_assistants = config.assistants.len();
    for (i, assistant) in config.assistants.iter().enumerate() {
        info!(
            assistant = %assistant.name,
            login = %assistant.login,
            weeks = weeks.len(),
            backend = backend.name(),
            "collecting weekly counts"
        );

        for week in &weeks {
            let (from, to) = week.search_range(today);
            let mut line = Vec::with_capacity(SignalType::ALL.len());
            for signal in SignalType::ALL {
                let query = SearchQuery::for_signal(assistant, signal, from, to);
                let count =
                    backend
                        .count(&query)
                        .await
                        .map_err(|source| CollectError::Query {
                            assistant: assistant.name.clone(),
                            signal,
                            week_start: week.start,
                            source,
                        })?;
                builder.record(&assistant.name, signal, week, count)?;
                counter!("collector_queries_total").increment(1);
                line.push(count);
                pause(config.pacing.query_pause()).await;
            }
            debug!(
                assistant = %assistant.name,
                week = %week.start,
                partial = week.is_partial(today),
                counts = ?line,
                "week collected"
            );
        }

        if i + 1 < n_assistants {
            let wait = config.pacing.assistant_pause();
            if !wait.is_zero() {
                info!(wait_secs = wait.as_secs(), "pausing before next assistant");
            }
            pause(wait).await;
        }
    }

    let snapshot = builder.finish()?;
    gauge!("collector_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
    Ok(snapshot)
}

/// Full collector run: credential check, collection, then one write of the snapshot file.
///
/// A credential failure returns before any search is issued; any failure returns
/// before the file is touched, so a previous snapshot stays intact.
pub async fn run_collection(
    backend: &dyn SearchBackend,
    config: &AnalysisConfig,
    output: &Path,
    today: NaiveDate,
) -> Result<Snapshot, CollectError> {
    backend
        .verify_credential()
        .await
        .map_err(CollectError::Credential)?;

    let snapshot = collect_snapshot(backend, config, today).await?;
    snapshot.write_to(output)?;
    info!(path = %output.display(), "snapshot written");

    log_summary(&snapshot);
    Ok(snapshot)
}

/// Per-assistant totals across all weeks.
pub fn log_summary(snapshot: &Snapshot) {
    for name in snapshot.assistant_names() {
        let direct = snapshot.total(name, SignalType::DirectCommit);
        let coauthored = snapshot.total(name, SignalType::CoAuthoredCommit);
        let mentions = snapshot.total(name, SignalType::RepositoryMention);
        info!(
            assistant = name,
            direct,
            coauthored,
            commits = direct.saturating_add(coauthored),
            mentions,
            "summary"
        );
    }
}

async fn pause(d: Duration) {
    if !d.is_zero() {
        tokio::time::sleep(d).await;
    }
}
