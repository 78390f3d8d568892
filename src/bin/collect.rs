//! Collector entry point: queries GitHub search for every configured assistant
//! and writes the weekly snapshot file.

use ai_assistant_activity::config::{env::api_base_url, AnalysisConfig, RuntimePaths};
use ai_assistant_activity::github::{Credential, GithubClient};
use ai_assistant_activity::{collector, telemetry};
use anyhow::Context;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env when present; a real environment wins.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing("info");

    let config = AnalysisConfig::load_default().context("loading assistants config")?;
    let paths = RuntimePaths::from_env();

    // Missing token aborts here, before any request or file write.
    let credential = Credential::from_env()?;
    let client = GithubClient::new(api_base_url(), credential)?;

    let today = chrono::Utc::now().date_naive();
    info!(
        anchor = %config.anchor_date,
        %today,
        assistants = config.assistants.len(),
        output = %paths.snapshot.display(),
        "starting collection"
    );

    collector::run_collection(&client, &config, &paths.snapshot, today).await?;
    Ok(())
}
