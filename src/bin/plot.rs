//! Plotter entry point: reads the snapshot file and writes SVG charts.

use ai_assistant_activity::config::{AnalysisConfig, RuntimePaths};
use ai_assistant_activity::{plot, telemetry, Snapshot};
use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing("info");

    let config = AnalysisConfig::load_default().context("loading assistants config")?;
    let paths = RuntimePaths::from_env();

    let snapshot = Snapshot::read_from(&paths.snapshot)
        .context("reading snapshot (run `collect` first to produce it)")?;
    info!(
        assistants = snapshot.assistant_names().count(),
        weeks = snapshot.week_starts().len(),
        "snapshot loaded"
    );

    let written = plot::render_to_dir(&snapshot, &config.assistants, &config.plot, &paths.plots_dir)?;
    info!(charts = written.len(), dir = %paths.plots_dir.display(), "all charts generated");
    Ok(())
}
