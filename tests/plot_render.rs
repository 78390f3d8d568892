// tests/plot_render.rs
use ai_assistant_activity::config::{AnalysisConfig, PlotOptions};
use ai_assistant_activity::model::week_buckets;
use ai_assistant_activity::plot::series::SeriesMode;
use ai_assistant_activity::plot::{build_charts, render_to_dir, BREAKDOWN_CHART, GROWTH_CHART};
use ai_assistant_activity::snapshot::SnapshotBuilder;
use ai_assistant_activity::{SignalType, Snapshot};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Builtin assistants plus one that is not configured; every count is 5.
fn snapshot() -> Snapshot {
    let weeks = week_buckets(d(2025, 2, 24), d(2025, 3, 10));
    let names = ["Claude Code", "Copilot", "Windsurf"];
    let mut b = SnapshotBuilder::new(names, &SignalType::ALL, &weeks);
    for name in names {
        for signal in SignalType::ALL {
            for w in &weeks {
                b.record(name, signal, w, 5).unwrap();
            }
        }
    }
    b.finish().unwrap()
}

#[test]
fn writes_one_file_per_chart() {
    let cfg = AnalysisConfig::builtin().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("plots");

    let written = render_to_dir(&snapshot(), &cfg.assistants, &cfg.plot, &out).unwrap();

    // growth + breakdown + 3 assistants + 3 signals
    assert_eq!(written.len(), 8);
    for name in [
        GROWTH_CHART,
        BREAKDOWN_CHART,
        "assistant_claude_code.svg",
        "assistant_copilot.svg",
        "assistant_windsurf.svg",
        "signal_direct_commit.svg",
        "signal_co_authored_commit.svg",
        "signal_repository_mention.svg",
    ] {
        let p = out.join(name);
        let svg = std::fs::read_to_string(&p).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(svg.starts_with("<svg"), "{name}");
    }
}

#[test]
fn breakdown_respects_chart_signals() {
    let cfg = AnalysisConfig::builtin().unwrap();
    let charts = build_charts(&snapshot(), &cfg.assistants, &cfg.plot);
    let breakdown = charts
        .iter()
        .find(|c| c.file_name == BREAKDOWN_CHART)
        .unwrap();

    // Copilot only charts co-authored commits: 3 weeks x 5.
    assert!(breakdown.svg.contains("Copilot: Co-authored commits 15"));
    assert!(!breakdown.svg.contains("Copilot: Direct commits"));
    // Unconfigured assistants chart everything.
    assert!(breakdown.svg.contains("Windsurf: Direct commits 15"));
}

#[test]
fn configured_colours_are_used() {
    let cfg = AnalysisConfig::builtin().unwrap();
    let charts = build_charts(&snapshot(), &cfg.assistants, &cfg.plot);
    let growth = charts.iter().find(|c| c.file_name == GROWTH_CHART).unwrap();
    assert!(growth.svg.contains("#D97554"));
    assert_eq!(growth.svg.matches("<polyline").count(), 3);
}

#[test]
fn until_cutoff_and_empty_snapshot() {
    let opts = PlotOptions {
        mode: SeriesMode::Weekly,
        until: Some(d(2025, 2, 20)),
    };
    let charts = build_charts(&snapshot(), &[], &opts);
    let growth = charts.iter().find(|c| c.file_name == GROWTH_CHART).unwrap();
    assert!(growth.svg.contains("no data"));

    let empty = build_charts(&Snapshot::default(), &[], &PlotOptions::default());
    // growth + breakdown + 3 signals, no per-assistant charts
    assert_eq!(empty.len(), 5);
}

#[test]
fn colliding_slugs_get_distinct_files() {
    let weeks = week_buckets(d(2025, 2, 24), d(2025, 3, 3));
    let names = ["Claude Code", "claude-code"];
    let mut b = SnapshotBuilder::new(names, &SignalType::ALL, &weeks);
    for name in names {
        for signal in SignalType::ALL {
            for w in &weeks {
                b.record(name, signal, w, 1).unwrap();
            }
        }
    }
    let snap = b.finish().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let written = render_to_dir(&snap, &[], &PlotOptions::default(), dir.path()).unwrap();

    let on_disk = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(written.len(), on_disk);
    assert!(dir.path().join("assistant_claude_code.svg").exists());
    assert!(dir.path().join("assistant_claude_code_2.svg").exists());
}
