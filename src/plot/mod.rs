// src/plot/mod.rs
//! Chart generation from a saved snapshot. Pure presentation: no counts are derived
//! here beyond running totals and per-week sums.

pub mod series;
pub mod svg;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::PlotOptions;
use crate::model::{slugify, Assistant, SignalType};
use crate::snapshot::Snapshot;
use series::{apply_mode, cumulative, sum_signals, weekly_points, Series};

pub const GROWTH_CHART: &str = "weekly_growth_chart.svg";
pub const BREAKDOWN_CHART: &str = "signal_breakdown_chart.svg";

const PALETTE: [&str; 8] = [
    "#F77189", "#BB9832", "#50B131", "#36ADA4", "#3BA3EC", "#E866F4", "#FECA57", "#715CD7",
];

pub fn signal_color(signal: SignalType) -> &'static str {
    match signal {
        SignalType::DirectCommit => "#4ECDC4",
        SignalType::CoAuthoredCommit => "#FF6B6B",
        SignalType::RepositoryMention => "#FECA57",
    }
}

/// A rendered chart, ready to be written under the plots directory.
#[derive(Debug, Clone)]
pub struct Chart {
    pub file_name: String,
    pub svg: String,
}

/// Resolves per-assistant chart settings; assistants absent from the config
/// get palette colours and all signals.
struct Styles<'a> {
    assistants: &'a [Assistant],
}

impl Styles<'_> {
    fn color(&self, name: &str, position: usize) -> String {
        self.assistants
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.color.clone())
            .unwrap_or_else(|| PALETTE[position % PALETTE.len()].to_string())
    }

    fn charted_signals(&self, name: &str) -> Vec<SignalType> {
        self.assistants
            .iter()
            .find(|a| a.name == name)
            .map(Assistant::charted_signals)
            .unwrap_or_else(|| SignalType::ALL.to_vec())
    }
}

/// Build every chart for `snapshot`.
pub fn build_charts(
    snapshot: &Snapshot,
    assistants: &[Assistant],
    opts: &PlotOptions,
) -> Vec<Chart> {
    let styles = Styles { assistants };
    let mut charts = vec![
        growth_chart(snapshot, &styles, opts),
        breakdown_chart(snapshot, &styles, opts),
    ];

    let mut used_slugs = HashSet::new();
    for (name, signals) in snapshot.iter() {
        let lines: Vec<Series> = signals
            .iter()
            .map(|(signal, records)| Series {
                label: signal.label().to_string(),
                color: signal_color(*signal).to_string(),
                points: apply_mode(weekly_points(records, opts.until), opts.mode),
            })
            .collect();
        charts.push(Chart {
            file_name: format!("assistant_{}.svg", unique_slug(name, &mut used_slugs)),
            svg: svg::line_chart(
                &format!("{name}: GitHub activity"),
                opts.mode.axis_label(),
                &lines,
            ),
        });
    }

    for signal in SignalType::ALL {
        let lines: Vec<Series> = snapshot
            .iter()
            .enumerate()
            .filter_map(|(pos, (name, signals))| {
                signals.get(&signal).map(|records| Series {
                    label: name.to_string(),
                    color: styles.color(name, pos),
                    points: apply_mode(weekly_points(records, opts.until), opts.mode),
                })
            })
            .collect();
        charts.push(Chart {
            file_name: format!("signal_{}.svg", signal.as_str().replace('-', "_")),
            svg: svg::line_chart(signal.label(), opts.mode.axis_label(), &lines),
        });
    }

    charts
}

/// `slugify(name)`, with `_2`, `_3`, ... appended when an earlier name took the same slug.
fn unique_slug(name: &str, used: &mut HashSet<String>) -> String {
    let base = slugify(name);
    let mut slug = base.clone();
    let mut n = 2;
    while !used.insert(slug.clone()) {
        slug = format!("{base}_{n}");
        n += 1;
    }
    slug
}

/// Cumulative sum of each assistant's charted signals.
fn growth_chart(snapshot: &Snapshot, styles: &Styles<'_>, opts: &PlotOptions) -> Chart {
    let lines: Vec<Series> = snapshot
        .iter()
        .enumerate()
        .map(|(pos, (name, signals))| {
            let summed = sum_signals(signals, &styles.charted_signals(name));
            Series {
                label: name.to_string(),
                color: styles.color(name, pos),
                points: cumulative(&weekly_points(&summed, opts.until)),
            }
        })
        .collect();
    Chart {
        file_name: GROWTH_CHART.to_string(),
        svg: svg::line_chart("GitHub activity (cumulative)", "Cumulative count", &lines),
    }
}

/// Totals per assistant, stacked by signal.
fn breakdown_chart(snapshot: &Snapshot, styles: &Styles<'_>, opts: &PlotOptions) -> Chart {
    let names: Vec<String> = snapshot.assistant_names().map(str::to_string).collect();
    let stacks: Vec<(String, String, Vec<u64>)> = SignalType::ALL
        .iter()
        .map(|signal| {
            let values: Vec<u64> = names
                .iter()
                .map(|name| {
                    if !styles.charted_signals(name).contains(signal) {
                        return 0;
                    }
                    snapshot
                        .series(name, *signal)
                        .map(|records| {
                            weekly_points(records, opts.until)
                                .iter()
                                .fold(0u64, |acc, p| acc.saturating_add(p.1))
                        })
                        .unwrap_or(0)
                })
                .collect();
            (signal.label().to_string(), signal_color(*signal).to_string(), values)
        })
        .collect();
    Chart {
        file_name: BREAKDOWN_CHART.to_string(),
        svg: svg::stacked_bar_chart(
            "Activity breakdown by signal",
            "Total count",
            &names,
            &stacks,
        ),
    }
}

/// Render all charts into `dir` (created if missing). Returns the written paths.
pub fn render_to_dir(
    snapshot: &Snapshot,
    assistants: &[Assistant],
    opts: &PlotOptions,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating plots dir {}", dir.display()))?;
    let mut written = Vec::new();
    for chart in build_charts(snapshot, assistants, opts) {
        let path = dir.join(&chart.file_name);
        fs::write(&path, chart.svg.as_bytes())
            .with_context(|| format!("writing chart {}", path.display()))?;
        info!(path = %path.display(), "chart written");
        written.push(path);
    }
    Ok(written)
}
