// src/plot/svg.rs
//! Minimal SVG renderers: multi-line time chart and stacked bar chart.

use std::fmt::Write as _;

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};

use super::series::Series;

const WIDTH: f64 = 1120.0;
const HEIGHT: f64 = 640.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 220.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 80.0;
const Y_TICKS: u64 = 5;
const MAX_X_LABELS: usize = 10;

const TEXT_COLOR: &str = "#2c3e50";
const AXIS_COLOR: &str = "#e0e0e0";
const FONT: &str = "Helvetica, Arial, sans-serif";

/// Compact axis label: 950 -> "950", 1200 -> "1K", 2_500_000 -> "2M".
pub fn format_count(v: u64) -> String {
    if v >= 1_000_000 {
        format!("{}M", v / 1_000_000)
    } else if v >= 1_000 {
        format!("{}K", v / 1_000)
    } else {
        v.to_string()
    }
}

/// Smallest 1/2/5 x 10^n step so that `Y_TICKS` steps cover `max`.
pub fn nice_axis_max(max: u64) -> u64 {
    if max == 0 {
        return Y_TICKS;
    }
    let raw = max.div_ceil(Y_TICKS);
    let mut magnitude = 1u64;
    while magnitude.saturating_mul(10) <= raw {
        magnitude = magnitude.saturating_mul(10);
    }
    let step = [1u64, 2, 5, 10]
        .iter()
        .map(|m| m.saturating_mul(magnitude))
        .find(|s| *s >= raw)
        .unwrap_or(raw);
    step.saturating_mul(Y_TICKS)
}

struct Plot {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

impl Plot {
    fn new() -> Self {
        Self {
            x0: MARGIN_LEFT,
            x1: WIDTH - MARGIN_RIGHT,
            y0: HEIGHT - MARGIN_BOTTOM,
            y1: MARGIN_TOP,
        }
    }

    fn y(&self, v: u64, y_max: u64) -> f64 {
        self.y0 - (v as f64 / y_max.max(1) as f64) * (self.y0 - self.y1)
    }
}

fn open(out: &mut String, title: &str) {
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="{FONT}">"#
    );
    out.push('\n');
    let _ = writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        out,
        r#"<text x="{}" y="40" text-anchor="middle" font-size="24" font-weight="bold" fill="{TEXT_COLOR}">{}</text>"#,
        WIDTH / 2.0,
        encode_text(title)
    );
}

fn y_axis(out: &mut String, plot: &Plot, y_max: u64, y_label: &str) {
    for i in 0..=Y_TICKS {
        let v = y_max / Y_TICKS * i;
        let y = plot.y(v, y_max);
        let _ = writeln!(
            out,
            r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{AXIS_COLOR}" stroke-width="1"/>"#,
            plot.x0, plot.x1
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="13" fill="{TEXT_COLOR}">{}</text>"#,
            plot.x0 - 10.0,
            y + 4.0,
            format_count(v)
        );
    }
    let mid = (plot.y0 + plot.y1) / 2.0;
    let _ = writeln!(
        out,
        r#"<text x="24" y="{mid:.1}" text-anchor="middle" font-size="16" fill="{TEXT_COLOR}" transform="rotate(-90 24 {mid:.1})">{}</text>"#,
        encode_text(y_label)
    );
}

fn legend(out: &mut String, plot: &Plot, entries: &[(&str, &str)]) {
    for (i, (label, color)) in entries.iter().enumerate() {
        let y = plot.y1 + 10.0 + i as f64 * 26.0;
        let x = plot.x1 + 24.0;
        let _ = writeln!(
            out,
            r##"<rect x="{x:.1}" y="{:.1}" width="18" height="12" fill="{}" stroke="#333333" stroke-width="0.5"/>"##,
            y - 10.0,
            encode_double_quoted_attribute(color)
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{y:.1}" font-size="15" fill="{TEXT_COLOR}">{}</text>"#,
            x + 26.0,
            encode_text(label)
        );
    }
}

fn no_data(out: &mut String, plot: &Plot) {
    let _ = writeln!(
        out,
        r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="18" fill="#999999">no data</text>"##,
        (plot.x0 + plot.x1) / 2.0,
        (plot.y0 + plot.y1) / 2.0
    );
}

/// Lines over a shared date axis.
pub fn line_chart(title: &str, y_label: &str, series: &[Series]) -> String {
    let mut out = String::new();
    open(&mut out, title);
    let plot = Plot::new();

    let mut dates: Vec<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.0))
        .collect();
    dates.sort();
    dates.dedup();

    let max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.1))
        .max()
        .unwrap_or(0);
    let y_max = nice_axis_max(max);
    y_axis(&mut out, &plot, y_max, y_label);

    let (Some(first), Some(last)) = (dates.first().copied(), dates.last().copied()) else {
        no_data(&mut out, &plot);
        out.push_str("</svg>\n");
        return out;
    };
    let span = (last - first).num_days().max(1) as f64;
    let x_of = |d: NaiveDate| {
        if first == last {
            (plot.x0 + plot.x1) / 2.0
        } else {
            plot.x0 + (d - first).num_days() as f64 / span * (plot.x1 - plot.x0)
        }
    };

    let every = dates.len().div_ceil(MAX_X_LABELS).max(1);
    for d in dates.iter().step_by(every) {
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13" fill="{TEXT_COLOR}">{}</text>"#,
            x_of(*d),
            plot.y0 + 24.0,
            d.format("%b %d")
        );
    }
    let _ = writeln!(
        out,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="16" fill="{TEXT_COLOR}">Week starting</text>"#,
        (plot.x0 + plot.x1) / 2.0,
        HEIGHT - 20.0
    );

    for s in series.iter().filter(|s| !s.points.is_empty()) {
        let pts: Vec<String> = s
            .points
            .iter()
            .map(|&(d, v)| format!("{:.1},{:.1}", x_of(d), plot.y(v, y_max)))
            .collect();
        let _ = writeln!(
            out,
            r#"<polyline fill="none" stroke="{}" stroke-width="3.5" stroke-linejoin="round" points="{}"><title>{}</title></polyline>"#,
            encode_double_quoted_attribute(&s.color),
            pts.join(" "),
            encode_text(&s.label)
        );
    }

    let entries: Vec<(&str, &str)> = series
        .iter()
        .map(|s| (s.label.as_str(), s.color.as_str()))
        .collect();
    legend(&mut out, &plot, &entries);
    out.push_str("</svg>\n");
    out
}

/// One stacked bar per category; `stacks` are (label, colour, value per category).
pub fn stacked_bar_chart(
    title: &str,
    y_label: &str,
    categories: &[String],
    stacks: &[(String, String, Vec<u64>)],
) -> String {
    let mut out = String::new();
    open(&mut out, title);
    let plot = Plot::new();

    let totals: Vec<u64> = (0..categories.len())
        .map(|i| {
            stacks
                .iter()
                .map(|(_, _, v)| v.get(i).copied().unwrap_or(0))
                .fold(0u64, u64::saturating_add)
        })
        .collect();
    let y_max = nice_axis_max(totals.iter().copied().max().unwrap_or(0));
    y_axis(&mut out, &plot, y_max, y_label);

    if categories.is_empty() {
        no_data(&mut out, &plot);
        out.push_str("</svg>\n");
        return out;
    }

    let slot = (plot.x1 - plot.x0) / categories.len() as f64;
    let bar = slot * 0.6;
    for (i, name) in categories.iter().enumerate() {
        let x = plot.x0 + slot * i as f64 + (slot - bar) / 2.0;
        let mut base = 0u64;
        for (label, color, values) in stacks {
            let v = values.get(i).copied().unwrap_or(0);
            if v == 0 {
                continue;
            }
            let top = base.saturating_add(v);
            let y_top = plot.y(top, y_max);
            let h = plot.y(base, y_max) - y_top;
            let _ = writeln!(
                out,
                r#"<rect x="{x:.1}" y="{y_top:.1}" width="{bar:.1}" height="{h:.1}" fill="{}" stroke="white" stroke-width="2"><title>{}: {} {v}</title></rect>"#,
                encode_double_quoted_attribute(color),
                encode_text(name),
                encode_text(label)
            );
            base = top;
        }
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="15" fill="{TEXT_COLOR}">{}</text>"#,
            x + bar / 2.0,
            plot.y0 + 24.0,
            encode_text(name)
        );
    }

    let entries: Vec<(&str, &str)> = stacks
        .iter()
        .map(|(l, c, _)| (l.as_str(), c.as_str()))
        .collect();
    legend(&mut out, &plot, &entries);
    out.push_str("</svg>\n");
    out
}
