// src/plot/series.rs
//! Turning snapshot records into plottable point lists.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{SignalType, WEEK_DAYS};
use crate::snapshot::{SignalSeries, WeekCount};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesMode {
    /// Running total across weeks.
    #[default]
    Cumulative,
    /// Raw count per week.
    Weekly,
}

impl SeriesMode {
    pub fn axis_label(&self) -> &'static str {
        match self {
            SeriesMode::Cumulative => "Cumulative count",
            SeriesMode::Weekly => "Count per week",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: String,
    pub points: Vec<(NaiveDate, u64)>,
}

/// Records whose week ends on or before `until` (all of them when `None`).
pub fn weekly_points(records: &[WeekCount], until: Option<NaiveDate>) -> Vec<(NaiveDate, u64)> {
    records
        .iter()
        .filter(|w| match until {
            Some(limit) => w.week_start + Days::new(WEEK_DAYS - 1) <= limit,
            None => true,
        })
        .map(|w| (w.week_start, w.count))
        .collect()
}

pub fn cumulative(points: &[(NaiveDate, u64)]) -> Vec<(NaiveDate, u64)> {
    let mut total = 0u64;
    points
        .iter()
        .map(|&(d, c)| {
            total = total.saturating_add(c);
            (d, total)
        })
        .collect()
}

pub fn apply_mode(points: Vec<(NaiveDate, u64)>, mode: SeriesMode) -> Vec<(NaiveDate, u64)> {
    match mode {
        SeriesMode::Cumulative => cumulative(&points),
        SeriesMode::Weekly => points,
    }
}

/// Week-by-week sum of the selected signals. Signals missing from `series` are skipped.
pub fn sum_signals(series: &SignalSeries, which: &[SignalType]) -> Vec<WeekCount> {
    let mut out: Vec<WeekCount> = Vec::new();
    for signal in which {
        let Some(records) = series.get(signal) else {
            continue;
        };
        if out.is_empty() {
            out = records.clone();
            continue;
        }
        for (acc, w) in out.iter_mut().zip(records) {
            acc.count = acc.count.saturating_add(w.count);
        }
    }
    out
}
