// src/model.rs
//! Core value types: tracked assistants, signal kinds and week-aligned buckets.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of one bucket in days.
pub const WEEK_DAYS: u64 = 7;

/// Category of GitHub activity counted per assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalType {
    DirectCommit,
    CoAuthoredCommit,
    RepositoryMention,
}

impl SignalType {
    pub const ALL: [SignalType; 3] = [
        SignalType::DirectCommit,
        SignalType::CoAuthoredCommit,
        SignalType::RepositoryMention,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::DirectCommit => "direct-commit",
            SignalType::CoAuthoredCommit => "co-authored-commit",
            SignalType::RepositoryMention => "repository-mention",
        }
    }

    /// Human label for chart legends and log summaries.
    pub fn label(&self) -> &'static str {
        match self {
            SignalType::DirectCommit => "Direct commits",
            SignalType::CoAuthoredCommit => "Co-authored commits",
            SignalType::RepositoryMention => "Repository mentions",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked AI coding assistant, as declared in `config/assistants.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assistant {
    /// Display name; also the top-level key in the snapshot file.
    pub name: String,
    /// GitHub login used in `author:` / `co-authored-by:` qualifiers.
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Chart colour as `#RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Signals summed into the combined growth chart. All signals when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_signals: Option<Vec<SignalType>>,
}

impl Assistant {
    pub fn new(name: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            login: login.into(),
            email: None,
            color: None,
            chart_signals: None,
        }
    }

    pub fn charted_signals(&self) -> Vec<SignalType> {
        match &self.chart_signals {
            Some(v) if !v.is_empty() => v.clone(),
            _ => SignalType::ALL.to_vec(),
        }
    }

    /// File-name friendly form of the display name ("Claude Code" -> "claude_code").
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_sep = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            prev_sep = false;
        } else if !prev_sep {
            out.push('_');
            prev_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("assistant");
    }
    out
}

/// Half-open interval `[start, start + 7 days)`; bucket 0 starts at the anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekBucket {
    pub index: usize,
    pub start: NaiveDate,
}

impl WeekBucket {
    /// Exclusive end of the bucket.
    pub fn end(&self) -> NaiveDate {
        self.start + Days::new(WEEK_DAYS)
    }

    /// Last calendar day covered by the bucket.
    pub fn last_day(&self) -> NaiveDate {
        self.start + Days::new(WEEK_DAYS - 1)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end()
    }

    /// Inclusive date range used in search qualifiers, clipped to `today`.
    pub fn search_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let to = self.last_day().min(today).max(self.start);
        (self.start, to)
    }

    /// True while the bucket still has days in the future.
    pub fn is_partial(&self, today: NaiveDate) -> bool {
        today < self.last_day()
    }
}

/// All buckets from `anchor` up to and including the one containing `today`.
/// Empty when `today` precedes the anchor.
pub fn week_buckets(anchor: NaiveDate, today: NaiveDate) -> Vec<WeekBucket> {
    let mut out = Vec::new();
    let mut start = anchor;
    while start <= today {
        out.push(WeekBucket {
            index: out.len(),
            start,
        });
        match start.checked_add_days(Days::new(WEEK_DAYS)) {
            Some(next) => start = next,
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn three_buckets_with_partial_last_week() {
        let weeks = week_buckets(d(2025, 2, 24), d(2025, 3, 10));
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].start, d(2025, 2, 24));
        assert_eq!(weeks[0].end(), d(2025, 3, 3));
        assert_eq!(weeks[1].start, d(2025, 3, 3));
        assert_eq!(weeks[1].end(), d(2025, 3, 10));
        assert_eq!(weeks[2].start, d(2025, 3, 10));
        assert_eq!(weeks[2].end(), d(2025, 3, 17));
        assert!(weeks[2].is_partial(d(2025, 3, 10)));
        assert!(!weeks[1].is_partial(d(2025, 3, 10)));
    }

    #[test]
    fn buckets_are_contiguous_and_indexed() {
        let weeks = week_buckets(d(2025, 2, 24), d(2025, 7, 1));
        for (i, pair) in weeks.windows(2).enumerate() {
            assert_eq!(pair[0].end(), pair[1].start);
            assert_eq!(pair[0].index, i);
        }
        assert!(weeks.last().unwrap().contains(d(2025, 7, 1)));
    }

    #[test]
    fn anchor_day_yields_single_bucket_and_earlier_yields_none() {
        assert_eq!(week_buckets(d(2025, 2, 24), d(2025, 2, 24)).len(), 1);
        assert!(week_buckets(d(2025, 2, 24), d(2025, 2, 23)).is_empty());
    }

    #[test]
    fn search_range_is_clipped_to_today() {
        let w = WeekBucket {
            index: 2,
            start: d(2025, 3, 10),
        };
        assert_eq!(w.search_range(d(2025, 3, 12)), (d(2025, 3, 10), d(2025, 3, 12)));
        assert_eq!(w.search_range(d(2025, 4, 1)), (d(2025, 3, 10), d(2025, 3, 16)));
    }

    #[test]
    fn signal_names_match_serde() {
        for s in SignalType::ALL {
            let json = serde_json::to_string(&s).unwrap();
            assert_eq!(json, format!("\"{}\"", s.as_str()));
        }
    }

    #[test]
    fn slug_is_filename_safe() {
        assert_eq!(slugify("Claude Code"), "claude_code");
        assert_eq!(slugify("Copilot (coauthored only)"), "copilot_coauthored_only");
        assert_eq!(slugify("  "), "assistant");
    }
}
