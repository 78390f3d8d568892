// src/snapshot.rs
//! Weekly count snapshot: assistant -> signal -> week records, plus its JSON file format.
//!
//! ```json
//! { "Claude Code": { "direct-commit": [ { "week_start": "2025-02-24", "count": 12 } ] } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::model::{SignalType, WeekBucket, WEEK_DAYS};

pub const DEFAULT_SNAPSHOT_PATH: &str = "data/ai_assistant_github_analysis.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekCount {
    pub week_start: NaiveDate,
    pub count: u64,
}

/// Per-assistant series, one ordered list of week records per signal.
pub type SignalSeries = BTreeMap<SignalType, Vec<WeekCount>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    assistants: BTreeMap<String, SignalSeries>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.assistants.is_empty()
    }

    pub fn assistant_names(&self) -> impl Iterator<Item = &str> {
        self.assistants.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignalSeries)> {
        self.assistants.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn signals(&self, assistant: &str) -> Option<&SignalSeries> {
        self.assistants.get(assistant)
    }

    pub fn series(&self, assistant: &str, signal: SignalType) -> Option<&[WeekCount]> {
        self.assistants
            .get(assistant)
            .and_then(|s| s.get(&signal))
            .map(Vec::as_slice)
    }

    /// Week starts shared by every series (taken from the first one).
    pub fn week_starts(&self) -> Vec<NaiveDate> {
        self.assistants
            .values()
            .flat_map(|s| s.values())
            .next()
            .map(|v| v.iter().map(|w| w.week_start).collect())
            .unwrap_or_default()
    }

    pub fn total(&self, assistant: &str, signal: SignalType) -> u64 {
        self.series(assistant, signal)
            .map(|v| v.iter().fold(0u64, |acc, w| acc.saturating_add(w.count)))
            .unwrap_or(0)
    }

    /// Check the file-level invariants: every assistant carries a series for every
    /// signal type, weeks are contiguous 7-day steps and identical across all series.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut reference_weeks: Option<Vec<NaiveDate>> = None;

        for (name, series) in &self.assistants {
            if name.trim().is_empty() {
                return Err(SnapshotError::Invalid("empty assistant name".into()));
            }

            if let Some(missing) = SignalType::ALL.iter().find(|s| !series.contains_key(*s)) {
                return Err(SnapshotError::Invalid(format!(
                    "assistant {name} has no {missing} series"
                )));
            }

            for (signal, records) in series {
                for pair in records.windows(2) {
                    let expected = pair[0].week_start.checked_add_days(Days::new(WEEK_DAYS));
                    if expected != Some(pair[1].week_start) {
                        return Err(SnapshotError::Invalid(format!(
                            "{name} / {signal}: week {} does not follow {}",
                            pair[1].week_start, pair[0].week_start
                        )));
                    }
                }

                let weeks: Vec<NaiveDate> = records.iter().map(|w| w.week_start).collect();
                if let Some(r) = &reference_weeks {
                    if *r != weeks {
                        return Err(SnapshotError::Invalid(format!(
                            "{name} / {signal}: {} weeks starting {:?}, expected {} starting {:?}",
                            weeks.len(),
                            weeks.first(),
                            r.len(),
                            r.first()
                        )));
                    }
                } else {
                    reference_weeks = Some(weeks);
                }
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(s)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Replace the file at `path` with this snapshot (temp file + rename).
    /// On failure the temp file is removed and any previous file is left as it was.
    pub fn write_to(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = self.to_json_pretty()?;
        let write_err = |source| SnapshotError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = tmp_path(path);
        let res = write_then_rename(&tmp, path, json.as_bytes());
        if res.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        res.map_err(write_err)
    }

    pub fn read_from(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }
}

fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut f = fs::File::create(tmp)?;
    f.write_all(bytes)?;
    f.write_all(b"\n")?;
    f.sync_all()?;
    drop(f);
    fs::rename(tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Collects counts slot by slot; `finish` refuses to produce a snapshot with holes.
#[derive(Debug)]
pub struct SnapshotBuilder {
    weeks: Vec<WeekBucket>,
    slots: BTreeMap<String, BTreeMap<SignalType, Vec<Option<u64>>>>,
}

impl SnapshotBuilder {
    pub fn new<'a, I>(assistants: I, signals: &[SignalType], weeks: &[WeekBucket]) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let slots = assistants
            .into_iter()
            .map(|name| {
                let per_signal = signals
                    .iter()
                    .map(|s| (*s, vec![None; weeks.len()]))
                    .collect();
                (name.to_string(), per_signal)
            })
            .collect();
        Self {
            weeks: weeks.to_vec(),
            slots,
        }
    }

    pub fn record(
        &mut self,
        assistant: &str,
        signal: SignalType,
        week: &WeekBucket,
        count: u64,
    ) -> Result<(), SnapshotError> {
        if self.weeks.get(week.index).map(|w| w.start) != Some(week.start) {
            return Err(SnapshotError::Invalid(format!(
                "week {} (#{}) is not part of this run",
                week.start, week.index
            )));
        }
        let slot = self
            .slots
            .get_mut(assistant)
            .and_then(|s| s.get_mut(&signal))
            .and_then(|v| v.get_mut(week.index))
            .ok_or_else(|| {
                SnapshotError::Invalid(format!("undeclared series {assistant} / {signal}"))
            })?;
        if slot.is_some() {
            return Err(SnapshotError::Duplicate {
                assistant: assistant.to_string(),
                signal,
                week_start: week.start,
            });
        }
        *slot = Some(count);
        Ok(())
    }

    pub fn finish(self) -> Result<Snapshot, SnapshotError> {
        let mut assistants = BTreeMap::new();
        for (name, per_signal) in self.slots {
            let mut series = SignalSeries::new();
            for (signal, counts) in per_signal {
                let mut records = Vec::with_capacity(counts.len());
                for (week, count) in self.weeks.iter().zip(counts) {
                    let count = count.ok_or_else(|| SnapshotError::Missing {
                        assistant: name.clone(),
                        signal,
                        week_start: week.start,
                    })?;
                    records.push(WeekCount {
                        week_start: week.start,
                        count,
                    });
                }
                series.insert(signal, records);
            }
            assistants.insert(name, series);
        }
        Ok(Snapshot { assistants })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::week_buckets;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn weeks() -> Vec<WeekBucket> {
        week_buckets(d(2025, 2, 24), d(2025, 3, 10))
    }

    #[test]
    fn finish_rejects_unfilled_slot() {
        let w = weeks();
        let mut b = SnapshotBuilder::new(["Jules"], &[SignalType::DirectCommit], &w);
        b.record("Jules", SignalType::DirectCommit, &w[0], 1).unwrap();
        b.record("Jules", SignalType::DirectCommit, &w[2], 3).unwrap();
        match b.finish() {
            Err(SnapshotError::Missing { week_start, .. }) => assert_eq!(week_start, w[1].start),
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn record_rejects_duplicates_and_unknown_series() {
        let w = weeks();
        let mut b = SnapshotBuilder::new(["Jules"], &[SignalType::DirectCommit], &w);
        b.record("Jules", SignalType::DirectCommit, &w[0], 1).unwrap();
        assert!(matches!(
            b.record("Jules", SignalType::DirectCommit, &w[0], 2),
            Err(SnapshotError::Duplicate { .. })
        ));
        assert!(matches!(
            b.record("Cursor", SignalType::DirectCommit, &w[0], 2),
            Err(SnapshotError::Invalid(_))
        ));
        assert!(matches!(
            b.record("Jules", SignalType::RepositoryMention, &w[0], 2),
            Err(SnapshotError::Invalid(_))
        ));
    }

    #[test]
    fn validate_rejects_gap_in_weeks() {
        let json = r#"{
            "Jules": {
                "direct-commit": [
                    { "week_start": "2025-02-24", "count": 1 },
                    { "week_start": "2025-03-10", "count": 2 }
                ],
                "co-authored-commit": [],
                "repository-mention": []
            }
        }"#;
        match Snapshot::from_json_str(json) {
            Err(SnapshotError::Invalid(msg)) => assert!(msg.contains("does not follow"), "{msg}"),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_mismatched_lengths() {
        let json = r#"{
            "Jules": {
                "direct-commit": [ { "week_start": "2025-02-24", "count": 1 } ],
                "co-authored-commit": [
                    { "week_start": "2025-02-24", "count": 1 },
                    { "week_start": "2025-03-03", "count": 0 }
                ],
                "repository-mention": [ { "week_start": "2025-02-24", "count": 0 } ]
            }
        }"#;
        match Snapshot::from_json_str(json) {
            Err(SnapshotError::Invalid(msg)) => assert!(msg.contains("expected 1"), "{msg}"),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn validate_requires_every_signal_per_assistant() {
        assert!(matches!(
            Snapshot::from_json_str(r#"{ "Jules": {}, "Cursor": {} }"#),
            Err(SnapshotError::Invalid(_))
        ));

        let partial = r#"{
            "Jules": {
                "direct-commit": [],
                "co-authored-commit": []
            }
        }"#;
        match Snapshot::from_json_str(partial) {
            Err(SnapshotError::Invalid(msg)) => assert!(msg.contains("repository-mention"), "{msg}"),
            other => panic!("expected Invalid, got {other:?}"),
        }

        let complete = r#"{
            "Jules": {
                "direct-commit": [],
                "co-authored-commit": [],
                "repository-mention": []
            }
        }"#;
        assert!(Snapshot::from_json_str(complete).is_ok());
    }

    #[test]
    fn negative_counts_do_not_parse() {
        let json = r#"{ "Jules": { "direct-commit": [ { "week_start": "2025-02-24", "count": -1 } ] } }"#;
        assert!(matches!(
            Snapshot::from_json_str(json),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn tmp_path_sits_next_to_target() {
        let p = Path::new("data/out.json");
        assert_eq!(tmp_path(p), PathBuf::from("data/out.json.tmp"));
    }
}
