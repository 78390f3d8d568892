// src/config/analysis.rs
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::Assistant;
use crate::plot::series::SeriesMode;

pub const ENV_CONFIG_PATH: &str = "ASSISTANTS_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/assistants.toml";

const BUILTIN_CONFIG: &str = include_str!("../../config/assistants.toml");

fn default_query_pause_ms() -> u64 {
    1000
}
fn default_assistant_pause_secs() -> u64 {
    30
}

/// Delays between requests, to stay clear of the search API's secondary limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    #[serde(default = "default_query_pause_ms")]
    pub query_pause_ms: u64,
    #[serde(default = "default_assistant_pause_secs")]
    pub assistant_pause_secs: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            query_pause_ms: default_query_pause_ms(),
            assistant_pause_secs: default_assistant_pause_secs(),
        }
    }
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            query_pause_ms: 0,
            assistant_pause_secs: 0,
        }
    }

    pub fn query_pause(&self) -> Duration {
        Duration::from_millis(self.query_pause_ms)
    }

    pub fn assistant_pause(&self) -> Duration {
        Duration::from_secs(self.assistant_pause_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotOptions {
    #[serde(default)]
    pub mode: SeriesMode,
    /// Weeks whose last day falls after this date are left out of charts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
}

/// Contents of `config/assistants.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Start of bucket 0.
    pub anchor_date: NaiveDate,
    #[serde(default)]
    pub pacing: Pacing,
    #[serde(default)]
    pub plot: PlotOptions,
    #[serde(rename = "assistant", default)]
    pub assistants: Vec<Assistant>,
}

impl AnalysisConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AnalysisConfig = toml::from_str(s).context("parsing assistants config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading assistants config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("loading assistants config from {}", path.display()))
    }

    /// Config compiled into the binary (the repo's `config/assistants.toml`).
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CONFIG)
    }

    /// Load using env var + fallbacks:
    /// 1) $ASSISTANTS_CONFIG_PATH
    /// 2) config/assistants.toml
    /// 3) built-in copy
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!(
                "{ENV_CONFIG_PATH} points to non-existent path {}",
                pb.display()
            ));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_PATH);
        if local.exists() {
            return Self::load_from(&local);
        }
        tracing::debug!("no {DEFAULT_CONFIG_PATH} in working dir, using built-in config");
        Self::builtin()
    }

    pub fn assistant(&self, name: &str) -> Option<&Assistant> {
        self.assistants.iter().find(|a| a.name == name)
    }

    fn validate(&self) -> Result<()> {
        if self.assistants.is_empty() {
            bail!("no [[assistant]] entries configured");
        }
        let mut seen = HashSet::new();
        let mut slugs = HashSet::new();
        for a in &self.assistants {
            if a.name.trim().is_empty() {
                bail!("assistant with empty name (login {:?})", a.login);
            }
            if !seen.insert(a.name.as_str()) {
                bail!("duplicate assistant name {:?}", a.name);
            }
            if !slugs.insert(a.slug()) {
                bail!(
                    "assistant {:?} maps to chart file name {:?} already used by another assistant",
                    a.name,
                    a.slug()
                );
            }
            if a.login.trim().is_empty() {
                bail!("assistant {:?} has an empty login", a.name);
            }
            if let Some(c) = &a.color {
                if !is_hex_color(c) {
                    bail!("assistant {:?}: color {c:?} is not #RRGGBB", a.name);
                }
            }
            if matches!(&a.chart_signals, Some(v) if v.is_empty()) {
                bail!("assistant {:?}: chart_signals must not be empty", a.name);
            }
        }
        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
