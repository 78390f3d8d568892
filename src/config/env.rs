// src/config/env.rs
//! Environment-driven runtime settings (paths, API endpoint).

use std::path::PathBuf;

use crate::github::DEFAULT_API_URL;
use crate::snapshot::DEFAULT_SNAPSHOT_PATH;

pub const ENV_API_URL: &str = "GITHUB_API_URL";
pub const ENV_OUTPUT_PATH: &str = "ANALYSIS_OUTPUT_PATH";
pub const ENV_PLOTS_DIR: &str = "PLOTS_DIR";

pub const DEFAULT_PLOTS_DIR: &str = "plots";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub snapshot: PathBuf,
    pub plots_dir: PathBuf,
}

impl RuntimePaths {
    pub fn from_env() -> Self {
        Self {
            snapshot: env_path(ENV_OUTPUT_PATH, DEFAULT_SNAPSHOT_PATH),
            plots_dir: env_path(ENV_PLOTS_DIR, DEFAULT_PLOTS_DIR),
        }
    }
}

pub fn api_base_url() -> String {
    std::env::var(ENV_API_URL)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
