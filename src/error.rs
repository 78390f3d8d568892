// src/error.rs
//! Error taxonomy: credential, query and file failures are all fatal to a run.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::SignalType;

/// Failures talking to the search API.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no GitHub credential configured (set GITHUB_TOKEN)")]
    MissingCredential,

    #[error("GitHub rejected the credential (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("rate limit still exceeded after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("search query `{query}` rejected: {message}")]
    Rejected { query: String, message: String },

    #[error("unexpected HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed search response: {0}")]
    Malformed(String),

    #[error("http transport: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SearchError {
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            SearchError::MissingCredential | SearchError::Unauthorized { .. }
        )
    }
}

/// Failures building, validating or persisting a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("reading snapshot {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing snapshot {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid snapshot: {0}")]
    Invalid(String),

    #[error("no count recorded for {assistant} / {signal} in week of {week_start}")]
    Missing {
        assistant: String,
        signal: SignalType,
        week_start: NaiveDate,
    },

    #[error("count for {assistant} / {signal} in week of {week_start} recorded twice")]
    Duplicate {
        assistant: String,
        signal: SignalType,
        week_start: NaiveDate,
    },
}

/// Failures of a collector run.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("credential check failed: {0}")]
    Credential(#[source] SearchError),

    #[error("query for {assistant} / {signal} in week of {week_start} failed: {source}")]
    Query {
        assistant: String,
        signal: SignalType,
        week_start: NaiveDate,
        #[source]
        source: SearchError,
    },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
