// src/lib.rs
// Public library surface shared by the `collect` and `plot` binaries and the integration tests.

pub mod collector;
pub mod config;
pub mod error;
pub mod github;
pub mod model;
pub mod plot;
pub mod snapshot;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::collector::{collect_snapshot, run_collection};
pub use crate::error::{CollectError, SearchError, SnapshotError};
pub use crate::model::{Assistant, SignalType, WeekBucket};
pub use crate::snapshot::{Snapshot, WeekCount};
