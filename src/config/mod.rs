// src/config/mod.rs
pub mod analysis;
pub mod env;

pub use analysis::{AnalysisConfig, Pacing, PlotOptions};
pub use env::RuntimePaths;
