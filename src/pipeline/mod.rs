// src/pipeline/mod.rs

//! Pipeline entry points.
//!
//! - `run_sources`: collect each selected source in order
//! - `Aggregator`: merge batches across sources and export them
//! - `run_pipeline`: both, plus run statistics

pub mod collect;
pub mod merge;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod stats;

pub use collect::{build_adapter, run_sources};
pub use merge::Aggregator;
pub use pipeline::{RunReport, run_pipeline};
pub use stats::RunStats;
