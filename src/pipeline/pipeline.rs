// src/pipeline/pipeline.rs

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{CompanyRecord, Config};
use crate::services::RuleSet;
use crate::sources::SourceOutcome;
use crate::storage::{ExportMetadata, RecordStorage};
use crate::utils::http::Fetcher;
use crate::utils::log;

use super::collect::run_sources;
use super::merge::Aggregator;
use super::stats::RunStats;

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<SourceOutcome>,
    pub merged: Vec<CompanyRecord>,
    pub stats: RunStats,
    pub files: Vec<ExportMetadata>,
    pub report: Option<PathBuf>,
}

/// Run the full pipeline: collect every selected source, merge, export.
///
/// Source failures only shrink the result; a failure to write the merged
/// table is returned as an error.
pub async fn run_pipeline(
    config: &Config,
    fetcher: Arc<dyn Fetcher>,
    storage: &dyn RecordStorage,
) -> Result<RunReport> {
    let started_at = Utc::now();
    log::header("Company aggregation");

    let rules = RuleSet::from_config(config)?;
    let sources = &config.collect.sources;

    log::step(1, 3, &format!("Collect - {} sources", sources.len()));
    let outcomes = run_sources(config, sources, fetcher, rules).await;

    log::step(2, 3, "Merge - Cross-source deduplication");
    let batches: Vec<_> = outcomes
        .iter()
        .map(|o| (o.source, o.records.as_slice()))
        .collect();
    let merged = Aggregator::merge(batches.iter().copied());

    log::step(3, 3, "Export - Writing tables");
    let aggregator = Aggregator::new(storage, &config.export);
    let mut files = vec![aggregator.save(&merged).await?];
    if config.export.per_source {
        files.extend(aggregator.save_per_source(batches.iter().copied()).await?);
    }

    let stats = RunStats::compute(&outcomes, &merged);
    let report = if config.export.report {
        Some(aggregator.save_report(&stats.per_source, &merged).await?)
    } else {
        None
    };

    log::separator();
    stats.log();

    Ok(RunReport {
        started_at,
        finished_at: Utc::now(),
        outcomes,
        merged,
        stats,
        files,
        report,
    })
}
