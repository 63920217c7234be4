// src/pipeline/merge.rs

//! Cross-source merge and export.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::models::{CompanyRecord, ExportConfig, SourceKind};
use crate::services::identity::dedup_key;
use crate::storage::{ExportMetadata, RecordStorage};
use crate::utils::log::grouped;

/// Merges per-source batches and writes the resulting tables.
pub struct Aggregator<'a> {
    storage: &'a dyn RecordStorage,
    export: &'a ExportConfig,
}

impl<'a> Aggregator<'a> {
    pub fn new(storage: &'a dyn RecordStorage, export: &'a ExportConfig) -> Self {
        Self { storage, export }
    }

    /// Concatenate batches in the given order, keeping the first record seen
    /// for every identity.
    pub fn merge<'r, I>(batches: I) -> Vec<CompanyRecord>
    where
        I: IntoIterator<Item = (SourceKind, &'r [CompanyRecord])>,
    {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut dropped = 0usize;

        for (source, records) in batches {
            let before = merged.len();
            for record in records {
                if seen.insert(dedup_key(record)) {
                    merged.push(record.clone());
                } else {
                    dropped += 1;
                }
            }
            log::debug!("[{source}] {} new after merge", merged.len() - before);
        }

        log::info!("Merged {} records ({} cross-source duplicates)", merged.len(), dropped);
        merged
    }

    /// Write the merged table.
    pub async fn save(&self, records: &[CompanyRecord]) -> Result<ExportMetadata> {
        self.storage
            .write_records(&self.export.merged_file, records)
            .await
    }

    /// Write one table per source that produced records.
    pub async fn save_per_source<'r, I>(&self, batches: I) -> Result<Vec<ExportMetadata>>
    where
        I: IntoIterator<Item = (SourceKind, &'r [CompanyRecord])>,
    {
        let mut written = Vec::new();
        for (source, records) in batches {
            if records.is_empty() {
                continue;
            }
            let name = format!("{source}_companies.csv");
            written.push(self.storage.write_records(&name, records).await?);
        }
        Ok(written)
    }

    /// Write the per-company text report.
    pub async fn save_report(
        &self,
        per_source: &[(SourceKind, usize)],
        merged: &[CompanyRecord],
    ) -> Result<PathBuf> {
        let text = render_report(per_source, merged, Local::now());
        self.storage.write_text(&self.export.report_file, &text).await
    }
}

/// Plain-text report: run totals, then one block per merged company.
pub fn render_report(
    per_source: &[(SourceKind, usize)],
    merged: &[CompanyRecord],
    generated_at: DateTime<Local>,
) -> String {
    let rule = "=".repeat(60);
    let mut lines = vec![
        rule.clone(),
        "DETAILED AGGREGATION REPORT".to_string(),
        rule.clone(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        format!("Unique companies: {}", merged.len()),
        String::new(),
        "Collected per source:".to_string(),
    ];
    lines.extend(
        per_source
            .iter()
            .map(|(source, count)| format!("  {source}: {count}")),
    );
    let total: usize = per_source.iter().map(|(_, count)| count).sum();
    lines.push(format!("Total collected: {total}"));

    lines.extend([String::new(), rule.clone(), "COMPANIES".to_string(), rule]);
    for (i, record) in merged.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("{}. {}", i + 1, record.name));
        lines.push(format!("   Source: {}", record.source));
        if let Some(revenue) = record.revenue {
            lines.push(format!(
                "   Revenue: {} руб. ({})",
                grouped(revenue),
                record.revenue_year
            ));
        }
        if !record.segment_tags.is_empty() {
            lines.push(format!("   Segments: {}", record.segment_tags.to_pipe_string()));
        }
        if let Some(category) = &record.category {
            lines.push(format!("   Category: {category}"));
        }
        if let Some(position) = record.rating_position {
            lines.push(format!("   Rating position: #{position}"));
        }
        if let Some(site) = &record.site {
            lines.push(format!("   Site: {site}"));
        }
        if let Some(employees) = record.employees {
            lines.push(format!("   Employees: {employees}"));
        }
    }

    lines.join("\n")
}
