// src/sources/bulk.rs

//! Bulk-dump source: one tax open-data set, downloaded whole.
//!
//! There is nothing to search: `collect` walks the decoded dump directly.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;

use crate::error::{AppError, Result};
use crate::models::{BulkConfig, CompanyRecord, Dataset, SourceKind};
use crate::services::extract::{FieldExtractor, clean_text};
use crate::services::{RuleSet, is_valid_tax_id};
use crate::sources::{Accumulator, SourceAdapter, SourceOutcome};
use crate::utils::decode::{self, Fields, first_of};
use crate::utils::http::Fetcher;

/// Element wrapping one record in the XML dumps.
const RECORD_TAG: &str = "Документ";

const TAX_ID_KEYS: &[&str] = &["inn", "ИНН", "ИННЮЛ", "V_INN", "innFl", "innUl"];
const NAME_KEYS: &[&str] = &["name", "НаимОрг", "V_NAIM_UL", "fullName", "shortName"];
const REVENUE_KEYS: &[&str] = &["revenue", "СумДоход", "income", "V_S_DOHOD", "s_dohod"];
const INDUSTRY_KEYS: &[&str] = &["okved", "ОКВЭД", "КодОКВЭД", "V_OKVED", "mainOkved"];
const ADDRESS_KEYS: &[&str] = &["address", "Адрес", "V_ADRES", "legalAddress"];

pub struct BulkAdapter {
    dataset: Dataset,
    revenue_year: i32,
    fetcher: Arc<dyn Fetcher>,
    rules: Arc<RuleSet>,
}

impl BulkAdapter {
    /// Adapter for the named dataset, or the configured default.
    pub fn new(
        config: &BulkConfig,
        dataset: Option<&str>,
        fetcher: Arc<dyn Fetcher>,
        rules: Arc<RuleSet>,
    ) -> Result<Self> {
        let name = dataset.unwrap_or(&config.default_dataset);
        let dataset = config
            .dataset(name)
            .cloned()
            .ok_or_else(|| AppError::config(format!("Unknown dataset '{name}'")))?;

        Ok(Self {
            dataset,
            // Income dumps describe the last closed fiscal year.
            revenue_year: chrono::Local::now().year() - 1,
            fetcher,
            rules,
        })
    }

    /// Map one dump record; `None` without a valid tax ID or a name.
    fn record_from_fields(&self, fields: &Fields) -> Option<CompanyRecord> {
        let tax_id = first_of(fields, TAX_ID_KEYS)
            .map(str::trim)
            .filter(|t| is_valid_tax_id(t))?;
        let name = first_of(fields, NAME_KEYS)
            .map(clean_text)
            .filter(|n| !n.is_empty())?;

        let mut record = CompanyRecord::new(name, SourceKind::FnsOpenData, self.revenue_year);
        record.tax_id = Some(tax_id.to_string());
        record.revenue = first_of(fields, REVENUE_KEYS).and_then(parse_amount);
        record.industry_code = first_of(fields, INDUSTRY_KEYS)
            .map(str::trim)
            .filter(|code| self.rules.extractor.is_industry_code(code))
            .map(String::from);

        if let Some(address) = first_of(fields, ADDRESS_KEYS) {
            record.region = FieldExtractor::region_from_address(address);
            record.address = Some(clean_text(address));
        }
        record.rating_ref = Some(format!("fns_inn_{tax_id}"));
        Some(record)
    }
}

/// Amount written with a decimal comma or point and optional spaces.
fn parse_amount(raw: &str) -> Option<u64> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let value: f64 = normalized.parse().ok()?;
    (value.is_finite() && value >= 0.0).then(|| value.round() as u64)
}

#[async_trait]
impl SourceAdapter for BulkAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::FnsOpenData
    }

    async fn collect(&self, _queries: &[String], max_count: usize) -> Result<SourceOutcome> {
        log::info!(
            "[{}] Downloading {} ({})",
            self.name(),
            self.dataset.name,
            self.dataset.url
        );
        let bytes = self.fetcher.fetch(&self.dataset.url).await?;
        log::info!("[{}] Downloaded {} bytes", self.name(), bytes.len());

        let hint = self.dataset.format;
        let rows = tokio::task::spawn_blocking(move || decode::records(bytes, RECORD_TAG, hint))
            .await
            .map_err(|e| AppError::source_failure(self.name(), e))??;
        log::info!("[{}] Decoded {} records", self.name(), rows.len());

        let mut acc = Accumulator::new(self.kind(), &self.rules, max_count);
        acc.located = rows.len();

        for fields in &rows {
            if acc.is_full() {
                log::info!("[{}] Reached {} records, stopping", self.name(), max_count);
                break;
            }
            match self.record_from_fields(fields) {
                Some(record) => {
                    acc.offer(record);
                }
                None => acc.incomplete += 1,
            }
        }

        Ok(acc.finish())
    }
}
