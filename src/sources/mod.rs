// src/sources/mod.rs

//! Source adapters.
//!
//! Every source answers one contract, `collect`, which yields a filtered,
//! classified and deduplicated batch. Page-by-page sources implement
//! [`PagedSource`] and delegate to [`collect_paged`]. Each `collect` call
//! owns its own [`Accumulator`], so adapters never share dedup state.

pub mod bulk;
pub mod directory;
pub mod ratings;

use std::collections::HashSet;

use async_trait::async_trait;

pub use bulk::BulkAdapter;
pub use directory::DirectoryAdapter;
pub use ratings::RatingsAdapter;

use crate::error::Result;
use crate::models::{CompanyRecord, Locator, SourceKind};
use crate::services::identity::dedup_key;
use crate::services::{RuleSet, Verdict};
use crate::utils::log::grouped;

/// One data source, driven end to end.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn kind(&self) -> SourceKind;

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Produce up to `max_count` filtered, classified and deduplicated
    /// records. `queries` are search phrases for sources that search.
    async fn collect(&self, queries: &[String], max_count: usize) -> Result<SourceOutcome>;
}

/// A source read one candidate page at a time.
#[async_trait]
pub trait PagedSource: SourceAdapter {
    fn rules(&self) -> &RuleSet;

    /// Candidate locators for the given search phrases. May be empty.
    async fn locate(&self, queries: &[String]) -> Result<Vec<Locator>>;

    /// Fetch one candidate and build its record.
    ///
    /// `Ok(None)` means the page was read but lacks a name or identity.
    async fn assemble(&self, locator: &Locator) -> Result<Option<CompanyRecord>>;

    /// Wait between two candidate fetches.
    async fn pause(&self) {}
}

/// Locate, assemble, filter, classify and dedup until `max_count` records
/// are accepted or candidates run out.
pub async fn collect_paged<S>(
    source: &S,
    queries: &[String],
    max_count: usize,
) -> Result<SourceOutcome>
where
    S: PagedSource + ?Sized,
{
    let locators = source.locate(queries).await?;
    if locators.is_empty() {
        log::warn!("[{}] No candidates found", source.name());
        return Ok(SourceOutcome::empty(source.kind()));
    }
    log::info!("[{}] {} candidates located", source.name(), locators.len());

    let mut acc = Accumulator::new(source.kind(), source.rules(), max_count);
    acc.located = locators.len();

    for (i, locator) in locators.iter().enumerate() {
        if acc.is_full() {
            log::info!("[{}] Reached {} records, stopping", source.name(), max_count);
            break;
        }
        if i > 0 {
            source.pause().await;
        }

        match source.assemble(locator).await {
            Ok(Some(record)) => {
                acc.offer(record);
            }
            Ok(None) => {
                acc.incomplete += 1;
                log::debug!("[{}] Incomplete page {}", source.name(), locator.href);
            }
            Err(e) => {
                acc.failures += 1;
                log::warn!("[{}] Failed {}: {}", source.name(), locator.href, e);
            }
        }
    }

    Ok(acc.finish())
}

/// Result of one adapter run.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub source: SourceKind,
    pub records: Vec<CompanyRecord>,
    pub located: usize,
    pub incomplete: usize,
    pub failures: usize,
    pub rejected: usize,
    pub duplicates: usize,
}

impl SourceOutcome {
    pub fn empty(source: SourceKind) -> Self {
        Self {
            source,
            records: Vec::new(),
            located: 0,
            incomplete: 0,
            failures: 0,
            rejected: 0,
            duplicates: 0,
        }
    }
}

/// Per-run gatekeeper: applies the relevance filter, attaches segment labels
/// and drops repeats of an already accepted identity (first one wins).
pub struct Accumulator<'a> {
    source: SourceKind,
    rules: &'a RuleSet,
    max_count: usize,
    seen: HashSet<String>,
    records: Vec<CompanyRecord>,
    pub located: usize,
    pub incomplete: usize,
    pub failures: usize,
    pub rejected: usize,
    pub duplicates: usize,
}

impl<'a> Accumulator<'a> {
    pub fn new(source: SourceKind, rules: &'a RuleSet, max_count: usize) -> Self {
        Self {
            source,
            rules,
            max_count,
            seen: HashSet::new(),
            records: Vec::new(),
            located: 0,
            incomplete: 0,
            failures: 0,
            rejected: 0,
            duplicates: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.max_count
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if the record was kept.
    pub fn offer(&mut self, mut record: CompanyRecord) -> bool {
        if self.is_full() {
            return false;
        }

        if let Verdict::Reject(reason) = self.rules.filter.evaluate(&record) {
            self.rejected += 1;
            log::debug!("[{}] Rejected {}: {}", self.source, record.name, reason);
            return false;
        }

        let labels = self.rules.classifier.classify(&record);
        record.segment_tags.extend(&labels);
        record.segment_tags = std::mem::take(&mut record.segment_tags).finalize();

        if !self.seen.insert(dedup_key(&record)) {
            self.duplicates += 1;
            log::debug!("[{}] Duplicate {}", self.source, record.name);
            return false;
        }

        log::info!(
            "[{}] + {} ({} руб., {})",
            self.source,
            record.name,
            record.revenue.map(grouped).unwrap_or_else(|| "-".into()),
            record.segment_tags.to_pipe_string()
        );
        self.records.push(record);
        true
    }

    pub fn finish(self) -> SourceOutcome {
        log::info!(
            "[{}] Accepted {} (rejected {}, duplicates {}, failed {})",
            self.source,
            self.records.len(),
            self.rejected,
            self.duplicates,
            self.failures
        );
        SourceOutcome {
            source: self.source,
            records: self.records,
            located: self.located,
            incomplete: self.incomplete,
            failures: self.failures,
            rejected: self.rejected,
            duplicates: self.duplicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{Config, SegmentTag};

    fn rules() -> Arc<RuleSet> {
        RuleSet::from_config(&Config::default()).unwrap()
    }

    fn record(name: &str, tax_id: &str, revenue: u64) -> CompanyRecord {
        let mut record = CompanyRecord::new(name, SourceKind::ListOrg, 2023);
        record.tax_id = Some(tax_id.into());
        record.revenue = Some(revenue);
        record
    }

    #[test]
    fn test_offer_filters_classifies_and_dedups() {
        let rules = rules();
        let mut acc = Accumulator::new(SourceKind::ListOrg, &rules, 10);

        assert!(acc.offer(record("Промо Групп", "7701234567", 300_000_000)));
        assert!(!acc.offer(record("Промо Групп 2", "7701234567", 900_000_000)));
        assert!(!acc.offer(record("Сувенир Плюс", "7709876543", 150_000_000)));
        assert!(!acc.offer(record("Стальпром", "7705555555", 500_000_000)));

        let outcome = acc.finish();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(outcome.rejected, 2);

        let kept = &outcome.records[0];
        assert_eq!(kept.name, "Промо Групп");
        assert!(kept.segment_tags.contains(SegmentTag::Btl));
    }

    #[test]
    fn test_offer_respects_max_count() {
        let rules = rules();
        let mut acc = Accumulator::new(SourceKind::ListOrg, &rules, 1);
        assert!(acc.offer(record("Промо Групп", "7701234567", 300_000_000)));
        assert!(acc.is_full());
        assert!(!acc.offer(record("Промо Лайн", "7709876543", 300_000_000)));
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_source_labels_survive_classification() {
        let rules = rules();
        let mut acc = Accumulator::new(SourceKind::Ruward, &rules, 10);
        let mut rec = CompanyRecord::new("Акме", SourceKind::Ruward, 2024);
        rec.site = Some("https://acme.ru".into());
        rec.revenue = Some(150_000_000);
        rec.category = Some("Digital-агентства".into());
        rec.segment_tags.insert(SegmentTag::DigitalAgency);
        assert!(acc.offer(rec));

        let outcome = acc.finish();
        let tags = &outcome.records[0].segment_tags;
        assert!(tags.contains(SegmentTag::DigitalAgency));
        assert!(!tags.contains(SegmentTag::Other));
    }
}
