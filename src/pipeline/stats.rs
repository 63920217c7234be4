// src/pipeline/stats.rs

//! Run statistics.

use std::collections::BTreeMap;

use crate::models::{CompanyRecord, SegmentTag, SourceKind};
use crate::sources::SourceOutcome;
use crate::utils::log::grouped;

const TOP_COUNT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Accepted records per source, in run order
    pub per_source: Vec<(SourceKind, usize)>,
    pub failures: usize,
    pub merged: usize,
    pub segments: BTreeMap<SegmentTag, usize>,
    pub revenue_min: Option<u64>,
    pub revenue_max: Option<u64>,
    pub revenue_mean: Option<u64>,
    /// Largest companies by revenue, descending
    pub top: Vec<(String, u64)>,
    /// Ratings records that carry a position
    pub rated: usize,
    pub best_position: Option<u32>,
    pub mean_position: Option<f64>,
    /// Ratings records per listing category
    pub categories: BTreeMap<String, usize>,
}

impl RunStats {
    pub fn compute(outcomes: &[SourceOutcome], merged: &[CompanyRecord]) -> Self {
        let mut segments = BTreeMap::new();
        for tag in merged.iter().flat_map(|r| r.segment_tags.iter()) {
            *segments.entry(tag).or_insert(0) += 1;
        }

        let revenues: Vec<u64> = merged.iter().filter_map(|r| r.revenue).collect();
        let revenue_mean = (!revenues.is_empty()).then(|| {
            let total: u128 = revenues.iter().map(|&v| u128::from(v)).sum();
            (total / revenues.len() as u128) as u64
        });

        let mut ranked: Vec<(String, u64)> = merged
            .iter()
            .filter_map(|r| r.revenue.map(|v| (r.name.clone(), v)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(TOP_COUNT);

        let ratings = merged.iter().filter(|r| r.source.is_ratings());
        let positions: Vec<u32> = ratings.clone().filter_map(|r| r.rating_position).collect();
        let mean_position = (!positions.is_empty()).then(|| {
            positions.iter().map(|&p| f64::from(p)).sum::<f64>() / positions.len() as f64
        });
        let mut categories = BTreeMap::new();
        for category in ratings.filter_map(|r| r.category.as_deref()) {
            *categories.entry(category.to_string()).or_insert(0) += 1;
        }

        Self {
            per_source: outcomes
                .iter()
                .map(|o| (o.source, o.records.len()))
                .collect(),
            failures: outcomes.iter().map(|o| o.failures).sum(),
            merged: merged.len(),
            segments,
            revenue_min: revenues.iter().copied().min(),
            revenue_max: revenues.iter().copied().max(),
            revenue_mean,
            top: ranked,
            rated: positions.len(),
            best_position: positions.iter().copied().min(),
            mean_position,
            categories,
        }
    }

    /// Log the statistics as summary blocks.
    pub fn log(&self) {
        let money = |v: Option<u64>| v.map(grouped).unwrap_or_else(|| "-".into());

        let mut totals: Vec<(&str, String)> = self
            .per_source
            .iter()
            .map(|(source, count)| (source.as_str(), count.to_string()))
            .collect();
        totals.push(("failed pages", self.failures.to_string()));
        totals.push(("merged", self.merged.to_string()));
        crate::utils::log::summary("Records", &totals);

        let segments: Vec<(&str, String)> = self
            .segments
            .iter()
            .map(|(tag, count)| (tag.as_str(), count.to_string()))
            .collect();
        crate::utils::log::summary("Segments", &segments);

        crate::utils::log::summary(
            "Revenue, руб.",
            &[
                ("min", money(self.revenue_min)),
                ("max", money(self.revenue_max)),
                ("mean", money(self.revenue_mean)),
            ],
        );

        let top: Vec<(&str, String)> = self
            .top
            .iter()
            .map(|(name, revenue)| (name.as_str(), grouped(*revenue)))
            .collect();
        crate::utils::log::summary("Top by revenue", &top);

        if self.rated > 0 {
            crate::utils::log::summary(
                "Rating positions",
                &[
                    ("rated", self.rated.to_string()),
                    (
                        "best",
                        self.best_position
                            .map_or_else(|| "-".into(), |p| format!("#{p}")),
                    ),
                    ("mean", position(self.mean_position)),
                ],
            );
        }

        if !self.categories.is_empty() {
            let mut by_count: Vec<(&str, usize)> = self
                .categories
                .iter()
                .map(|(name, count)| (name.as_str(), *count))
                .collect();
            by_count.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            let categories: Vec<(&str, String)> = by_count
                .into_iter()
                .map(|(name, count)| (name, count.to_string()))
                .collect();
            crate::utils::log::summary("Rating categories", &categories);
        }
    }
}

fn position(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("#{v:.1}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, revenue: Option<u64>, tag: SegmentTag) -> CompanyRecord {
        let mut record = CompanyRecord::new(name, SourceKind::ListOrg, 2023);
        record.revenue = revenue;
        record.segment_tags.insert(tag);
        record
    }

    #[test]
    fn test_compute() {
        let merged: Vec<CompanyRecord> = (1..=7)
            .map(|i| record(&format!("C{i}"), Some(i * 100_000_000), SegmentTag::Btl))
            .chain([record("Без выручки", None, SegmentTag::Souvenir)])
            .collect();
        let mut outcome = SourceOutcome::empty(SourceKind::ListOrg);
        outcome.records = merged.clone();
        outcome.failures = 2;

        let stats = RunStats::compute(&[outcome], &merged);
        assert_eq!(stats.per_source, vec![(SourceKind::ListOrg, 8)]);
        assert_eq!(stats.failures, 2);
        assert_eq!(stats.merged, 8);
        assert_eq!(stats.segments[&SegmentTag::Btl], 7);
        assert_eq!(stats.segments[&SegmentTag::Souvenir], 1);
        assert_eq!(stats.revenue_min, Some(100_000_000));
        assert_eq!(stats.revenue_max, Some(700_000_000));
        assert_eq!(stats.revenue_mean, Some(400_000_000));
        assert_eq!(stats.top.len(), 5);
        assert_eq!(stats.top[0], ("C7".to_string(), 700_000_000));
    }

    fn rated(name: &str, position: Option<u32>, category: &str) -> CompanyRecord {
        let mut record = CompanyRecord::new(name, SourceKind::Ruward, 2024);
        record.rating_position = position;
        record.category = Some(category.into());
        record
    }

    #[test]
    fn test_rating_figures() {
        let mut directory = record("Промо Групп", Some(300_000_000), SegmentTag::Btl);
        directory.rating_position = Some(1);
        directory.category = Some("BTL-агентства".into());
        let merged = vec![
            rated("Acme", Some(3), "Digital-агентства"),
            rated("Beta", Some(8), "Digital-агентства"),
            rated("Gamma", None, "PR-агентства"),
            directory,
        ];

        let stats = RunStats::compute(&[], &merged);
        assert_eq!(stats.rated, 2);
        assert_eq!(stats.best_position, Some(3));
        assert_eq!(stats.mean_position, Some(5.5));
        assert_eq!(stats.categories.len(), 2);
        assert_eq!(stats.categories["Digital-агентства"], 2);
        assert_eq!(stats.categories["PR-агентства"], 1);
        assert_eq!(position(stats.mean_position), "#5.5");
        stats.log();
    }

    #[test]
    fn test_compute_empty_run() {
        let stats = RunStats::compute(&[], &[]);
        assert_eq!(stats, RunStats::default());
    }
}
