// src/services/classify.rs

//! Segment classifier.

use crate::error::Result;
use crate::models::{CompanyRecord, RuleTable, SegmentSet, SegmentTag, Vocabulary};

/// Assigns segment labels from keyword clusters and industry code prefixes.
pub struct SegmentClassifier {
    clusters: Vec<(SegmentTag, Vocabulary)>,
    code_segments: Vec<(String, SegmentTag)>,
    fallback: Vocabulary,
}

impl SegmentClassifier {
    pub fn new(rules: &RuleTable) -> Result<Self> {
        let clusters = rules
            .clusters
            .iter()
            .map(|c| Ok((c.label, Vocabulary::compile(&c.keywords)?)))
            .collect::<Result<Vec<_>>>()?;
        let code_segments = rules
            .code_segments
            .iter()
            .map(|c| (c.prefix.clone(), c.label))
            .collect();

        Ok(Self {
            clusters,
            code_segments,
            fallback: Vocabulary::compile(&rules.fallback_terms)?,
        })
    }

    /// Labels for a record; never empty.
    pub fn classify(&self, record: &CompanyRecord) -> SegmentSet {
        self.classify_parts(
            &record.name,
            record.description.as_deref(),
            record.industry_code.as_deref(),
        )
    }

    /// Same as [`classify`](Self::classify) for loose fields.
    pub fn classify_parts(
        &self,
        name: &str,
        description: Option<&str>,
        industry_code: Option<&str>,
    ) -> SegmentSet {
        let mut text = name.to_lowercase();
        if let Some(description) = description {
            text.push(' ');
            text.push_str(&description.to_lowercase());
        }

        let mut tags: SegmentSet = self
            .clusters
            .iter()
            .filter(|(_, vocabulary)| vocabulary.matches(&text))
            .map(|(tag, _)| *tag)
            .collect();

        if let Some(code) = industry_code.map(str::trim) {
            for (prefix, tag) in &self.code_segments {
                if code.starts_with(prefix.as_str()) {
                    tags.insert(*tag);
                }
            }
        }

        if tags.is_empty() && self.fallback.matches(&text) {
            tags.insert(SegmentTag::CommGroup);
        }
        tags.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    fn classifier() -> SegmentClassifier {
        SegmentClassifier::new(&RuleTable::default()).unwrap()
    }

    #[test]
    fn test_code_prefix_only() {
        let mut record = CompanyRecord::new("ООО Ромашка", SourceKind::ListOrg, 2023);
        record.industry_code = Some("73.11".into());
        let tags = classifier().classify(&record);
        assert_eq!(tags.to_pipe_string(), "BTL");
    }

    #[test]
    fn test_multiple_clusters_union() {
        let tags = classifier().classify_parts(
            "Сувенир Про",
            Some("BTL-агентство полного цикла"),
            None,
        );
        assert!(tags.contains(SegmentTag::Btl));
        assert!(tags.contains(SegmentTag::Souvenir));
        assert!(tags.contains(SegmentTag::FullCycle));
        assert!(tags.contains(SegmentTag::CommGroup));
        assert!(!tags.contains(SegmentTag::Other));
    }

    #[test]
    fn test_fallback_and_other() {
        let c = classifier();
        assert_eq!(
            c.classify_parts("Реклама на транспорте", None, None)
                .to_pipe_string(),
            "COMM_GROUP"
        );
        assert_eq!(
            c.classify_parts("ООО Вектор", Some("Грузоперевозки"), Some("49.41"))
                .to_pipe_string(),
            "OTHER"
        );
    }

    #[test]
    fn test_deterministic_and_never_empty() {
        let c = classifier();
        let inputs = [
            ("", None, None),
            ("Acme", Some("x"), Some("")),
            ("Типография Печать", None, Some("18.12")),
            ("PR агентство", Some("public relations"), Some("73.12.1")),
        ];
        for (name, description, code) in inputs {
            let first = c.classify_parts(name, description, code);
            let second = c.classify_parts(name, description, code);
            assert_eq!(first, second);
            assert!(!first.is_empty());
        }
    }
}
