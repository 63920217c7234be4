// src/pipeline/collect.rs

//! Per-source collection.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, SourceKind};
use crate::services::RuleSet;
use crate::sources::{BulkAdapter, DirectoryAdapter, RatingsAdapter, SourceAdapter, SourceOutcome};
use crate::utils::http::Fetcher;

/// Build the adapter for one source.
pub fn build_adapter(
    kind: SourceKind,
    config: &Config,
    fetcher: Arc<dyn Fetcher>,
    rules: Arc<RuleSet>,
) -> Result<Box<dyn SourceAdapter>> {
    let adapter: Box<dyn SourceAdapter> = match kind {
        SourceKind::ListOrg | SourceKind::Rusprofile => {
            let site = config.directory(kind).cloned().ok_or_else(|| {
                AppError::source_failure(kind.as_str(), "no [[directories]] entry")
            })?;
            Box::new(DirectoryAdapter::new(site, fetcher, rules)?)
        }
        SourceKind::FnsOpenData => Box::new(BulkAdapter::new(&config.bulk, None, fetcher, rules)?),
        SourceKind::Ruward => Box::new(RatingsAdapter::new(config.ratings.clone(), fetcher, rules)?),
    };
    Ok(adapter)
}

/// Run the selected sources one after another, in the given order.
///
/// A source that cannot be built or fails as a whole is logged and
/// contributes an empty outcome; the remaining sources still run.
pub async fn run_sources(
    config: &Config,
    sources: &[SourceKind],
    fetcher: Arc<dyn Fetcher>,
    rules: Arc<RuleSet>,
) -> Vec<SourceOutcome> {
    let queries = &config.collect.queries;
    let max_count = config.collect.max_per_source;
    let mut outcomes = Vec::with_capacity(sources.len());

    for &kind in sources {
        log::info!("[{kind}] Collecting up to {max_count} records");

        let result = match build_adapter(kind, config, Arc::clone(&fetcher), Arc::clone(&rules)) {
            Ok(adapter) => adapter.collect(queries, max_count).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                log::error!("[{kind}] Source failed: {e}");
                outcomes.push(SourceOutcome::empty(kind));
            }
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::testing::StaticFetcher;

    #[test]
    fn test_build_adapter_for_every_source() {
        let config = Config::default();
        let rules = RuleSet::from_config(&config).unwrap();
        let fetcher: Arc<dyn Fetcher> = Arc::new(StaticFetcher::new());

        for kind in SourceKind::ALL {
            let adapter = build_adapter(kind, &config, Arc::clone(&fetcher), Arc::clone(&rules))
                .unwrap();
            assert_eq!(adapter.kind(), kind);
        }
    }

    #[test]
    fn test_missing_directory_is_source_error() {
        let mut config = Config::default();
        config.directories.clear();
        let rules = RuleSet::from_config(&config).unwrap();
        let result = build_adapter(
            SourceKind::ListOrg,
            &config,
            Arc::new(StaticFetcher::new()),
            rules,
        );
        assert!(matches!(result, Err(AppError::Source { .. })));
    }

    #[tokio::test]
    async fn test_failed_source_yields_empty_outcome() {
        let mut config = Config::default();
        config.collect.queries = vec!["промо".into()];
        let rules = RuleSet::from_config(&config).unwrap();

        // Nothing is served: the dump download fails, the directory finds nothing.
        let outcomes = run_sources(
            &config,
            &[SourceKind::FnsOpenData, SourceKind::ListOrg],
            Arc::new(StaticFetcher::new()),
            rules,
        )
        .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].source, SourceKind::FnsOpenData);
        assert!(outcomes.iter().all(|o| o.records.is_empty()));
    }
}
