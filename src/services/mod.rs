// src/services/mod.rs

//! Rule services shared by every source.
//!
//! - Identity validation and dedup keys (`identity`)
//! - Field extraction from page text (`FieldExtractor`)
//! - Relevance filtering (`RelevanceFilter`)
//! - Segment classification (`SegmentClassifier`)

pub mod classify;
pub mod extract;
pub mod filter;
pub mod identity;

use std::sync::Arc;

pub use classify::SegmentClassifier;
pub use extract::FieldExtractor;
pub use filter::{RejectReason, RelevanceFilter, Verdict};
pub use identity::is_valid_tax_id;

use crate::error::Result;
use crate::models::Config;

/// Compiled rule services, built once per run and shared by the adapters.
pub struct RuleSet {
    pub extractor: FieldExtractor,
    pub filter: RelevanceFilter,
    pub classifier: SegmentClassifier,
}

impl RuleSet {
    pub fn from_config(config: &Config) -> Result<Arc<Self>> {
        log::debug!("Compiling rule table v{}", config.rules.version);
        Ok(Arc::new(Self {
            extractor: FieldExtractor::new(&config.rules, &config.filter)?,
            filter: RelevanceFilter::new(&config.rules, &config.filter)?,
            classifier: SegmentClassifier::new(&config.rules)?,
        }))
    }
}
