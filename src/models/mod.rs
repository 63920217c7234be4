// src/models/mod.rs

//! Domain models for the aggregator.
//!
//! Records and their labels, run configuration, and the shared rule table.

mod company;
mod config;
mod rules;

// Re-export all public types
pub use company::{CompanyRecord, Locator, SegmentSet, SegmentTag, SourceKind};
pub use config::{
    BulkConfig, CollectConfig, Config, Dataset, DatasetFormat, DelayRange, DirectorySite,
    ExportConfig, FetchConfig, FilterConfig, RatingCategory, RatingsConfig,
};
pub use rules::{CodeSegment, KeywordCluster, RULES_VERSION, RuleTable, Vocabulary};
