// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{RuleTable, SegmentTag, SourceKind};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch and retry behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Revenue floors and sanity bounds
    #[serde(default)]
    pub filter: FilterConfig,

    /// Output files
    #[serde(default)]
    pub export: ExportConfig,

    /// Which sources run, with what queries
    #[serde(default)]
    pub collect: CollectConfig,

    /// Directory-style sites
    #[serde(default = "defaults::directories")]
    pub directories: Vec<DirectorySite>,

    /// Tax open-data dumps
    #[serde(default)]
    pub bulk: BulkConfig,

    /// Agency ratings site
    #[serde(default)]
    pub ratings: RatingsConfig,

    /// Shared keyword and code rules
    #[serde(default)]
    pub rules: RuleTable,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.fetch.validate()?;

        if self.filter.revenue_min >= self.filter.revenue_max {
            return Err(AppError::validation(
                "filter.revenue_min must be below filter.revenue_max",
            ));
        }
        if self.export.merged_file.trim().is_empty() {
            return Err(AppError::validation("export.merged_file is empty"));
        }
        if self.collect.max_per_source == 0 {
            return Err(AppError::validation("collect.max_per_source must be > 0"));
        }
        if self.collect.sources.is_empty() {
            return Err(AppError::validation("collect.sources is empty"));
        }

        for site in &self.directories {
            site.validate()?;
        }
        for kind in &self.collect.sources {
            let configured = match kind {
                SourceKind::ListOrg | SourceKind::Rusprofile => self.directory(*kind).is_some(),
                SourceKind::FnsOpenData => !self.bulk.datasets.is_empty(),
                SourceKind::Ruward => !self.ratings.categories.is_empty(),
            };
            if !configured {
                return Err(AppError::validation(format!(
                    "Source '{kind}' is selected but not configured"
                )));
            }
        }

        self.bulk.validate()?;
        Url::parse(&self.ratings.base_url)?;
        self.rules.validate()
    }

    /// Directory site settings for a source, if configured.
    pub fn directory(&self, kind: SourceKind) -> Option<&DirectorySite> {
        self.directories.iter().find(|d| d.source == kind)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            filter: FilterConfig::default(),
            export: ExportConfig::default(),
            collect: CollectConfig::default(),
            directories: defaults::directories(),
            bulk: BulkConfig::default(),
            ratings: RatingsConfig::default(),
            rules: RuleTable::default(),
        }
    }
}

/// Inclusive millisecond range a random wait is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }
}

/// HTTP client and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent pool, one picked at random per request
    #[serde(default = "defaults::user_agents")]
    pub user_agents: Vec<String>,

    /// Read timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Attempts per request, including the first
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// The n-th retry after a retryable status waits n × this
    #[serde(default = "defaults::backoff_base")]
    pub backoff_base_ms: u64,

    /// Wait after a network-level error
    #[serde(default = "defaults::retry_jitter")]
    pub retry_jitter_ms: DelayRange,

    /// Politeness pause between successive requests to one source
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: DelayRange,

    /// Statuses worth retrying
    #[serde(default = "defaults::retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agents: defaults::user_agents(),
            timeout_secs: defaults::timeout(),
            connect_timeout_secs: defaults::connect_timeout(),
            max_attempts: defaults::max_attempts(),
            backoff_base_ms: defaults::backoff_base(),
            retry_jitter_ms: defaults::retry_jitter(),
            request_delay_ms: defaults::request_delay(),
            retry_statuses: defaults::retry_statuses(),
        }
    }
}

impl FetchConfig {
    fn validate(&self) -> Result<()> {
        if self.user_agents.iter().all(|ua| ua.trim().is_empty()) {
            return Err(AppError::validation("fetch.user_agents is empty"));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(AppError::validation("fetch timeouts must be > 0"));
        }
        if self.max_attempts == 0 {
            return Err(AppError::validation("fetch.max_attempts must be > 0"));
        }
        for (name, range) in [
            ("fetch.retry_jitter_ms", self.retry_jitter_ms),
            ("fetch.request_delay_ms", self.request_delay_ms),
        ] {
            if range.min_ms > range.max_ms {
                return Err(AppError::validation(format!("{name}: min_ms > max_ms")));
            }
        }
        Ok(())
    }
}

/// Revenue floors per source family and extractor bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "defaults::directory_floor")]
    pub directory_floor: u64,

    #[serde(default = "defaults::bulk_floor")]
    pub bulk_floor: u64,

    #[serde(default = "defaults::ratings_floor")]
    pub ratings_floor: u64,

    /// Smallest revenue figure the extractor believes
    #[serde(default = "defaults::revenue_min")]
    pub revenue_min: u64,

    /// Largest revenue figure the extractor believes
    #[serde(default = "defaults::revenue_max")]
    pub revenue_max: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            directory_floor: defaults::directory_floor(),
            bulk_floor: defaults::bulk_floor(),
            ratings_floor: defaults::ratings_floor(),
            revenue_min: defaults::revenue_min(),
            revenue_max: defaults::revenue_max(),
        }
    }
}

impl FilterConfig {
    /// Revenue floor applied to records from `kind`.
    pub fn floor_for(&self, kind: SourceKind) -> u64 {
        match kind {
            SourceKind::ListOrg | SourceKind::Rusprofile => self.directory_floor,
            SourceKind::FnsOpenData => self.bulk_floor,
            SourceKind::Ruward => self.ratings_floor,
        }
    }
}

/// Export destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "defaults::merged_file")]
    pub merged_file: String,

    /// Also write `<source>_companies.csv` per source
    #[serde(default = "defaults::per_source")]
    pub per_source: bool,

    /// Also write a plain-text per-company report
    #[serde(default = "defaults::report")]
    pub report: bool,

    #[serde(default = "defaults::report_file")]
    pub report_file: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            merged_file: defaults::merged_file(),
            per_source: defaults::per_source(),
            report: defaults::report(),
            report_file: defaults::report_file(),
        }
    }
}

/// Run selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    /// Search phrases for directory sources
    #[serde(default = "defaults::queries")]
    pub queries: Vec<String>,

    #[serde(default = "defaults::max_per_source")]
    pub max_per_source: usize,

    /// Sources to run, in merge order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceKind>,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            queries: defaults::queries(),
            max_per_source: defaults::max_per_source(),
            sources: defaults::sources(),
        }
    }
}

/// A search-driven business directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySite {
    pub source: SourceKind,
    pub base_url: String,
    /// Search path template with `{query}` and `{page}` placeholders
    pub search_path: String,
    /// Company page links start with this path
    pub link_prefix: String,
    /// CSS selector of the company name on a company page
    #[serde(default = "defaults::name_selector")]
    pub name_selector: String,
    /// Result pages fetched per query
    #[serde(default = "defaults::search_pages")]
    pub pages: u32,
    /// Fiscal year directory revenue figures refer to
    #[serde(default = "defaults::directory_revenue_year")]
    pub revenue_year: i32,
    /// Regex with one group capturing a tax ID from the locator
    #[serde(default)]
    pub locator_id_pattern: Option<String>,
    /// Shuffle locators before fetching
    #[serde(default)]
    pub shuffle: bool,
}

impl DirectorySite {
    fn validate(&self) -> Result<()> {
        if !matches!(self.source, SourceKind::ListOrg | SourceKind::Rusprofile) {
            return Err(AppError::validation(format!(
                "'{}' is not a directory source",
                self.source
            )));
        }
        Url::parse(&self.base_url)?;
        if !self.search_path.contains("{query}") {
            return Err(AppError::validation(format!(
                "directories.{}.search_path lacks {{query}}",
                self.source
            )));
        }
        if self.link_prefix.is_empty() {
            return Err(AppError::validation(format!(
                "directories.{}.link_prefix is empty",
                self.source
            )));
        }
        if let Some(pattern) = &self.locator_id_pattern {
            regex::Regex::new(pattern)?;
        }
        Ok(())
    }

    /// Search URL for one query and page. The query is form-encoded.
    pub fn search_url(&self, query: &str, page: u32) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let path = self
            .search_path
            .replace("{query}", &encoded)
            .replace("{page}", &page.to_string());
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Structured dump format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Xml,
    Json,
}

/// One downloadable open-data set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    /// Published format; sniffed from the payload when absent
    #[serde(default)]
    pub format: Option<DatasetFormat>,
}

/// Tax open-data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    #[serde(default = "defaults::datasets")]
    pub datasets: Vec<Dataset>,

    /// Name of the dataset collected when none is given
    #[serde(default = "defaults::default_dataset")]
    pub default_dataset: String,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            datasets: defaults::datasets(),
            default_dataset: defaults::default_dataset(),
        }
    }
}

impl BulkConfig {
    fn validate(&self) -> Result<()> {
        if !self.datasets.is_empty() && self.dataset(&self.default_dataset).is_none() {
            return Err(AppError::validation(format!(
                "bulk.default_dataset '{}' is not in bulk.datasets",
                self.default_dataset
            )));
        }
        Ok(())
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }
}

/// A ratings listing category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingCategory {
    pub slug: String,
    pub name: String,
    pub label: SegmentTag,
}

/// Agency ratings site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingsConfig {
    #[serde(default = "defaults::ratings_base_url")]
    pub base_url: String,

    /// Listing pages read per category
    #[serde(default = "defaults::ratings_pages")]
    pub pages: u32,

    #[serde(default = "defaults::rating_categories")]
    pub categories: Vec<RatingCategory>,
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::ratings_base_url(),
            pages: defaults::ratings_pages(),
            categories: defaults::rating_categories(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::{Dataset, DatasetFormat, DelayRange, DirectorySite, RatingCategory};
    use crate::models::{SegmentTag, SourceKind};

    // Fetch defaults
    pub fn user_agents() -> Vec<String> {
        vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".into(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".into(),
            "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0".into(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0".into(),
        ]
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn connect_timeout() -> u64 {
        10
    }
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn backoff_base() -> u64 {
        10_000
    }
    pub fn retry_jitter() -> DelayRange {
        DelayRange::new(2_000, 5_000)
    }
    pub fn request_delay() -> DelayRange {
        DelayRange::new(2_000, 4_000)
    }
    pub fn retry_statuses() -> Vec<u16> {
        vec![429, 403, 500, 502, 503, 504]
    }

    // Filter defaults
    pub fn directory_floor() -> u64 {
        200_000_000
    }
    pub fn bulk_floor() -> u64 {
        200_000_000
    }
    pub fn ratings_floor() -> u64 {
        100_000_000
    }
    pub fn revenue_min() -> u64 {
        1_000_000
    }
    pub fn revenue_max() -> u64 {
        1_000_000_000_000
    }

    // Export defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from("data")
    }
    pub fn merged_file() -> String {
        "companies.csv".into()
    }
    pub fn per_source() -> bool {
        true
    }
    pub fn report() -> bool {
        true
    }
    pub fn report_file() -> String {
        "detailed_report.txt".into()
    }

    // Collect defaults
    pub fn queries() -> Vec<String> {
        [
            "BTL агентство",
            "ивент агентство",
            "сувенирная продукция",
            "рекламное агентство полный цикл",
            "коммуникационная группа",
            "мерчандайзинг",
            "промо акции",
            "бренд активация",
            "маркетинговые услуги",
            "организация мероприятий",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn max_per_source() -> usize {
        30
    }
    pub fn sources() -> Vec<SourceKind> {
        SourceKind::ALL.to_vec()
    }

    // Directory defaults
    pub fn name_selector() -> String {
        "h1".into()
    }
    pub fn search_pages() -> u32 {
        2
    }
    pub fn directory_revenue_year() -> i32 {
        2023
    }
    pub fn directories() -> Vec<DirectorySite> {
        vec![
            DirectorySite {
                source: SourceKind::ListOrg,
                base_url: "https://www.list-org.com".into(),
                search_path: "/search?type=all&val={query}&page={page}".into(),
                link_prefix: "/company/".into(),
                name_selector: name_selector(),
                pages: search_pages(),
                revenue_year: directory_revenue_year(),
                locator_id_pattern: None,
                shuffle: false,
            },
            DirectorySite {
                source: SourceKind::Rusprofile,
                base_url: "https://www.rusprofile.ru".into(),
                search_path: "/search?query={query}&page={page}".into(),
                link_prefix: "/id/".into(),
                name_selector: name_selector(),
                pages: search_pages(),
                revenue_year: directory_revenue_year(),
                locator_id_pattern: Some(r"/id/(\d{10})".into()),
                shuffle: true,
            },
        ]
    }

    // Bulk defaults
    pub fn datasets() -> Vec<Dataset> {
        let dataset = |name: &str, slug: &str, description: &str, format| Dataset {
            name: name.into(),
            url: format!("https://data.nalog.ru/opendata/7707329152-{slug}"),
            description: description.into(),
            format,
        };
        vec![
            dataset(
                "egrul",
                "egrul",
                "ЕГРЮЛ - основные сведения",
                Some(DatasetFormat::Xml),
            ),
            dataset(
                "inn",
                "inn",
                "Соответствие ИНН и наименований организаций",
                Some(DatasetFormat::Json),
            ),
            dataset(
                "dohod",
                "dohod",
                "Данные о доходах (выручке) организаций",
                Some(DatasetFormat::Xml),
            ),
            dataset(
                "msp",
                "msp",
                "Реестр субъектов малого и среднего предпринимательства",
                Some(DatasetFormat::Json),
            ),
        ]
    }
    pub fn default_dataset() -> String {
        "dohod".into()
    }

    // Ratings defaults
    pub fn ratings_base_url() -> String {
        "https://www.ruward.ru".into()
    }
    pub fn ratings_pages() -> u32 {
        3
    }
    pub fn rating_categories() -> Vec<RatingCategory> {
        [
            ("digital", "Digital-агентства", SegmentTag::DigitalAgency),
            ("pr", "PR-агентства", SegmentTag::PrAgency),
            ("btl", "BTL-агентства", SegmentTag::BtlAgency),
            ("media", "Медиа-агентства", SegmentTag::MediaAgency),
            ("event", "Event-агентства", SegmentTag::EventAgency),
            ("creative", "Креативные агентства", SegmentTag::CreativeAgency),
        ]
        .into_iter()
        .map(|(slug, name, label)| RatingCategory {
            slug: slug.into(),
            name: name.into(),
            label,
        })
        .collect()
    }
}
