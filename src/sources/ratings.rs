// src/sources/ratings.rs

//! Ratings-style source: category listings rank agencies, each linking to a
//! profile page.
//!
//! Ratings profiles rarely print a tax ID, so a name + website pair is enough
//! identity here. Only labelled tax IDs are taken from the page: a bare
//! ten-digit number on a profile is more often a phone than an ID.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use regex::Regex;
use url::Url;

use crate::error::Result;
use crate::models::{CompanyRecord, Locator, RatingCategory, RatingsConfig, SourceKind};
use crate::services::RuleSet;
use crate::services::extract::clean_text;
use crate::sources::{PagedSource, SourceAdapter, SourceOutcome, collect_paged};
use crate::utils::html::HtmlPage;
use crate::utils::http::Fetcher;

const PROFILE_FRAGMENT: &str = "/company/";

pub struct RatingsAdapter {
    config: RatingsConfig,
    base: Url,
    host: String,
    position: Regex,
    revenue_year: i32,
    fetcher: Arc<dyn Fetcher>,
    rules: Arc<RuleSet>,
}

impl RatingsAdapter {
    pub fn new(config: RatingsConfig, fetcher: Arc<dyn Fetcher>, rules: Arc<RuleSet>) -> Result<Self> {
        let base = Url::parse(&config.base_url)?;
        let host = base
            .host_str()
            .map(|h| h.trim_start_matches("www.").to_string())
            .unwrap_or_default();

        Ok(Self {
            config,
            base,
            host,
            position: Regex::new(r"(?i)(\d+)\s*(?:место|позиция)")?,
            revenue_year: chrono::Local::now().year(),
            fetcher,
            rules,
        })
    }

    /// Listing page of one category; page 1 has no query string.
    pub fn listing_url(&self, slug: &str, page: u32) -> String {
        let url = format!("{}/rating/{}/", self.config.base_url.trim_end_matches('/'), slug);
        if page > 1 {
            format!("{url}?page={page}")
        } else {
            url
        }
    }

    fn category(&self, slug: &str) -> Option<&RatingCategory> {
        self.config.categories.iter().find(|c| c.slug == slug)
    }

    /// Absolute profile URLs on a listing page, in ranking order.
    fn profile_links(&self, html: &str) -> Result<Vec<String>> {
        let page = HtmlPage::parse(html);
        Ok(page
            .links_containing(PROFILE_FRAGMENT)?
            .into_iter()
            .filter_map(|href| self.base.join(&href).ok())
            .map(|url| url.to_string())
            .collect())
    }

    fn parse_profile(&self, locator: &Locator, html: &str) -> Result<Option<CompanyRecord>> {
        let page = HtmlPage::parse(html);

        let Some(name) = page
            .first_text("h1")?
            .map(|n| clean_text(&n))
            .filter(|n| !n.is_empty())
        else {
            log::debug!("No name on {}", locator.href);
            return Ok(None);
        };

        let text = page.text();
        let text_lower = text.to_lowercase();
        let ex = &self.rules.extractor;

        let mut record = CompanyRecord::new(name, SourceKind::Ruward, self.revenue_year);
        record.tax_id = ex.labelled_tax_id(&text);
        record.site = ex.site(&page.external_links()?, &text, &self.host);

        if record.tax_id.is_none() && record.site.is_none() {
            log::debug!("No tax ID or site for {} on {}", record.name, locator.href);
            return Ok(None);
        }

        record.revenue = ex
            .scaled_revenue(&text)
            .or_else(|| ex.revenue(&text_lower));
        record.rating_position = self
            .position
            .captures(&text)
            .and_then(|caps| caps.get(1)?.as_str().parse().ok())
            .or(locator.position);
        record.industry_code = ex.industry_code(&text);
        record.region = ex.region(&page.info_rows()?, &text);
        record.description = ex.description(&page, &text, &record.name);
        record.contacts = ex.contacts(&text);
        record.employees = ex.employees(&text_lower);
        record.rating_ref = Url::parse(&locator.href)
            .map(|u| u.path().to_string())
            .ok();

        if let Some(slug) = locator.category.as_deref() {
            record.rating_category = Some(slug.to_string());
            if let Some(category) = self.category(slug) {
                record.category = Some(category.name.clone());
                record.segment_tags.insert(category.label);
            }
        }

        Ok(Some(record))
    }
}

#[async_trait]
impl SourceAdapter for RatingsAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Ruward
    }

    async fn collect(&self, queries: &[String], max_count: usize) -> Result<SourceOutcome> {
        collect_paged(self, queries, max_count).await
    }
}

#[async_trait]
impl PagedSource for RatingsAdapter {
    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Walks every configured category; search phrases are not used.
    async fn locate(&self, _queries: &[String]) -> Result<Vec<Locator>> {
        let mut seen = HashSet::new();
        let mut locators = Vec::new();
        let mut first_request = true;

        for category in &self.config.categories {
            log::info!("[{}] Reading rating '{}'", self.name(), category.name);
            let mut position = 0u32;

            for page in 1..=self.config.pages.max(1) {
                if !first_request {
                    self.fetcher.pause().await;
                }
                first_request = false;

                let url = self.listing_url(&category.slug, page);
                let html = match self.fetcher.fetch_text(&url).await {
                    Ok(html) => html,
                    Err(e) => {
                        log::warn!("[{}] Listing failed {}: {}", self.name(), url, e);
                        break;
                    }
                };

                let links = self.profile_links(&html)?;
                if links.is_empty() {
                    break;
                }
                for href in links {
                    if seen.insert(href.clone()) {
                        position += 1;
                        locators.push(Locator::in_category(href, &category.slug, position));
                    }
                }
            }
        }

        Ok(locators)
    }

    async fn assemble(&self, locator: &Locator) -> Result<Option<CompanyRecord>> {
        let html = self.fetcher.fetch_text(&locator.href).await?;
        self.parse_profile(locator, &html)
    }

    async fn pause(&self) {
        self.fetcher.pause().await;
    }
}
