// src/sources/directory.rs

//! Directory-style source: search result pages link to one page per company.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use regex::Regex;
use url::Url;

use crate::error::Result;
use crate::models::{CompanyRecord, DirectorySite, Locator, SourceKind};
use crate::services::RuleSet;
use crate::services::extract::clean_text;
use crate::sources::{PagedSource, SourceAdapter, SourceOutcome, collect_paged};
use crate::utils::html::HtmlPage;
use crate::utils::http::Fetcher;

pub struct DirectoryAdapter {
    site: DirectorySite,
    base: Url,
    host: String,
    locator_id: Option<Regex>,
    fetcher: Arc<dyn Fetcher>,
    rules: Arc<RuleSet>,
}

impl DirectoryAdapter {
    pub fn new(site: DirectorySite, fetcher: Arc<dyn Fetcher>, rules: Arc<RuleSet>) -> Result<Self> {
        let base = Url::parse(&site.base_url)?;
        let host = base
            .host_str()
            .map(|h| h.trim_start_matches("www.").to_string())
            .unwrap_or_default();
        let locator_id = site
            .locator_id_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()?;

        Ok(Self {
            site,
            base,
            host,
            locator_id,
            fetcher,
            rules,
        })
    }

    /// Absolute company page URLs on a search result page.
    fn company_links(&self, html: &str) -> Result<Vec<String>> {
        let page = HtmlPage::parse(html);
        let links = page
            .links_containing(&self.site.link_prefix)?
            .into_iter()
            .filter_map(|href| self.base.join(&href).ok())
            .filter(|url| {
                url.host_str()
                    .is_some_and(|h| h.trim_start_matches("www.") == self.host)
                    && url.path().starts_with(&self.site.link_prefix)
            })
            .map(|url| url.to_string())
            .collect();
        Ok(links)
    }

    fn tax_id_from_locator(&self, href: &str) -> Option<String> {
        let pattern = self.locator_id.as_ref()?;
        let id = pattern.captures(href)?.get(1)?.as_str();
        crate::services::is_valid_tax_id(id).then(|| id.to_string())
    }

    /// Build a record from a company page; `None` without a name or tax ID.
    fn parse_company(&self, locator: &Locator, html: &str) -> Result<Option<CompanyRecord>> {
        let page = HtmlPage::parse(html);

        let Some(name) = page
            .first_text(&self.site.name_selector)?
            .map(|n| clean_text(&n))
            .filter(|n| !n.is_empty())
        else {
            log::debug!("No name on {}", locator.href);
            return Ok(None);
        };

        let text = page.text();
        let ex = &self.rules.extractor;

        let Some(tax_id) = self
            .tax_id_from_locator(&locator.href)
            .or_else(|| ex.tax_id(&text))
        else {
            log::debug!("No tax ID for {} on {}", name, locator.href);
            return Ok(None);
        };

        let text_lower = text.to_lowercase();
        let mut record = CompanyRecord::new(name, self.site.source, self.site.revenue_year);
        record.tax_id = Some(tax_id);
        record.revenue = ex.revenue(&text_lower);
        record.industry_code = ex.industry_code(&text);
        record.region = ex.region(&page.info_rows()?, &text);
        record.site = ex.site(&page.external_links()?, &text, &self.host);
        record.description = ex.description(&page, &text, &record.name);
        record.contacts = ex.contacts(&text);
        record.employees = ex.employees(&text_lower);
        record.rating_ref = Url::parse(&locator.href)
            .map(|u| u.path().to_string())
            .ok()
            .or_else(|| Some(locator.href.clone()));

        Ok(Some(record))
    }
}

fn shuffle(locators: &mut [Locator]) {
    locators.shuffle(&mut rand::thread_rng());
}

#[async_trait]
impl SourceAdapter for DirectoryAdapter {
    fn kind(&self) -> SourceKind {
        self.site.source
    }

    async fn collect(&self, queries: &[String], max_count: usize) -> Result<SourceOutcome> {
        collect_paged(self, queries, max_count).await
    }
}

#[async_trait]
impl PagedSource for DirectoryAdapter {
    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    async fn locate(&self, queries: &[String]) -> Result<Vec<Locator>> {
        let mut seen = HashSet::new();
        let mut locators = Vec::new();
        let mut first_request = true;

        for query in queries {
            log::info!("[{}] Searching '{}'", self.name(), query);

            for page in 1..=self.site.pages.max(1) {
                if !first_request {
                    self.fetcher.pause().await;
                }
                first_request = false;

                let url = self.site.search_url(query, page);
                let html = match self.fetcher.fetch_text(&url).await {
                    Ok(html) => html,
                    Err(e) => {
                        log::warn!("[{}] Search page failed {}: {}", self.name(), url, e);
                        break;
                    }
                };

                let links = self.company_links(&html)?;
                if links.is_empty() {
                    log::debug!("[{}] No results on page {} for '{}'", self.name(), page, query);
                    break;
                }
                for href in links {
                    if seen.insert(href.clone()) {
                        locators.push(Locator::new(href));
                    }
                }
            }
        }

        if self.site.shuffle {
            shuffle(&mut locators);
        }
        Ok(locators)
    }

    async fn assemble(&self, locator: &Locator) -> Result<Option<CompanyRecord>> {
        let html = self.fetcher.fetch_text(&locator.href).await?;
        self.parse_company(locator, &html)
    }

    async fn pause(&self) {
        self.fetcher.pause().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Config, SegmentTag};
    use crate::utils::http::testing::StaticFetcher;

    const SEARCH: &str = r#"<html><body>
        <a href="/company/101">ООО Промо Групп</a>
        <a href="https://www.list-org.com/company/101">дубль</a>
        <a href="/company/202">ООО Малый Сувенир</a>
        <a href="/company/303">ООО Сломанная</a>
        <a href="/about">О сайте</a>
        <a href="https://other.ru/company/9">чужой</a>
    </body></html>"#;

    const COMPANY: &str = r#"<html><body>
        <h1>ООО "Промо Групп"</h1>
        <p>ИНН: 7701234567</p>
        <p>Выручка: 350 000 000 руб.</p>
        <p>ОКВЭД: 73.11</p>
        <table class="info"><tr><td>Юридический адрес</td><td>г. Москва, ул. Ленина, 1</td></tr></table>
        <a href="https://vk.com/promogroup">VK</a>
        <a href="https://promogroup.ru/about">Сайт</a>
        <p>Почта: hello@promogroup.ru</p>
        <p>Численность: 85 чел.</p>
    </body></html>"#;

    const SMALL: &str = r#"<html><body>
        <h1>ООО "Малый Сувенир"</h1>
        <p>ИНН 7709876543</p>
        <p>Выручка: 12 000 000 руб.</p>
    </body></html>"#;

    fn site() -> DirectorySite {
        let mut site = Config::default()
            .directory(SourceKind::ListOrg)
            .cloned()
            .unwrap();
        site.pages = 1;
        site
    }

    fn adapter(fetcher: Arc<StaticFetcher>) -> DirectoryAdapter {
        let rules = RuleSet::from_config(&Config::default()).unwrap();
        DirectoryAdapter::new(site(), fetcher, rules).unwrap()
    }

    #[tokio::test]
    async fn test_locate_keeps_same_host_company_links() {
        let fetcher = Arc::new(StaticFetcher::new().with(&site().search_url("промо агентство", 1), SEARCH));
        let adapter = adapter(fetcher.clone());

        let locators = adapter.locate(&["промо агентство".to_string()]).await.unwrap();
        let hrefs: Vec<&str> = locators.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec![
                "https://www.list-org.com/company/101",
                "https://www.list-org.com/company/202",
                "https://www.list-org.com/company/303",
            ]
        );
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_assemble_extracts_fields() {
        let url = "https://www.list-org.com/company/101";
        let adapter = adapter(Arc::new(StaticFetcher::new().with(url, COMPANY)));

        let record = adapter.assemble(&Locator::new(url)).await.unwrap().unwrap();
        assert_eq!(record.name, "ООО \"Промо Групп\"");
        assert_eq!(record.tax_id.as_deref(), Some("7701234567"));
        assert_eq!(record.revenue, Some(350_000_000));
        assert_eq!(record.industry_code.as_deref(), Some("73.11"));
        assert_eq!(record.region.as_deref(), Some("г. Москва, ул. Ленина, 1"));
        assert_eq!(record.site.as_deref(), Some("https://promogroup.ru"));
        assert_eq!(record.contacts.as_deref(), Some("hello@promogroup.ru"));
        assert_eq!(record.employees, Some(85));
        assert_eq!(record.rating_ref.as_deref(), Some("/company/101"));
        assert_eq!(record.revenue_year, site().revenue_year);
    }

    #[tokio::test]
    async fn test_assemble_without_identity_is_absent() {
        let url = "https://www.list-org.com/company/303";
        let html = "<html><body><h1>ООО Сломанная</h1><p>Телефон 12345</p></body></html>";
        let broken = adapter(Arc::new(StaticFetcher::new().with(url, html)));
        assert!(broken.assemble(&Locator::new(url)).await.unwrap().is_none());

        let nameless = adapter(Arc::new(
            StaticFetcher::new().with(url, "<html><body><p>ИНН 7701234567</p></body></html>"),
        ));
        assert!(nameless.assemble(&Locator::new(url)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tax_id_from_locator_pattern() {
        let mut site = site();
        site.locator_id_pattern = Some(r"/company/(\d{10})".into());
        let url = "https://www.list-org.com/company/7701234567";
        let rules = RuleSet::from_config(&Config::default()).unwrap();
        let fetcher = Arc::new(StaticFetcher::new().with(url, "<h1>Промо Лайн</h1>"));
        let adapter = DirectoryAdapter::new(site, fetcher, rules).unwrap();

        let record = adapter.assemble(&Locator::new(url)).await.unwrap().unwrap();
        assert_eq!(record.tax_id.as_deref(), Some("7701234567"));
    }

    #[tokio::test]
    async fn test_collect_filters_and_skips_failures() {
        let fetcher = StaticFetcher::new()
            .with(&site().search_url("промо", 1), SEARCH)
            .with("https://www.list-org.com/company/101", COMPANY)
            .with("https://www.list-org.com/company/202", SMALL);
        let adapter = adapter(Arc::new(fetcher));

        let outcome = adapter.collect(&["промо".to_string()], 10).await.unwrap();
        assert_eq!(outcome.located, 3);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.records.len(), 1);

        let record = &outcome.records[0];
        assert_eq!(record.source, SourceKind::ListOrg);
        assert!(record.segment_tags.contains(SegmentTag::Btl));
    }

    #[tokio::test]
    async fn test_collect_without_results_is_empty() {
        let adapter = adapter(Arc::new(StaticFetcher::new()));
        let outcome = adapter.collect(&["промо".to_string()], 10).await.unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.located, 0);
    }
}
