// src/services/extract.rs

//! Field extractors.
//!
//! Each extractor pulls one typed value out of messy page text using an
//! ordered pattern list; the first pattern that yields a sane value wins.

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;
use url::Url;

use crate::error::Result;
use crate::models::{FilterConfig, RuleTable, Vocabulary};
use crate::services::identity::is_valid_tax_id;
use crate::utils::html::HtmlPage;

/// Descriptions are cut to this many characters.
const DESCRIPTION_MAX_CHARS: usize = 200;

/// Hosts that are never a company's own website.
const EXCLUDED_SITE_HOSTS: &[&str] = &[
    "list-org",
    "rusprofile",
    "ruward",
    "google",
    "yandex",
    "mail.",
    "vk.com",
    "ok.ru",
    "t.me",
    "facebook",
    "instagram",
    "twitter",
    "linkedin",
    "youtube",
    "whatsapp",
];

/// Major regions recognised in free-form addresses, most specific first.
const MAJOR_REGIONS: &[&str] = &[
    "Московская область",
    "Ленинградская область",
    "Краснодарский край",
    "Свердловская область",
    "Ростовская область",
    "Республика Татарстан",
    "Челябинская область",
    "Новосибирская область",
    "Санкт-Петербург",
    "Москва",
];

/// Abbreviations and stems that still identify a region.
const REGION_ALIASES: &[(&str, &str)] = &[
    ("мо обл", "Московская область"),
    ("московская", "Московская область"),
    ("ленинградская", "Ленинградская область"),
    ("ленинград", "Ленинградская область"),
    ("мск", "Москва"),
    ("спб", "Санкт-Петербург"),
];

fn compile(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(Into::into))
        .collect()
}

/// Collapse runs of whitespace and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_graphemes(text: &str, max: usize) -> String {
    text.graphemes(true).take(max).collect()
}

fn digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Pattern-driven field extraction shared by every source.
pub struct FieldExtractor {
    revenue_min: u64,
    revenue_max: u64,
    revenue_patterns: Vec<Regex>,
    revenue_line: Regex,
    scaled_revenue: Regex,
    industry_patterns: Vec<Regex>,
    industry_format: Regex,
    tax_id_patterns: Vec<Regex>,
    bare_tax_id: Regex,
    region_patterns: Vec<Regex>,
    region_noise: Regex,
    email: Regex,
    phone_patterns: Vec<Regex>,
    employee_patterns: Vec<Regex>,
    site_token: Regex,
    description_patterns: Vec<Regex>,
    sentence_split: Regex,
    legal_patterns: Vec<Regex>,
    legal_vocabulary: Vocabulary,
    activity_vocabulary: Vocabulary,
    description_blocks: Vocabulary,
}

impl FieldExtractor {
    pub fn new(rules: &RuleTable, filter: &FilterConfig) -> Result<Self> {
        Ok(Self {
            revenue_min: filter.revenue_min,
            revenue_max: filter.revenue_max,
            // Explicit revenue labels come before generic income labels.
            revenue_patterns: compile(&[
                r"выручка[^\d]{0,20}(\d[\d\s]*)\s*руб",
                r"выручка[^\d]{0,20}(\d[\d\s]*)\s*₽",
                r"общая выручка[^\d]{0,20}(\d[\d\s]*)",
                r"выручка за год[^\d]{0,20}(\d[\d\s]*)",
                r"от реализации[^\d]{0,20}(\d[\d\s]*)\s*руб",
                r"доход[^\d]{0,20}(\d[\d\s]*)\s*руб",
                r"прибыль[^\d]{0,20}(\d[\d\s]*)\s*руб",
            ])?,
            revenue_line: Regex::new(r"(?i)выручк|оборот|доход")?,
            scaled_revenue: Regex::new(
                r"(?i)\b(\d{1,3}(?:[ \x{a0}]\d{3})*(?:[.,]\d+)?)\s*(млрд|млн|тыс)",
            )?,
            industry_patterns: compile(&[
                r"(?i)оквэд2?[^:\d]*:?\s*(\d{2}\.\d{2}(?:\.\d{1,2})?)",
                r"(?i)основной вид деятельности[^\d]{0,40}(\d{2}\.\d{2}(?:\.\d{1,2})?)",
            ])?,
            industry_format: Regex::new(r"^\d{2}\.\d{2}(?:\.\d{1,2})?$")?,
            tax_id_patterns: compile(&[
                r"(?i)инн\s*[:\-]?\s*(\d{12}|\d{10})\b",
                r"(?i)инн/кпп[^\d]*(\d{10})",
            ])?,
            bare_tax_id: Regex::new(r"\b(\d{10})\b")?,
            region_patterns: compile(&[
                r"(?i)место нахождения[:\s]+([^\n]{5,80})",
                r"(?i)юридический адрес[:\s]+([^\n]{5,80})",
                r"(?i)адрес организации[:\s]+([^\n]{5,80})",
                r"(?i)адрес[:\s]+([^\n]{5,80})",
                r"(?i)город[:\s]+([^\n]{5,50})",
                r"(?i)регион[:\s]+([^\n]{5,50})",
            ])?,
            region_noise: Regex::new(r"(?i)\bинн.*|\d{6},?|\bтел(?:[.:]|ефон).*|\bфакс.*")?,
            email: Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")?,
            phone_patterns: compile(&[
                r"(?:\+7|\b8)\s?\(?\d{3}\)?\s?\d{3}[\s-]?\d{2}[\s-]?\d{2}",
                r"(?i)тел(?:ефон)?[.:\s]*([+\d][\d\s()\-]{8,20}\d)",
            ])?,
            employee_patterns: compile(&[
                r"сотрудник[^\d]{0,10}(\d{1,5})\s*чел",
                r"численность[^\d]{0,30}(\d{1,5})\s*чел",
                r"персонал[^\d]{0,20}(\d{1,5})\s*чел",
                r"работает[^\d]{0,10}(\d{1,5})\s*чел",
                r"штат[^\d]{0,20}(\d{1,5})\s*сотрудник",
            ])?,
            site_token: Regex::new(r#"https?://[^\s/"'<>]+\.[^\s/"'<>]+"#)?,
            description_patterns: compile(&[
                r"(?i)предоставляет услуги[:\s]*([^\n.]{10,150})",
                r"(?i)специализация[:\s]*([^\n.]{10,150})",
                r"(?i)основные услуги[:\s]*([^\n.]{10,150})",
                r"(?i)занимается[:\s]*([^\n.]{10,150})",
                r"(?i)осуществляет деятельность[:\s]*([^\n.]{10,150})",
                r"(?i)деятельность компании[:\s]*([^\n.]{10,150})",
                r"(?i)компания работает в сфере[:\s]*([^\n.]{10,150})",
            ])?,
            sentence_split: Regex::new(r"[.!?]\s+|\n+")?,
            legal_patterns: compile(&[
                r"\bинн\s*\d{10,12}\b",
                r"\bогрн\s*\d{13,15}\b",
                r"\bокпо\s*\d{8,10}\b",
                r"\d{2}\.\d{2}\.\d{6,7}",
                r"\d{10,}",
                r"общество с ограниченной ответственностью",
                r"\b(?:ооо|зао|оао|пао|ао|ип)\b",
            ])?,
            legal_vocabulary: Vocabulary::compile(&rules.legal_vocabulary)?,
            activity_vocabulary: Vocabulary::compile(&rules.activity_vocabulary)?,
            description_blocks: Vocabulary::compile(&rules.description_blocks)?,
        })
    }

    /// Annual revenue from a lowercased page text.
    pub fn revenue(&self, text_lower: &str) -> Option<u64> {
        self.revenue_patterns.iter().find_map(|pattern| {
            let caps = pattern.captures(text_lower)?;
            let value: u64 = digits(caps.get(1)?.as_str()).parse().ok()?;
            (self.revenue_min..=self.revenue_max)
                .contains(&value)
                .then_some(value)
        })
    }

    /// Revenue written with a magnitude word ("1,5 млрд", "350 млн").
    ///
    /// Only lines mentioning revenue, turnover or income are considered, and
    /// the figure must fall inside the same sanity band as [`Self::revenue`].
    pub fn scaled_revenue(&self, text: &str) -> Option<u64> {
        text.lines()
            .filter(|line| self.revenue_line.is_match(line))
            .flat_map(|line| self.scaled_revenue.captures_iter(line))
            .find_map(|caps| {
                let number: f64 = caps
                    .get(1)?
                    .as_str()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .replace(',', ".")
                    .parse()
                    .ok()?;
                let multiplier = match caps.get(2)?.as_str().to_lowercase().as_str() {
                    "млрд" => 1_000_000_000.0,
                    "млн" => 1_000_000.0,
                    _ => 1_000.0,
                };
                let value = (number * multiplier).round() as u64;
                (self.revenue_min..=self.revenue_max)
                    .contains(&value)
                    .then_some(value)
            })
    }

    /// Industry classification code, e.g. `73.11` or `73.11.1`.
    pub fn industry_code(&self, text: &str) -> Option<String> {
        self.industry_patterns.iter().find_map(|pattern| {
            let code = pattern.captures(text)?.get(1)?.as_str();
            self.is_industry_code(code).then(|| code.to_string())
        })
    }

    pub fn is_industry_code(&self, code: &str) -> bool {
        self.industry_format.is_match(code)
    }

    /// First tax ID in the text that passes validation, falling back to any
    /// bare ten-digit number.
    pub fn tax_id(&self, text: &str) -> Option<String> {
        self.labelled_tax_id(text)
            .or_else(|| Self::first_valid(&self.bare_tax_id, text))
    }

    /// Tax ID that follows an explicit label only.
    pub fn labelled_tax_id(&self, text: &str) -> Option<String> {
        self.tax_id_patterns
            .iter()
            .find_map(|pattern| Self::first_valid(pattern, text))
    }

    fn first_valid(pattern: &Regex, text: &str) -> Option<String> {
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|candidate| is_valid_tax_id(candidate))
            .map(String::from)
    }

    /// Region from a labelled info table, else from labelled text.
    pub fn region(&self, info_rows: &[(String, String)], text: &str) -> Option<String> {
        const LABELS: [&str; 5] = ["адрес", "место", "регион", "город", "location"];

        let from_table = info_rows.iter().find_map(|(label, value)| {
            let label = label.to_lowercase();
            if LABELS.iter().any(|l| label.contains(l)) {
                self.clean_region(value)
            } else {
                None
            }
        });
        if from_table.is_some() {
            return from_table;
        }

        self.region_patterns.iter().find_map(|pattern| {
            let span = pattern.captures(text)?.get(1)?.as_str();
            self.clean_region(span)
        })
    }

    fn clean_region(&self, raw: &str) -> Option<String> {
        let stripped = self.region_noise.replace_all(raw, "");
        let cleaned = clean_text(&stripped);
        let cleaned = cleaned.trim_matches(|c: char| matches!(c, ' ' | ',' | ';' | ':'));
        let len = cleaned.chars().count();
        (len > 3 && len < 100).then(|| cleaned.to_string())
    }

    /// Map a free-form address onto one of the major regions.
    pub fn region_from_address(address: &str) -> Option<String> {
        let lower = address.to_lowercase();
        MAJOR_REGIONS
            .iter()
            .find(|region| lower.contains(&region.to_lowercase()))
            .copied()
            .or_else(|| {
                REGION_ALIASES
                    .iter()
                    .find(|(alias, _)| lower.contains(alias))
                    .map(|(_, region)| *region)
            })
            .map(String::from)
    }

    /// Company website reduced to scheme + host.
    ///
    /// Links are tried first, then bare URLs in the text. Search engines,
    /// social networks and `own_host` never qualify.
    pub fn site(&self, links: &[String], text: &str, own_host: &str) -> Option<String> {
        let from_text = self.site_token.find_iter(text).map(|m| m.as_str());
        links
            .iter()
            .map(String::as_str)
            .chain(from_text)
            .find_map(|candidate| Self::site_root(candidate, own_host))
    }

    fn site_root(candidate: &str, own_host: &str) -> Option<String> {
        let url = Url::parse(candidate).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?.to_lowercase();
        let own = own_host.trim_start_matches("www.").to_lowercase();
        if !own.is_empty() && host.trim_start_matches("www.").ends_with(&own) {
            return None;
        }
        if EXCLUDED_SITE_HOSTS.iter().any(|h| host.contains(h)) {
            return None;
        }
        Some(format!("{}://{}", url.scheme(), host))
    }

    /// One contact: an email if present, else a domestic phone number.
    pub fn contacts(&self, text: &str) -> Option<String> {
        if let Some(email) = self.email.find(text) {
            return Some(email.as_str().to_string());
        }
        self.phone_patterns.iter().find_map(|pattern| {
            let caps = pattern.captures(text)?;
            let phone = caps.get(1).or_else(|| caps.get(0))?.as_str().trim();
            matches!(digits(phone).len(), 10 | 11).then(|| clean_text(phone))
        })
    }

    /// Head count from a lowercased page text.
    pub fn employees(&self, text_lower: &str) -> Option<u32> {
        self.employee_patterns.iter().find_map(|pattern| {
            let count: u32 = pattern.captures(text_lower)?.get(1)?.as_str().parse().ok()?;
            (1..=10_000).contains(&count).then_some(count)
        })
    }

    /// Business description of a page, or `None` if only boilerplate exists.
    pub fn description(&self, page: &HtmlPage, text: &str, name: &str) -> Option<String> {
        let meta = page.meta_description().ok().flatten();
        let blocks = page.blocks(&self.description_blocks).unwrap_or_default();
        self.description_from(meta.as_deref(), &blocks, text, name)
    }

    /// Description search over pre-extracted candidates, in priority order:
    /// meta description, content blocks, labelled sentences, any sentence.
    pub fn description_from(
        &self,
        meta: Option<&str>,
        blocks: &[String],
        text: &str,
        name: &str,
    ) -> Option<String> {
        if let Some(found) = meta.and_then(|m| self.accept_description(m, name)) {
            return Some(found);
        }

        if let Some(found) = blocks
            .iter()
            .find_map(|block| self.accept_description(block, name))
        {
            return Some(found);
        }

        let labelled = self.description_patterns.iter().find_map(|pattern| {
            let span = pattern.captures(text)?.get(1)?.as_str();
            self.accept_description(span, name)
        });
        if labelled.is_some() {
            return labelled;
        }

        self.sentence_split
            .split(text)
            .map(str::trim)
            .filter(|s| {
                let len = s.chars().count();
                len > 30 && len < 200
            })
            .find_map(|sentence| self.accept_description(sentence, name))
    }

    fn accept_description(&self, candidate: &str, name: &str) -> Option<String> {
        if !self.is_real_description(candidate, name) {
            return None;
        }
        let cleaned = truncate_graphemes(&clean_text(candidate), DESCRIPTION_MAX_CHARS);
        (!self.contains_legal_info(&cleaned)).then_some(cleaned)
    }

    /// True if `text` reads like an activity description rather than
    /// registration boilerplate.
    pub fn is_real_description(&self, text: &str, name: &str) -> bool {
        let len = text.chars().count();
        if len <= 20 || len >= 500 {
            return false;
        }

        let text_lower = text.to_lowercase();
        if self.legal_vocabulary.matches(&text_lower) {
            return false;
        }

        let name_lower = clean_text(&name.to_lowercase());
        if !name_lower.is_empty()
            && text_lower.contains(&name_lower)
            && len < name_lower.chars().count() * 2
        {
            return false;
        }

        self.activity_vocabulary.matches(&text_lower)
    }

    /// Strict boilerplate detector: ID-shaped numbers and legal-form tokens.
    pub fn contains_legal_info(&self, text: &str) -> bool {
        let text_lower = text.to_lowercase();
        self.legal_patterns.iter().any(|p| p.is_match(&text_lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(&RuleTable::default(), &FilterConfig::default()).unwrap()
    }

    const SAMPLE: &str = "ИНН 7701234567, ООО Ромашка, выручка 250000000 руб, ОКВЭД 73.11";

    #[test]
    fn test_sample_line() {
        let ex = extractor();
        assert_eq!(ex.revenue(&SAMPLE.to_lowercase()), Some(250_000_000));
        assert_eq!(ex.industry_code(SAMPLE).as_deref(), Some("73.11"));
        assert_eq!(ex.tax_id(SAMPLE).as_deref(), Some("7701234567"));
    }

    #[test]
    fn test_revenue_with_separators_and_bounds() {
        let ex = extractor();
        assert_eq!(
            ex.revenue("выручка за 2023 год: 1 250 000 000 руб."),
            None,
            "year breaks the labelled number"
        );
        assert_eq!(ex.revenue("выручка: 1 250 000 000 руб."), Some(1_250_000_000));
        assert_eq!(ex.revenue("выручка 900 руб"), None);
        assert_eq!(ex.revenue("доход 5 000 000 ₽"), None);
        assert_eq!(ex.revenue("доход 5 000 000 руб"), Some(5_000_000));
    }

    #[test]
    fn test_scaled_revenue() {
        let ex = extractor();
        let text = "Агентство года\nВыручка: 1,5 млрд руб\nСотрудников 120";
        assert_eq!(ex.scaled_revenue(text), Some(1_500_000_000));
        assert_eq!(ex.scaled_revenue("Оборот 350 млн"), Some(350_000_000));
        assert_eq!(ex.scaled_revenue("Проектов 350 тыс"), None);
    }

    #[test]
    fn test_scaled_revenue_ignores_leading_year() {
        let ex = extractor();
        assert_eq!(
            ex.scaled_revenue("Выручка 2023 1,2 млрд руб"),
            Some(1_200_000_000)
        );
        assert_eq!(ex.scaled_revenue("Выручка 1 250 млн"), Some(1_250_000_000));
        assert_eq!(ex.scaled_revenue("Выручка 5 тыс руб"), None, "below the band");
        assert_eq!(ex.scaled_revenue("Выручка 9000 млрд"), None, "above the band");
    }

    #[test]
    fn test_industry_code_format() {
        let ex = extractor();
        assert_eq!(
            ex.industry_code("Код ОКВЭД2: 18.12.1 Прочие виды полиграфической деятельности")
                .as_deref(),
            Some("18.12.1")
        );
        assert!(ex.is_industry_code("73.11"));
        assert!(!ex.is_industry_code("73.1"));
        assert!(!ex.is_industry_code("73.11.123"));
    }

    #[test]
    fn test_tax_id_variants() {
        let ex = extractor();
        assert_eq!(
            ex.tax_id("ИНН/КПП 7712345678/771201001").as_deref(),
            Some("7712345678")
        );
        assert_eq!(
            ex.tax_id("ИНН: 770123456789").as_deref(),
            Some("770123456789")
        );
        assert_eq!(ex.tax_id("Телефон 12345").as_deref(), None);
    }

    #[test]
    fn test_region_from_table_then_text() {
        let ex = extractor();
        let rows = vec![(
            "Юридический адрес".to_string(),
            "115088, г. Москва, ул. Угрешская, тел. 123".to_string(),
        )];
        assert_eq!(
            ex.region(&rows, "").as_deref(),
            Some("г. Москва, ул. Угрешская")
        );
        assert_eq!(
            ex.region(&[], "Город: Екатеринбург\nещё").as_deref(),
            Some("Екатеринбург")
        );
        assert_eq!(ex.region(&[], "Регион: СПб"), None);
    }

    #[test]
    fn test_region_keeps_street_names_with_tel() {
        let ex = extractor();
        let rows = vec![(
            "Адрес".to_string(),
            "г. Москва, ул. Строителей, д. 5, телефон 8 495 000".to_string(),
        )];
        assert_eq!(
            ex.region(&rows, "").as_deref(),
            Some("г. Москва, ул. Строителей, д. 5")
        );
        assert_eq!(
            ex.region(&[], "Адрес: г. Казань, ул. Гостелевая ИНН7701234567").as_deref(),
            Some("г. Казань, ул. Гостелевая")
        );
    }

    #[test]
    fn test_region_from_address() {
        assert_eq!(
            FieldExtractor::region_from_address("142100, Московская обл., г. Подольск")
                .as_deref(),
            Some("Московская область")
        );
        assert_eq!(
            FieldExtractor::region_from_address("г Москва, ул Тверская").as_deref(),
            Some("Москва")
        );
        assert_eq!(FieldExtractor::region_from_address("г. Тверь"), None);
    }

    #[test]
    fn test_site_skips_excluded_hosts() {
        let ex = extractor();
        let links = vec![
            "https://vk.com/romashka".to_string(),
            "https://www.list-org.com/company/1".to_string(),
            "https://romashka.ru/contacts".to_string(),
        ];
        assert_eq!(
            ex.site(&links, "", "list-org.com").as_deref(),
            Some("https://romashka.ru")
        );
        assert_eq!(
            ex.site(&[], "Сайт: http://promo.example.ru/about", "list-org.com")
                .as_deref(),
            Some("http://promo.example.ru")
        );
    }

    #[test]
    fn test_contacts_prefer_email() {
        let ex = extractor();
        assert_eq!(
            ex.contacts("Тел: +7 (495) 123-45-67, info@romashka.ru").as_deref(),
            Some("info@romashka.ru")
        );
        assert_eq!(
            ex.contacts("Телефон: +7 (495) 123-45-67").as_deref(),
            Some("+7 (495) 123-45-67")
        );
    }

    #[test]
    fn test_employees_bounds() {
        let ex = extractor();
        assert_eq!(ex.employees("сотрудников: 45 чел."), Some(45));
        assert_eq!(ex.employees("численность персонала 0 чел"), None);
        assert_eq!(ex.employees("штат 20000 сотрудников"), None);
    }

    #[test]
    fn test_real_description() {
        let ex = extractor();
        assert!(ex.is_real_description(
            "Производство сувенирной продукции с логотипом для компаний",
            "Ромашка"
        ));
        assert!(!ex.is_real_description(
            "ООО Ромашка оказывает услуги полиграфии",
            "Ромашка"
        ));
        assert!(!ex.is_real_description(
            "Дата регистрации 2010, услуги печати",
            "Ромашка"
        ));
        assert!(!ex.is_real_description("Услуги", "Ромашка"));
        assert!(!ex.is_real_description(
            "Красивая компания с большой историей успеха",
            "Ромашка"
        ));
    }

    #[test]
    fn test_description_priority() {
        let ex = extractor();
        let blocks = vec!["Организация промо-акций и дегустаций в магазинах".to_string()];
        assert_eq!(
            ex.description_from(Some("ИНН 7701234567 ОГРН"), &blocks, "", "Ромашка")
                .as_deref(),
            Some("Организация промо-акций и дегустаций в магазинах")
        );

        let text = "Главная\nКомпания занимается: проведением ивентов для брендов\nКонтакты";
        assert_eq!(
            ex.description_from(None, &[], text, "Ромашка").as_deref(),
            Some("проведением ивентов для брендов")
        );
        assert_eq!(ex.description_from(None, &[], "ОГРН 1027700132195", "Ромашка"), None);
    }

    #[test]
    fn test_description_never_leaks_legal_info() {
        let ex = extractor();
        let inputs = [
            "Оказывает услуги печати, реквизиты 7701234567890 и другие данные компании",
            "Специализация: производство сувениров ИП Петров и партнёры по всей стране",
            "Занимается организацией мероприятий по всей России, номер 1234567890",
            "Предоставляет услуги пао и сувениры для всех клиентов без исключения",
            "Продажа рекламных конструкций. Деятельность ООО Вектор 7701234567. Разработка сайтов и внедрение CRM для бизнеса любого масштаба",
        ];
        let blocks: Vec<String> = inputs.iter().map(|s| s.to_string()).collect();
        for input in inputs {
            for result in [
                ex.description_from(Some(input), &[], input, "Вектор"),
                ex.description_from(None, &blocks, input, "Вектор"),
                ex.description_from(None, &[], input, "Вектор"),
            ]
            .into_iter()
            .flatten()
            {
                assert!(!ex.contains_legal_info(&result), "leaked: {result}");
            }
        }
    }

    #[test]
    fn test_contains_legal_info() {
        let ex = extractor();
        assert!(ex.contains_legal_info("ИНН 7701234567"));
        assert!(ex.contains_legal_info("ОГРН 1027700132195"));
        assert!(ex.contains_legal_info("ао Вектор"));
        assert!(!ex.contains_legal_info("Организация праздников"));
    }
}
