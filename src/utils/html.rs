// src/utils/html.rs

//! Queryable wrapper around a parsed HTML document.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::Vocabulary;

/// Tags whose text never counts as page content.
const SKIPPED_TAGS: [&str; 3] = ["script", "style", "noscript"];

/// Parse a CSS selector, mapping failures into `AppError::Selector`.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// One parsed page.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Trimmed text of the first element matching `selector`.
    pub fn first_text(&self, selector: &str) -> Result<Option<String>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty()))
    }

    /// Content of `<meta name="description">`.
    pub fn meta_description(&self) -> Result<Option<String>> {
        let selector = parse_selector(r#"meta[name="description"]"#)?;
        Ok(self
            .document
            .select(&selector)
            .filter_map(|m| m.value().attr("content"))
            .map(|c| c.trim().to_string())
            .find(|c| !c.is_empty()))
    }

    /// All visible text nodes, one per line.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();
        for node in self.document.tree.root().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| SKIPPED_TAGS.contains(&e.name()))
            });
            if hidden {
                continue;
            }
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
        parts.join("\n")
    }

    /// Text of content blocks whose class or id matches `vocabulary`.
    pub fn blocks(&self, vocabulary: &Vocabulary) -> Result<Vec<String>> {
        let selector = parse_selector("div, section, article, p")?;
        Ok(self
            .document
            .select(&selector)
            .filter(|el| {
                let value = el.value();
                [value.attr("class"), value.attr("id")]
                    .into_iter()
                    .flatten()
                    .any(|attr| vocabulary.matches(&attr.to_lowercase()))
            })
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect())
    }

    /// (label, value) rows of tables whose class mentions info or details.
    pub fn info_rows(&self) -> Result<Vec<(String, String)>> {
        let tables = parse_selector("table")?;
        let rows = parse_selector("tr")?;
        let cells = parse_selector("td, th")?;

        let mut out = Vec::new();
        for table in self.document.select(&tables) {
            let class = table.value().attr("class").unwrap_or("").to_lowercase();
            if !(class.contains("info") || class.contains("details")) {
                continue;
            }
            for row in table.select(&rows) {
                let texts: Vec<String> = row.select(&cells).map(element_text).collect();
                if let [label, value, ..] = texts.as_slice() {
                    out.push((label.clone(), value.clone()));
                }
            }
        }
        Ok(out)
    }

    /// Distinct `href`s that contain `fragment`, in document order.
    pub fn links_containing(&self, fragment: &str) -> Result<Vec<String>> {
        self.links_where(|href| href.contains(fragment))
    }

    /// Distinct absolute http(s) links, in document order.
    pub fn external_links(&self) -> Result<Vec<String>> {
        self.links_where(|href| href.starts_with("http://") || href.starts_with("https://"))
    }

    fn links_where(&self, keep: impl Fn(&str) -> bool) -> Result<Vec<String>> {
        let selector = parse_selector("a[href]")?;
        let mut seen = HashSet::new();
        Ok(self
            .document
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| keep(href))
            .filter(|href| seen.insert(href.to_string()))
            .map(String::from)
            .collect())
    }
}

/// Whitespace-normalised text of an element.
fn element_text(element: ElementRef<'_>) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head>
          <meta name="description" content="  Организация промо-акций  ">
          <style>.x { color: red }</style>
        </head><body>
          <h1> ООО  Ромашка </h1>
          <script>var inn = "7701234567";</script>
          <div class="company-about">Оказываем услуги мерчандайзинга</div>
          <table class="company-info">
            <tr><td>Юридический адрес</td><td>г. Москва, ул. Ленина, 1</td></tr>
            <tr><td>Single</td></tr>
          </table>
          <a href="/company/1">A</a>
          <a href="/company/1">A again</a>
          <a href="/company/2">B</a>
          <a href="https://romashka.ru/about">site</a>
        </body></html>
    "#;

    #[test]
    fn test_first_text_and_meta() {
        let page = HtmlPage::parse(PAGE);
        assert_eq!(page.first_text("h1").unwrap().as_deref(), Some("ООО Ромашка"));
        assert_eq!(
            page.meta_description().unwrap().as_deref(),
            Some("Организация промо-акций")
        );
    }

    #[test]
    fn test_text_skips_scripts_and_styles() {
        let text = HtmlPage::parse(PAGE).text();
        assert!(text.contains("Ромашка"));
        assert!(!text.contains("7701234567"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_blocks_by_vocabulary() {
        let vocab = Vocabulary::compile(&["about"]).unwrap();
        let blocks = HtmlPage::parse(PAGE).blocks(&vocab).unwrap();
        assert_eq!(blocks, vec!["Оказываем услуги мерчандайзинга".to_string()]);
    }

    #[test]
    fn test_info_rows_need_two_cells() {
        let rows = HtmlPage::parse(PAGE).info_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "Юридический адрес");
    }

    #[test]
    fn test_links_are_distinct() {
        let page = HtmlPage::parse(PAGE);
        assert_eq!(
            page.links_containing("/company/").unwrap(),
            vec!["/company/1".to_string(), "/company/2".to_string()]
        );
        assert_eq!(
            page.external_links().unwrap(),
            vec!["https://romashka.ru/about".to_string()]
        );
    }

    #[test]
    fn test_bad_selector_is_error() {
        assert!(HtmlPage::parse(PAGE).first_text("h1[").is_err());
    }
}
