// src/models/rules.rs

//! Shared keyword and industry-code rule table.
//!
//! One table feeds the relevance filter, the segment classifier and the
//! description extractor, so every source applies the same rules.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SegmentTag;

/// Current built-in rule table version.
pub const RULES_VERSION: u32 = 3;

/// Keyword fragments that indicate one segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCluster {
    pub label: SegmentTag,
    pub keywords: Vec<String>,
}

/// Industry code prefix that implies one segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSegment {
    pub prefix: String,
    pub label: SegmentTag,
}

/// Versioned rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default = "defaults::version")]
    pub version: u32,

    /// Segment keyword clusters (BTL, SOUVENIR, FULL_CYCLE, COMM_GROUP)
    #[serde(default = "defaults::clusters")]
    pub clusters: Vec<KeywordCluster>,

    /// Industry code prefix → segment
    #[serde(default = "defaults::code_segments")]
    pub code_segments: Vec<CodeSegment>,

    /// Generic advertising/marketing terms; last-resort COMM_GROUP
    #[serde(default = "defaults::fallback_terms")]
    pub fallback_terms: Vec<String>,

    /// Business-relevance keywords checked against name + description
    #[serde(default = "defaults::profile_keywords")]
    pub profile_keywords: Vec<String>,

    /// Industry code prefixes that make a profile relevant on their own
    #[serde(default = "defaults::profile_codes")]
    pub profile_codes: Vec<String>,

    /// Words hinting that a region/address is domestic
    #[serde(default = "defaults::national_indicators")]
    pub national_indicators: Vec<String>,

    /// Legal/registration boilerplate that disqualifies a description
    #[serde(default = "defaults::legal_vocabulary")]
    pub legal_vocabulary: Vec<String>,

    /// Activity words a real description must contain
    #[serde(default = "defaults::activity_vocabulary")]
    pub activity_vocabulary: Vec<String>,

    /// class/id fragments of markup blocks likely to hold a description
    #[serde(default = "defaults::description_blocks")]
    pub description_blocks: Vec<String>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            version: defaults::version(),
            clusters: defaults::clusters(),
            code_segments: defaults::code_segments(),
            fallback_terms: defaults::fallback_terms(),
            profile_keywords: defaults::profile_keywords(),
            profile_codes: defaults::profile_codes(),
            national_indicators: defaults::national_indicators(),
            legal_vocabulary: defaults::legal_vocabulary(),
            activity_vocabulary: defaults::activity_vocabulary(),
            description_blocks: defaults::description_blocks(),
        }
    }
}

impl RuleTable {
    /// Validate that every rule list the pipeline depends on is populated.
    pub fn validate(&self) -> Result<()> {
        if self.clusters.is_empty() {
            return Err(AppError::validation("rules.clusters is empty"));
        }
        if self.profile_keywords.is_empty() && self.profile_codes.is_empty() {
            return Err(AppError::validation(
                "rules.profile_keywords and rules.profile_codes are both empty",
            ));
        }
        if self.activity_vocabulary.is_empty() {
            return Err(AppError::validation("rules.activity_vocabulary is empty"));
        }
        for cluster in &self.clusters {
            if cluster.label == SegmentTag::Other {
                return Err(AppError::validation("OTHER cannot be a keyword cluster"));
            }
        }
        Ok(())
    }
}

/// Compiled set of terms matched against lowercased text.
///
/// Short purely alphabetic terms (three characters or fewer, e.g. `pr`,
/// `btl`, `ао`) only match as whole words; longer terms are stemmed
/// fragments and match anywhere.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pattern: Option<Regex>,
}

impl Vocabulary {
    pub fn compile<S: AsRef<str>>(terms: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = terms
            .iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .map(|t| {
                let escaped = regex::escape(&t);
                if t.chars().count() <= 3 && t.chars().all(char::is_alphabetic) {
                    format!(r"\b{escaped}\b")
                } else {
                    escaped
                }
            })
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// True if any term occurs in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }

    /// The first matching term occurrence, if any.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .as_ref()
            .and_then(|p| p.find(text))
            .map(|m| m.as_str())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

mod defaults {
    use super::*;

    pub fn version() -> u32 {
        RULES_VERSION
    }

    pub fn clusters() -> Vec<KeywordCluster> {
        vec![
            KeywordCluster {
                label: SegmentTag::Btl,
                keywords: strings(&[
                    "btl",
                    "промо",
                    "ивент",
                    "event",
                    "мерчандайзинг",
                    "мерчендайзинг",
                    "бренд-актив",
                    "бренд активац",
                    "промоакц",
                    "промо-акц",
                    "live marketing",
                    "field marketing",
                    "торговый маркетинг",
                ]),
            },
            KeywordCluster {
                label: SegmentTag::Souvenir,
                keywords: strings(&[
                    "сувенир",
                    "промопродукц",
                    "подар",
                    "полиграф",
                    "печат",
                    "тираж",
                    "календар",
                    "брендирован",
                    "бизнес-сувенир",
                ]),
            },
            KeywordCluster {
                label: SegmentTag::FullCycle,
                keywords: strings(&[
                    "полный цикл",
                    "полного цикла",
                    "full cycle",
                    "full-service",
                    "fullservice",
                    "комплексн",
                    "интегрирован",
                    "интегратор",
                    "360°",
                    "end-to-end",
                ]),
            },
            KeywordCluster {
                label: SegmentTag::CommGroup,
                keywords: strings(&[
                    "коммуникаци",
                    "комм груп",
                    "агентств",
                    "рекламн",
                    "маркетингов",
                    "pr",
                    "public relations",
                    "digital",
                    "диджитал",
                    "креативн",
                    "медиа",
                    "smm",
                    "контент-маркетинг",
                    "брендинг",
                ]),
            },
        ]
    }

    pub fn code_segments() -> Vec<CodeSegment> {
        [
            ("73.11", SegmentTag::Btl),
            ("73.12", SegmentTag::CommGroup),
            ("18.12", SegmentTag::Souvenir),
            ("74.20", SegmentTag::FullCycle),
            ("90.03", SegmentTag::Btl),
            ("74.10", SegmentTag::CommGroup),
            ("74.30", SegmentTag::Btl),
            ("58.11", SegmentTag::Souvenir),
            ("58.19", SegmentTag::Souvenir),
        ]
        .into_iter()
        .map(|(prefix, label)| CodeSegment {
            prefix: prefix.to_string(),
            label,
        })
        .collect()
    }

    pub fn fallback_terms() -> Vec<String> {
        strings(&["реклам", "маркетинг", "advertis", "marketing"])
    }

    pub fn profile_keywords() -> Vec<String> {
        strings(&[
            // events / promotions
            "btl",
            "промо",
            "ивент",
            "event",
            "мерчандайзинг",
            "мерчендайзинг",
            "бренд-актив",
            "бренд активац",
            "живой маркетинг",
            "field marketing",
            "live marketing",
            "торговый маркетинг",
            "промоутер",
            "активац",
            "сэмплинг",
            // souvenirs / printing
            "сувенир",
            "подар",
            "промопродукц",
            "полиграф",
            "печат",
            "тираж",
            "календар",
            "брендирован",
            "типограф",
            "премиальн",
            // communications
            "коммуникац",
            "комм груп",
            "агентств",
            "agency",
            "рекламн",
            "advertising",
            "маркетингов",
            "marketing",
            "pr",
            "public relations",
            "digital",
            "диджитал",
            "креатив",
            "creative",
            "медиа",
            "media",
            "smm",
            "контент",
            "брендинг",
            // full cycle
            "полный цикл",
            "полного цикла",
            "full cycle",
            "full-service",
            "комплексн",
            "интегрирован",
            "интегратор",
            "360°",
            "end-to-end",
        ])
    }

    pub fn profile_codes() -> Vec<String> {
        strings(&[
            "73.11", "73.12", "18.12", "74.10", "74.20", "90.03", "58.11", "58.19", "73.20",
            "74.30", "82.30",
        ])
    }

    pub fn national_indicators() -> Vec<String> {
        strings(&[
            "россия",
            "рф",
            "ru",
            "russia",
            "российская федерация",
            "москва",
            "санкт-петербург",
            "спб",
            "moscow",
            "st. petersburg",
            "область",
            "край",
            "республика",
            "респ.",
            "автономный округ",
            "г. ",
            "город ",
            "ул.",
            "проспект",
            "бульвар",
            "проезд",
        ])
    }

    pub fn legal_vocabulary() -> Vec<String> {
        strings(&[
            "общество с ограниченной ответственностью",
            "ооо",
            "зао",
            "оао",
            "пао",
            "ао",
            "инн",
            "огрн",
            "окпо",
            "октмо",
            "окогу",
            "кпп",
            "егрюл",
            "показатели",
            "адрес",
            "руководитель",
            "директор",
            "телефон",
            "вид деятельности компании",
            "основной государственный регистрационный номер",
            "общероссийский классификатор",
            "дата регистрации",
            "уставный капитал",
        ])
    }

    pub fn activity_vocabulary() -> Vec<String> {
        strings(&[
            "услуг",
            "деятельност",
            "работает",
            "занимается",
            "специализ",
            "предоставля",
            "оказыва",
            "производств",
            "продаж",
            "организаци",
            "разработк",
            "внедрени",
            "проведени",
            "создани",
            "реализаци",
            "обслуживани",
            "services",
            "engaged in",
            "specializ",
            "provides",
            "production",
            "development",
        ])
    }

    pub fn description_blocks() -> Vec<String> {
        strings(&[
            "description",
            "desc",
            "about",
            "annotation",
            "activity",
            "services",
            "info",
            "text",
            "услуги",
            "деятельность",
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_validate() {
        let rules = RuleTable::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.version, RULES_VERSION);
        assert_eq!(rules.clusters.len(), 4);
    }

    #[test]
    fn test_short_terms_match_whole_words() {
        let vocab = Vocabulary::compile(&["pr", "сувенир"]).unwrap();
        assert!(vocab.matches("pr-агентство"));
        assert!(vocab.matches("агентство pr и маркетинга"));
        assert!(!vocab.matches("production company"));
        assert!(vocab.matches("сувенирная продукция"));
    }

    #[test]
    fn test_cyrillic_word_boundary() {
        let vocab = Vocabulary::compile(&["ао"]).unwrap();
        assert!(vocab.matches("ао \"ромашка\""));
        assert!(!vocab.matches("заодно"));
    }

    #[test]
    fn test_empty_vocabulary_never_matches() {
        let vocab = Vocabulary::compile::<&str>(&[]).unwrap();
        assert!(!vocab.matches("anything"));
        assert_eq!(vocab.find("anything"), None);
    }

    #[test]
    fn test_rules_from_partial_toml() {
        let rules: RuleTable = toml::from_str("fallback_terms = [\"ads\"]").unwrap();
        assert_eq!(rules.fallback_terms, vec!["ads".to_string()]);
        assert!(!rules.clusters.is_empty());
    }
}
