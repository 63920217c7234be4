// src/models/company.rs

//! Canonical company record and its segment labels.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// External source that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// list-org.com business directory
    ListOrg,
    /// rusprofile.ru business directory
    Rusprofile,
    /// Tax-authority open data dumps
    FnsOpenData,
    /// Agency ratings site
    Ruward,
}

impl SourceKind {
    /// All sources, in default run order.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::ListOrg,
        SourceKind::Rusprofile,
        SourceKind::FnsOpenData,
        SourceKind::Ruward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::ListOrg => "list_org",
            SourceKind::Rusprofile => "rusprofile",
            SourceKind::FnsOpenData => "fns_open_data",
            SourceKind::Ruward => "ruward",
        }
    }

    /// Ratings records may be identified by name + site instead of a tax ID.
    pub fn is_ratings(&self) -> bool {
        matches!(self, SourceKind::Ruward)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| AppError::config(format!("Unknown source '{s}'")))
    }
}

/// Market segment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentTag {
    Btl,
    Souvenir,
    FullCycle,
    CommGroup,
    Other,
    // Ratings-only labels, taken from the listing category.
    DigitalAgency,
    PrAgency,
    BtlAgency,
    EventAgency,
    MediaAgency,
    CreativeAgency,
}

impl SegmentTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentTag::Btl => "BTL",
            SegmentTag::Souvenir => "SOUVENIR",
            SegmentTag::FullCycle => "FULL_CYCLE",
            SegmentTag::CommGroup => "COMM_GROUP",
            SegmentTag::Other => "OTHER",
            SegmentTag::DigitalAgency => "DIGITAL_AGENCY",
            SegmentTag::PrAgency => "PR_AGENCY",
            SegmentTag::BtlAgency => "BTL_AGENCY",
            SegmentTag::EventAgency => "EVENT_AGENCY",
            SegmentTag::MediaAgency => "MEDIA_AGENCY",
            SegmentTag::CreativeAgency => "CREATIVE_AGENCY",
        }
    }
}

impl fmt::Display for SegmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of segment labels attached to a record.
///
/// `OTHER` is only ever present alone: adding a real label drops it, and an
/// empty set renders as `OTHER`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSet(BTreeSet<SegmentTag>);

impl SegmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn other() -> Self {
        let mut set = BTreeSet::new();
        set.insert(SegmentTag::Other);
        Self(set)
    }

    pub fn insert(&mut self, tag: SegmentTag) {
        if tag == SegmentTag::Other {
            if self.0.is_empty() {
                self.0.insert(tag);
            }
            return;
        }
        self.0.remove(&SegmentTag::Other);
        self.0.insert(tag);
    }

    pub fn extend(&mut self, other: &SegmentSet) {
        for tag in &other.0 {
            self.insert(*tag);
        }
    }

    pub fn contains(&self, tag: SegmentTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Collapse an empty set to `{OTHER}`.
    pub fn finalize(mut self) -> Self {
        if self.0.is_empty() {
            self.0.insert(SegmentTag::Other);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = SegmentTag> + '_ {
        self.0.iter().copied()
    }

    /// Pipe-joined, alphabetically sorted labels for storage.
    pub fn to_pipe_string(&self) -> String {
        if self.0.is_empty() {
            return SegmentTag::Other.as_str().to_string();
        }
        let mut labels: Vec<&str> = self.0.iter().map(|t| t.as_str()).collect();
        labels.sort_unstable();
        labels.join("|")
    }
}

impl FromIterator<SegmentTag> for SegmentSet {
    fn from_iter<I: IntoIterator<Item = SegmentTag>>(iter: I) -> Self {
        let mut set = SegmentSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

/// Opaque reference a source uses to fetch one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    /// Path or absolute URL of the candidate page / dataset
    pub href: String,
    /// Listing category the candidate was found under (ratings)
    pub category: Option<String>,
    /// Position in the listing, 1-based (ratings)
    pub position: Option<u32>,
}

impl Locator {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            category: None,
            position: None,
        }
    }

    pub fn in_category(href: impl Into<String>, category: impl Into<String>, position: u32) -> Self {
        Self {
            href: href.into(),
            category: Some(category.into()),
            position: Some(position),
        }
    }
}

/// Canonical, source-agnostic company record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub tax_id: Option<String>,
    pub name: String,
    pub revenue: Option<u64>,
    pub revenue_year: i32,
    pub segment_tags: SegmentSet,
    pub industry_code: Option<String>,
    pub region: Option<String>,
    pub address: Option<String>,
    pub site: Option<String>,
    pub contacts: Option<String>,
    pub description: Option<String>,
    pub employees: Option<u32>,
    pub source: SourceKind,
    pub rating_ref: Option<String>,
    pub category: Option<String>,
    pub rating_position: Option<u32>,
    pub rating_category: Option<String>,
}

impl CompanyRecord {
    /// Start a record with only the mandatory fields set.
    pub fn new(name: impl Into<String>, source: SourceKind, revenue_year: i32) -> Self {
        Self {
            tax_id: None,
            name: name.into(),
            revenue: None,
            revenue_year,
            segment_tags: SegmentSet::new(),
            industry_code: None,
            region: None,
            address: None,
            site: None,
            contacts: None,
            description: None,
            employees: None,
            source,
            rating_ref: None,
            category: None,
            rating_position: None,
            rating_category: None,
        }
    }

    /// Lowercased name + description (+ category) used by keyword rules.
    pub fn profile_text(&self) -> String {
        let mut text = self.name.to_lowercase();
        for extra in [&self.description, &self.category].into_iter().flatten() {
            text.push(' ');
            text.push_str(&extra.to_lowercase());
        }
        text
    }

    /// Flatten into column → cell; absent optional fields are omitted.
    pub fn to_row(&self) -> BTreeMap<&'static str, String> {
        let mut row = BTreeMap::new();
        row.insert("name", self.name.clone());
        row.insert("revenue_year", self.revenue_year.to_string());
        row.insert("segment_tag", self.segment_tags.to_pipe_string());
        row.insert("source", self.source.to_string());

        let optional: [(&'static str, Option<String>); 13] = [
            ("tax_id", self.tax_id.clone()),
            ("revenue", self.revenue.map(|v| v.to_string())),
            ("industry_code", self.industry_code.clone()),
            ("region", self.region.clone()),
            ("address", self.address.clone()),
            ("site", self.site.clone()),
            ("contacts", self.contacts.clone()),
            ("description", self.description.clone()),
            ("employees", self.employees.map(|v| v.to_string())),
            ("rating_ref", self.rating_ref.clone()),
            ("category", self.category.clone()),
            ("rating_position", self.rating_position.map(|v| v.to_string())),
            ("rating_category", self.rating_category.clone()),
        ];
        for (column, value) in optional {
            if let Some(value) = value {
                row.insert(column, value);
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_set_other_is_exclusive() {
        let mut set = SegmentSet::other();
        set.insert(SegmentTag::Btl);
        assert!(!set.contains(SegmentTag::Other));
        set.insert(SegmentTag::Other);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_segment_set_pipe_string_sorted() {
        let set: SegmentSet = [SegmentTag::Souvenir, SegmentTag::Btl, SegmentTag::CommGroup]
            .into_iter()
            .collect();
        assert_eq!(set.to_pipe_string(), "BTL|COMM_GROUP|SOUVENIR");
        assert_eq!(SegmentSet::new().to_pipe_string(), "OTHER");
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("ruward".parse::<SourceKind>().unwrap(), SourceKind::Ruward);
        assert_eq!(" LIST_ORG ".parse::<SourceKind>().unwrap(), SourceKind::ListOrg);
        assert!("yandex".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_to_row_omits_absent_fields() {
        let mut record = CompanyRecord::new("Acme", SourceKind::ListOrg, 2023);
        record.revenue = Some(250_000_000);
        let row = record.to_row();
        assert_eq!(row.get("revenue").map(String::as_str), Some("250000000"));
        assert_eq!(row.get("segment_tag").map(String::as_str), Some("OTHER"));
        assert!(!row.contains_key("tax_id"));
        assert!(!row.contains_key("rating_position"));
    }

    #[test]
    fn test_profile_text_includes_category() {
        let mut record = CompanyRecord::new("AGIMA", SourceKind::Ruward, 2024);
        record.category = Some("Digital-агентство".into());
        assert_eq!(record.profile_text(), "agima digital-агентство");
    }
}
