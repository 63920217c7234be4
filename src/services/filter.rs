// src/services/filter.rs

//! Relevance filter: identity, revenue floor and profile.

use std::fmt;

use crate::error::Result;
use crate::models::{CompanyRecord, FilterConfig, RuleTable, Vocabulary};
use crate::services::identity::{has_identity, is_valid_tax_id};

/// Why a record was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingName,
    MissingIdentity,
    RevenueMissing,
    RevenueBelowFloor { revenue: u64, floor: u64 },
    IrrelevantProfile,
    MissingSite,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingName => f.write_str("no name"),
            RejectReason::MissingIdentity => f.write_str("no valid tax ID or name+site"),
            RejectReason::RevenueMissing => f.write_str("revenue unknown"),
            RejectReason::RevenueBelowFloor { revenue, floor } => {
                write!(f, "revenue {revenue} below floor {floor}")
            }
            RejectReason::IrrelevantProfile => f.write_str("profile not relevant"),
            RejectReason::MissingSite => f.write_str("no http(s) site"),
        }
    }
}

/// Outcome of filtering one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Shared business-relevance rules.
pub struct RelevanceFilter {
    floors: FilterConfig,
    profile_keywords: Vocabulary,
    profile_codes: Vec<String>,
    national_indicators: Vocabulary,
}

impl RelevanceFilter {
    pub fn new(rules: &RuleTable, floors: &FilterConfig) -> Result<Self> {
        Ok(Self {
            floors: floors.clone(),
            profile_keywords: Vocabulary::compile(&rules.profile_keywords)?,
            profile_codes: rules.profile_codes.clone(),
            national_indicators: Vocabulary::compile(&rules.national_indicators)?,
        })
    }

    /// Full verdict. Checks run in a fixed order and the first failure wins.
    pub fn evaluate(&self, record: &CompanyRecord) -> Verdict {
        if record.name.trim().is_empty() {
            return Verdict::Reject(RejectReason::MissingName);
        }
        if !has_identity(record) {
            return Verdict::Reject(RejectReason::MissingIdentity);
        }
        if !self.has_domestic_markers(record) {
            log::debug!("No domestic markers for {}, accepting anyway", record.name);
        }
        if let Err(reason) = self.check_revenue(record) {
            return Verdict::Reject(reason);
        }
        if !self.is_relevant_profile(record) {
            return Verdict::Reject(RejectReason::IrrelevantProfile);
        }
        if record.source.is_ratings() && !has_http_site(record) {
            return Verdict::Reject(RejectReason::MissingSite);
        }
        Verdict::Accept
    }

    pub fn is_relevant(&self, record: &CompanyRecord) -> bool {
        self.evaluate(record).is_accept()
    }

    /// Whether a valid tax ID or a domestic-looking region/address is
    /// present. Informational only: foreign companies are not rejected.
    pub fn has_domestic_markers(&self, record: &CompanyRecord) -> bool {
        if record.tax_id.as_deref().is_some_and(is_valid_tax_id) {
            return true;
        }
        let location = [&record.region, &record.address]
            .into_iter()
            .flatten()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        self.national_indicators.matches(&location)
    }

    fn check_revenue(&self, record: &CompanyRecord) -> std::result::Result<(), RejectReason> {
        let floor = self.floors.floor_for(record.source);
        match record.revenue {
            None => Err(RejectReason::RevenueMissing),
            Some(revenue) if revenue < floor => {
                Err(RejectReason::RevenueBelowFloor { revenue, floor })
            }
            Some(_) => Ok(()),
        }
    }

    /// Keyword match on name + description (+ category), or an allow-listed
    /// industry code prefix.
    pub fn is_relevant_profile(&self, record: &CompanyRecord) -> bool {
        if let Some(term) = self.profile_keywords.find(&record.profile_text()) {
            log::trace!("{} matches profile term '{}'", record.name, term);
            return true;
        }
        record.industry_code.as_deref().is_some_and(|code| {
            self.profile_codes
                .iter()
                .any(|prefix| code.starts_with(prefix.as_str()))
        })
    }
}

fn has_http_site(record: &CompanyRecord) -> bool {
    record
        .site
        .as_deref()
        .is_some_and(|s| s.starts_with("http://") || s.starts_with("https://"))
}
