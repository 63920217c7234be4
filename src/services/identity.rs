// src/services/identity.rs

//! Company identity: tax ID validation and dedup keys.

use sha2::{Digest, Sha256};

use crate::models::CompanyRecord;

/// True iff `identifier` is all ASCII digits and exactly 10 or 12 long.
pub fn is_valid_tax_id(identifier: &str) -> bool {
    matches!(identifier.len(), 10 | 12) && identifier.bytes().all(|b| b.is_ascii_digit())
}

/// Short stable hash of a name + site pair.
pub fn synthetic_id(name: &str, site: &str) -> String {
    let digest = Sha256::digest(format!("{}_{}", name.trim(), site.trim()).as_bytes());
    hex::encode(digest)[..10].to_string()
}

/// Key under which a record is deduplicated.
///
/// Valid tax IDs win. Ratings records without one fall back to a hash of
/// name + site; anything else is keyed by a hash of its full field set.
pub fn dedup_key(record: &CompanyRecord) -> String {
    if let Some(tax_id) = record.tax_id.as_deref().filter(|t| is_valid_tax_id(t)) {
        return format!("inn_{tax_id}");
    }

    if record.source.is_ratings() {
        if let Some(site) = record.site.as_deref().filter(|s| !s.is_empty()) {
            return format!("ruward_{}", synthetic_id(&record.name, site));
        }
    }

    let fields = serde_json::to_string(record).unwrap_or_else(|_| format!("{record:?}"));
    let digest = Sha256::digest(fields.as_bytes());
    format!("record_{}", &hex::encode(digest)[..16])
}

/// Ratings records may stand in for a tax ID with a name + site pair.
pub fn has_identity(record: &CompanyRecord) -> bool {
    if record.tax_id.as_deref().is_some_and(is_valid_tax_id) {
        return true;
    }
    record.source.is_ratings()
        && !record.name.trim().is_empty()
        && record
            .site
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    #[test]
    fn test_valid_tax_ids() {
        assert!(is_valid_tax_id("7701234567"));
        assert!(is_valid_tax_id("770123456789"));
    }

    #[test]
    fn test_invalid_tax_ids() {
        assert!(!is_valid_tax_id(""));
        assert!(!is_valid_tax_id("123456789"));
        assert!(!is_valid_tax_id("12345678901"));
        assert!(!is_valid_tax_id("1234567890123"));
        assert!(!is_valid_tax_id("77012345a7"));
        assert!(!is_valid_tax_id(" 7701234567"));
        assert!(!is_valid_tax_id("７７０１２３４５６７"));
    }

    #[test]
    fn test_dedup_key_prefers_tax_id() {
        let mut record = CompanyRecord::new("Acme", SourceKind::Ruward, 2024);
        record.tax_id = Some("7701234567".into());
        record.site = Some("http://acme.example".into());
        assert_eq!(dedup_key(&record), "inn_7701234567");
    }

    #[test]
    fn test_ratings_synthetic_identity() {
        let mut a = CompanyRecord::new("Acme", SourceKind::Ruward, 2024);
        a.site = Some("http://acme.example".into());
        let mut b = a.clone();
        b.description = Some("different".into());
        assert!(has_identity(&a));
        assert_eq!(dedup_key(&a), dedup_key(&b));
        assert!(dedup_key(&a).starts_with("ruward_"));
    }

    #[test]
    fn test_directory_record_without_tax_id_has_no_identity() {
        let mut record = CompanyRecord::new("Acme", SourceKind::ListOrg, 2023);
        record.site = Some("http://acme.example".into());
        assert!(!has_identity(&record));
        assert!(dedup_key(&record).starts_with("record_"));
    }
}
