// src/storage/mod.rs

//! Export of collected company records.
//!
//! Records are written as spreadsheet-friendly CSV tables:
//!
//! ```text
//! data/
//! ├── companies.csv              # merged, deduplicated across sources
//! ├── list_org_companies.csv     # one table per source (optional)
//! ├── ruward_companies.csv
//! └── detailed_report.txt        # per-company text report (optional)
//! ```

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::CompanyRecord;

pub use local::LocalStorage;

/// Columns every table starts with, in this order.
pub const FIXED_COLUMNS: [&str; 13] = [
    "tax_id",
    "name",
    "revenue_year",
    "revenue",
    "segment_tag",
    "source",
    "industry_code",
    "employees",
    "site",
    "description",
    "region",
    "contacts",
    "rating_ref",
];

/// Columns whose cells must be a number or blank.
pub const NUMERIC_COLUMNS: [&str; 4] = ["revenue_year", "revenue", "employees", "rating_position"];

/// Metadata about one written table.
#[derive(Debug, Clone)]
pub struct ExportMetadata {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// A table read back from storage.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column(column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }
}

/// Trait for record storage backends.
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Write `records` as one table under `name`, replacing any previous one.
    async fn write_records(&self, name: &str, records: &[CompanyRecord])
    -> Result<ExportMetadata>;

    /// Write a plain-text document under `name`, replacing any previous one.
    async fn write_text(&self, name: &str, text: &str) -> Result<PathBuf>;

    /// Read a table previously written under `name`.
    async fn read_table(&self, name: &str) -> Result<Option<Table>>;
}
