// src/storage/local.rs

//! Local filesystem storage: CSV tables with a UTF-8 byte-order mark.
//!
//! Columns are the fixed set first, then any other field present in at
//! least one record, alphabetically. Files are written atomically.

use std::collections::BTreeSet;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::CompanyRecord;
use crate::storage::{ExportMetadata, FIXED_COLUMNS, NUMERIC_COLUMNS, RecordStorage, Table};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

/// Fixed columns, then every other present column alphabetically.
pub fn columns_for(records: &[CompanyRecord]) -> Vec<String> {
    let extra: BTreeSet<&'static str> = records
        .iter()
        .flat_map(|r| r.to_row().into_keys())
        .filter(|column| !FIXED_COLUMNS.contains(column))
        .collect();

    FIXED_COLUMNS
        .iter()
        .chain(extra.iter())
        .map(|c| c.to_string())
        .collect()
}

/// A whole number, or blank if the cell does not parse.
fn coerce_numeric(value: &str) -> String {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n.to_string();
    }
    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(n) if n.is_finite() => format!("{}", n.round() as i64),
        _ => String::new(),
    }
}

/// Render records as CSV with a leading byte-order mark.
pub fn encode_csv(records: &[CompanyRecord]) -> Result<(Vec<String>, Vec<u8>)> {
    let columns = columns_for(records);
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(&columns)?;

    for record in records {
        let mut row = record.to_row();
        let cells: Vec<String> = columns
            .iter()
            .map(|column| {
                let value = row.remove(column.as_str()).unwrap_or_default();
                if NUMERIC_COLUMNS.contains(&column.as_str()) {
                    coerce_numeric(&value)
                } else {
                    value
                }
            })
            .collect();
        writer.write_record(&cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))?;
    Ok((columns, bytes))
}

fn decode_csv(bytes: &[u8]) -> Result<Table> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::Reader::from_reader(body);
    let columns = reader.headers()?.iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|row| row.map(|r| r.iter().map(String::from).collect()))
        .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;
    Ok(Table { columns, rows })
}

#[async_trait]
impl RecordStorage for LocalStorage {
    async fn write_records(
        &self,
        name: &str,
        records: &[CompanyRecord],
    ) -> Result<ExportMetadata> {
        let (columns, bytes) = encode_csv(records)?;
        let path = self.write_bytes(name, &bytes).await?;
        log::info!("Wrote {} records to {}", records.len(), path.display());

        Ok(ExportMetadata {
            path,
            rows: records.len(),
            columns,
            timestamp: Utc::now(),
        })
    }

    async fn write_text(&self, name: &str, text: &str) -> Result<PathBuf> {
        let path = self.write_bytes(name, text.as_bytes()).await?;
        log::info!("Wrote {}", path.display());
        Ok(path)
    }

    async fn read_table(&self, name: &str) -> Result<Option<Table>> {
        match self.read_bytes(name).await? {
            Some(bytes) => Ok(Some(decode_csv(&bytes)?)),
            None => Ok(None),
        }
    }
}
