//! Tabular input/output.
//!
//! `RawTable` is whatever an export file contained; `CanonicalTable` is the
//! normalized ticket list. Both round-trip through CSV.

use crate::error::{DeskError, Result};
use crate::ticket::{columns, Ticket};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Headers plus string cells, exactly as exported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table, padding or truncating rows to the header width
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Read CSV, lower-casing headers as they arrive
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }
        Ok(Self::new(headers, rows))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| DeskError::read(path, e))?;
        let table = Self::from_reader(file)?;
        info!(
            "File read: {}. Dimensions: {} x {}",
            path.display(),
            table.headers.len(),
            table.len()
        );
        Ok(table)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush().map_err(|e| DeskError::Csv(e.into()))?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| DeskError::write(path, e))?;
        self.to_writer(file)?;
        info!("File was saved at {}", path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column with this exact header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// Normalized ticket list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalTable {
    pub tickets: Vec<Ticket>,
}

impl CanonicalTable {
    pub fn new(tickets: Vec<Ticket>) -> Self {
        Self { tickets }
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ticket> {
        self.tickets.iter()
    }

    /// Render back to cells under the canonical column names
    pub fn to_raw(&self) -> RawTable {
        let headers = columns::ALL.iter().map(|c| c.to_string()).collect();
        let rows = self
            .tickets
            .iter()
            .map(|t| columns::ALL.iter().map(|c| t.cell(c)).collect())
            .collect();
        RawTable::new(headers, rows)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.to_raw().save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_lowercases_headers_and_pads_rows() {
        let csv = "Issue Key,Priority,Status\nACME-1,High\nACME-2,Low,Open\n";
        let table = RawTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["issue key", "priority", "status"]);
        assert_eq!(table.rows[0], vec!["ACME-1", "High", ""]);
        assert_eq!(table.value(1, "status"), Some("Open"));
        assert_eq!(table.value(1, "missing"), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = RawTable::new(
            vec!["issue key".to_string(), "summary".to_string()],
            vec![vec!["ACME-1".to_string(), "Printer, jammed".to_string()]],
        );
        table.save(&path).unwrap();
        let loaded = RawTable::load(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_canonical_to_raw_uses_all_columns() {
        let table = CanonicalTable::new(vec![Ticket {
            issue_key: "ACME-7".to_string(),
            ..Default::default()
        }]);
        let raw = table.to_raw();
        assert_eq!(raw.headers.len(), columns::ALL.len());
        assert_eq!(raw.value(0, "issue key"), Some("ACME-7"));
        assert_eq!(raw.value(0, "resolution"), Some("Unknown"));
    }
}
