//! In-memory CSV document: ordered headers plus header-keyed rows.
//!
//! Headers are kept exactly as uploaded (empty names and duplicates
//! included). Rows are addressed only by position.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// One table row: header → cell text.
pub type CsvRow = HashMap<String, String>;

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("static regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsvDocument {
    /// Original file name (display + export name)
    pub name: String,
    /// Size of the uploaded file in bytes
    pub size: usize,
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvDocument {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<CsvRow>) -> Self {
        Self { name: name.into(), size: 0, headers, rows }
    }

    /// Parse CSV text with a header row.
    ///
    /// Lines whose cells are all blank are skipped. Short records are padded
    /// with empty strings, so every row carries a value for every header.
    pub fn parse(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let mut row = CsvRow::with_capacity(headers.len());
            for (i, header) in headers.iter().enumerate() {
                row.insert(header.clone(), record.get(i).unwrap_or("").to_string());
            }
            rows.push(row);
        }

        let name = name.into();
        debug!("Parsed {}: {} columns, {} rows", name, headers.len(), rows.len());

        Ok(Self { name, size: bytes.len(), headers, rows })
    }

    /// Serialize headers and rows back to CSV text.
    pub fn to_csv(&self) -> Result<String> {
        write_csv(&self.headers, self.rows.iter().map(|r| {
            self.headers
                .iter()
                .map(move |h| r.get(h).map(String::as_str).unwrap_or(""))
        }))
    }

    /// A row with an empty value for every header.
    pub fn empty_row(&self) -> CsvRow {
        self.headers.iter().map(|h| (h.clone(), String::new())).collect()
    }

    pub fn cell(&self, row: usize, header: &str) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(header))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    /// Download file name for the edited table: unsafe path characters
    /// replaced, `data` when the name is blank.
    pub fn export_file_name(&self) -> String {
        let trimmed = self.name.trim();
        let stem = trimmed.strip_suffix(".csv").unwrap_or(trimmed);
        let stem = if stem.is_empty() { "data" } else { stem };
        format!("{}.csv", UNSAFE_FILE_CHARS.replace_all(stem, "_"))
    }
}

/// Write a header line plus records with the `csv` crate's standard quoting.
pub fn write_csv<'a, R, C>(headers: &[String], records: R) -> Result<String>
where
    R: IntoIterator<Item = C>,
    C: IntoIterator<Item = &'a str>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for record in records {
        writer.write_record(record)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|_| crate::HermesError::Encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_keeps_header_order_and_blank_names() {
        let doc = CsvDocument::parse("k.csv", b",orb_period,ra\n1,10.5,290\n").unwrap();
        assert_eq!(doc.headers, vec!["", "orb_period", "ra"]);
        assert_eq!(doc.rows.len(), 1);
        assert_eq!(doc.cell(0, ""), "1");
        assert_eq!(doc.cell(0, "orb_period"), "10.5");
        assert_eq!(doc.size, 26);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_pads_short_rows() {
        let doc = CsvDocument::parse("k.csv", b"a,b,c\n1,2,3\n,,\n\n4\n").unwrap();
        assert_eq!(doc.rows.len(), 2);
        assert_eq!(doc.cell(1, "a"), "4");
        assert_eq!(doc.cell(1, "c"), "");
    }

    #[test]
    fn test_export_then_parse_round_trip() {
        let src = "orb_period,label,note\n10,CONFIRMED,\"a, b\"\n-0.5,,\"say \"\"hi\"\"\"\n";
        let doc = CsvDocument::parse("t.csv", src.as_bytes()).unwrap();
        let exported = doc.to_csv().unwrap();
        let again = CsvDocument::parse("t.csv", exported.as_bytes()).unwrap();
        assert_eq!(again.headers, doc.headers);
        assert_eq!(again.rows, doc.rows);
        assert_eq!(again.cell(1, "note"), "say \"hi\"");
    }

    #[test]
    fn test_empty_row_has_every_header() {
        let doc = CsvDocument::new("x", vec!["a".into(), "b".into()], vec![]);
        let row = doc.empty_row();
        assert_eq!(row.len(), 2);
        assert!(row.values().all(String::is_empty));
    }

    #[test]
    fn test_export_file_name_sanitized() {
        let mut doc = CsvDocument::new("my:data?.csv", vec![], vec![]);
        assert_eq!(doc.export_file_name(), "my_data_.csv");
        doc.name = "   ".into();
        assert_eq!(doc.export_file_name(), "data.csv");
        doc.name = "kepler".into();
        assert_eq!(doc.export_file_name(), "kepler.csv");
    }
}
