//! Uploaded tabular data.
//!
//! Parses delimited text into a header + rows table and derives the textual
//! summary that is prefixed to prompts.

pub mod error;
pub mod stats;
pub mod summary;

pub use error::{TableError, TableResult};
pub use stats::{ColumnKind, ColumnStats};
pub use summary::TableSummary;

use std::cmp::Reverse;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

/// File extensions accepted for upload.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// Delimiters tried when sniffing the header line.
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// A parsed table: one header row and zero or more records of equal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse delimited text. The delimiter is guessed from the header line.
    ///
    /// # Errors
    /// Returns an error for empty input, invalid UTF-8, ragged rows, or a
    /// header with blank or duplicated names.
    pub fn parse(bytes: &[u8]) -> TableResult<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(TableError::Empty);
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(sniff_delimiter(bytes))
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        validate_headers(&headers)?;

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self { headers, rows })
    }

    /// Number of data rows (header excluded).
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Column names in file order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.headers
    }

    /// The first `limit` rows.
    #[must_use]
    pub fn preview(&self, limit: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(limit)]
    }

    /// Cells of one column, top to bottom.
    #[must_use]
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(index).map(String::as_str))
    }

    /// Descriptive statistics for every column.
    #[must_use]
    pub fn describe(&self) -> Vec<ColumnStats> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, name)| ColumnStats::compute(name, self.column(index)))
            .collect()
    }
}

/// Accept only file names with a delimited-text extension.
///
/// # Errors
/// Returns [`TableError::UnsupportedFile`] otherwise.
pub fn check_file_name(name: &str) -> TableResult<()> {
    let accepted = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        });

    if accepted {
        Ok(())
    } else {
        Err(TableError::UnsupportedFile(name.to_string()))
    }
}

fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let mut counts = [0_usize; CANDIDATE_DELIMITERS.len()];
    let mut quoted = false;
    for byte in header_line {
        if *byte == b'"' {
            quoted = !quoted;
            continue;
        }
        if quoted {
            continue;
        }
        if let Some(slot) = CANDIDATE_DELIMITERS.iter().position(|d| d == byte) {
            counts[slot] += 1;
        }
    }

    // Ties go to the earliest candidate, so comma wins by default.
    CANDIDATE_DELIMITERS
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .min_by_key(|(_, count)| Reverse(*count))
        .map_or(b',', |(d, _)| *d)
}

fn validate_headers(headers: &[String]) -> TableResult<()> {
    if headers.is_empty() {
        return Err(TableError::Empty);
    }
    for (index, name) in headers.iter().enumerate() {
        if name.is_empty() {
            return Err(TableError::InvalidHeader(format!(
                "column {} has no name",
                index + 1
            )));
        }
        if headers[..index].contains(name) {
            return Err(TableError::InvalidHeader(format!("duplicate column {name:?}")));
        }
    }
    Ok(())
}
