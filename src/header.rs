//! Alignment file section splitting and tokenization.
//!
//! An alignment log opens with a free-form header region delimited by lines
//! of dashes. Everything after the second separator line is the data block:
//! one whitespace-delimited record per non-blank line.

use crate::constants::{SEPARATORS_BEFORE_DATA, SEPARATOR_MIN_DASHES};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("-{{{},}}", SEPARATOR_MIN_DASHES)).expect("separator pattern is valid")
});

/// Metadata gathered from the header region
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileHeader {
    /// `Key: value` lines seen before the data block, in file order
    pub metadata: Vec<(String, String)>,
    /// Number of lines preceding the first data line (separators included)
    pub header_lines: usize,
    /// Number of separator lines encountered in the whole file
    pub separators_seen: usize,
}

impl FileHeader {
    /// Look up a metadata value by key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// One tokenized data line
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    /// 1-based line number in the source text
    pub line_number: usize,
    pub tokens: Vec<String>,
}

/// Header metadata plus the tokenized data block, in file order
#[derive(Debug, Clone, Default)]
pub struct DataBlock {
    pub header: FileHeader,
    pub rows: Vec<DataRow>,
}

impl DataBlock {
    /// True when no data line followed the second separator
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Check whether a line is a section separator
pub fn is_separator(line: &str) -> bool {
    SEPARATOR.is_match(line)
}

/// Split raw file content into header metadata and tokenized data rows
///
/// Never fails: an empty data block is returned as such and the caller
/// decides whether that halts processing.
pub fn parse_data_block(content: &str) -> DataBlock {
    let mut header = FileHeader::default();
    let mut rows = Vec::new();

    for (index, line) in content.lines().enumerate() {
        if is_separator(line) {
            header.separators_seen += 1;
            if header.separators_seen <= SEPARATORS_BEFORE_DATA {
                header.header_lines = index + 1;
            }
            continue;
        }

        if header.separators_seen < SEPARATORS_BEFORE_DATA {
            header.header_lines = index + 1;
            if let Some((key, value)) = parse_metadata_line(line) {
                header.metadata.push((key, value));
            }
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        rows.push(DataRow {
            line_number: index + 1,
            tokens: trimmed.split_whitespace().map(str::to_string).collect(),
        });
    }

    debug!(
        "Split alignment file: {} header lines, {} metadata entries, {} separators, {} data rows",
        header.header_lines,
        header.metadata.len(),
        header.separators_seen,
        rows.len()
    );

    DataBlock { header, rows }
}

/// Parse a `Key: value` header line
fn parse_metadata_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}
