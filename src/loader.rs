//! Schema detection and typed record loading.
//!
//! The first data row decides the layout for the whole file. Later rows are
//! mapped positionally under that layout: missing positions become nulls and
//! surplus tokens are ignored. Unparsable numeric or timestamp tokens become
//! nulls without rejecting the row.

use crate::constants::{DATE_FORMATS, NAIVE_DATETIME_FORMATS, OFFSET_DATETIME_FORMATS};
use crate::error::{AlignmentError, Result};
use crate::header::{DataBlock, DataRow};
use crate::models::{
    AlignmentRecord, DualInstrumentRecord, InstrumentFit, Pointing, SchemaVariant,
    SingleInstrumentRecord,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counts of fields that were coerced to null while loading
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadStats {
    pub rows_loaded: usize,
    pub numeric_fields_coerced: usize,
    pub timestamps_coerced: usize,
    /// Rows whose token count differs from the detected layout
    pub misaligned_rows: usize,
}

impl LoadStats {
    pub fn total_coerced(&self) -> usize {
        self.numeric_fields_coerced + self.timestamps_coerced
    }
}

/// Typed records of one file together with their layout
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub variant: SchemaVariant,
    pub records: Vec<AlignmentRecord>,
    pub stats: LoadStats,
}

/// Detect the field layout from the first data row
pub fn detect_variant(block: &DataBlock) -> Result<SchemaVariant> {
    let first = block.rows.first().ok_or(AlignmentError::EmptyInput {
        separators_seen: block.header.separators_seen,
    })?;

    SchemaVariant::from_token_count(first.tokens.len()).ok_or(AlignmentError::Format {
        found: first.tokens.len(),
        line: first.line_number,
    })
}

/// Load every data row into a typed record
pub fn load_records(block: &DataBlock) -> Result<RecordTable> {
    let variant = detect_variant(block)?;
    let mut stats = LoadStats::default();
    let mut records = Vec::with_capacity(block.len());

    for row in &block.rows {
        if row.tokens.len() != variant.field_count() {
            stats.misaligned_rows += 1;
            debug!(
                "Line {} has {} fields but the file is {}; mapping positionally",
                row.line_number,
                row.tokens.len(),
                variant
            );
        }

        let mut fields = RowFields::new(row, &mut stats);
        let record = match variant {
            SchemaVariant::SingleInstrument => {
                let pointing = fields.pointing();
                let fit = fields.instrument_fit(4);
                AlignmentRecord::Single(SingleInstrumentRecord { pointing, fit })
            }
            SchemaVariant::DualInstrument => {
                let pointing = fields.pointing();
                let instrument_1 = fields.instrument_fit(4);
                let instrument_2 = fields.instrument_fit(8);
                AlignmentRecord::Dual(DualInstrumentRecord {
                    pointing,
                    instrument_1,
                    instrument_2,
                })
            }
        };
        records.push(record);
    }

    stats.rows_loaded = records.len();

    if stats.total_coerced() > 0 {
        warn!(
            "{} numeric field(s) and {} timestamp(s) could not be parsed and were left empty",
            stats.numeric_fields_coerced, stats.timestamps_coerced
        );
    }
    if stats.misaligned_rows > 0 {
        warn!(
            "{} row(s) do not match the {} layout detected from the first data line",
            stats.misaligned_rows, variant
        );
    }
    info!("Loaded {} {} records", records.len(), variant);
    debug!("Columns: {}", variant.column_names().join(", "));

    Ok(RecordTable {
        variant,
        records,
        stats,
    })
}

/// Positional field access over one row with coercion bookkeeping
struct RowFields<'a> {
    row: &'a DataRow,
    stats: &'a mut LoadStats,
}

impl<'a> RowFields<'a> {
    fn new(row: &'a DataRow, stats: &'a mut LoadStats) -> Self {
        Self { row, stats }
    }

    fn token(&self, index: usize) -> Option<&'a str> {
        let row: &'a DataRow = self.row;
        row.tokens.get(index).map(String::as_str)
    }

    fn pointing(&mut self) -> Pointing {
        Pointing {
            timestamp: self.timestamp(0),
            routine_code: self.token(1).unwrap_or_default().to_string(),
            true_zenith: self.number(2),
            true_azimuth: self.number(3),
        }
    }

    /// Read the four fit fields starting at `offset`
    fn instrument_fit(&mut self, offset: usize) -> InstrumentFit {
        InstrumentFit {
            apparent_zenith: self.number(offset),
            apparent_azimuth: self.number(offset + 1),
            fit_rms: self.number(offset + 2),
            weighting_factor: self.number(offset + 3),
        }
    }

    fn number(&mut self, index: usize) -> Option<f64> {
        let token = self.token(index);
        let value = token.and_then(parse_optional_f64);
        if value.is_none() {
            self.stats.numeric_fields_coerced += 1;
            debug!(
                "Line {} field {}: {:?} is not numeric",
                self.row.line_number,
                index + 1,
                token
            );
        }
        value
    }

    fn timestamp(&mut self, index: usize) -> Option<DateTime<Utc>> {
        let token = self.token(index);
        let value = token.and_then(parse_optional_timestamp);
        if value.is_none() {
            self.stats.timestamps_coerced += 1;
            debug!(
                "Line {}: {:?} is not a valid timestamp",
                self.row.line_number, token
            );
        }
        value
    }
}

/// Parse a numeric token, yielding `None` for anything non-numeric
///
/// NaN and infinite values are treated as missing. Tokens such as `inf` parse
/// as valid floats but still count as coerced fields here.
pub fn parse_optional_f64(token: &str) -> Option<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse an ISO-8601 style timestamp into UTC, yielding `None` on failure
pub fn parse_optional_timestamp(token: &str) -> Option<DateTime<Utc>> {
    let value = token.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = value
        .strip_suffix('Z')
        .or_else(|| value.strip_suffix('z'))
        .unwrap_or(value);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(naive, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}
