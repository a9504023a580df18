//! Error handling for alignment log processing.
//!
//! Only two conditions are fatal to a report: a data block whose first row
//! has an unrecognized field count, and a file with no data rows at all.
//! Everything else degrades to null fields or empty aggregates.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignmentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error(
        "Unrecognized alignment file format: first data line (line {line}) has {found} fields, expected 8 or 12"
    )]
    Format { found: usize, line: usize },

    #[error("No data found after the second separator line ({separators_seen} separator(s) seen)")]
    EmptyInput { separators_seen: usize },

    #[error("Threshold must be between 0 and 100 percent, got {value}")]
    InvalidThreshold { value: u32 },

    #[error("Invalid date range {start} to {end}: {reason}")]
    InvalidDateRange {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },

    #[error("Export failed for {path}: {reason}")]
    ExportFailed { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, AlignmentError>;
