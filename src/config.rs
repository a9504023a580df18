//! Report configuration and validation.
//!
//! Threshold and date range are explicit parameters of each report rather
//! than shared state, so one configuration can be reused across files.

use crate::constants::{
    DAILY_EXPORT_STEM, DEFAULT_THRESHOLD_PERCENT, MAX_THRESHOLD_PERCENT, MONTHLY_EXPORT_STEM,
};
use crate::error::{AlignmentError, Result};
use crate::models::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parameters for one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Good-scan threshold in percent (0-100); buckets below it fail
    pub threshold_percent: u32,

    /// First day of the daily window; defaults to the earliest observed date
    pub start: Option<NaiveDate>,

    /// Last day of the daily window; defaults to the latest observed date
    pub end: Option<NaiveDate>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            start: None,
            end: None,
        }
    }
}

impl ReportConfig {
    pub fn with_threshold(mut self, threshold_percent: u32) -> Self {
        self.threshold_percent = threshold_percent;
        self
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// Set both ends of the daily window
    pub fn with_range(self, range: DateRange) -> Self {
        self.with_start(range.start).with_end(range.end)
    }

    /// Check parameters that can be validated without looking at data
    pub fn validate(&self) -> Result<()> {
        if self.threshold_percent > MAX_THRESHOLD_PERCENT {
            return Err(AlignmentError::InvalidThreshold {
                value: self.threshold_percent,
            });
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(AlignmentError::InvalidDateRange {
                    start,
                    end,
                    reason: "start date is after end date".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Resolve the daily window against the observed date span
    ///
    /// Unset ends default to the observed bounds. The resolved window must lie
    /// within the observed span.
    pub fn resolve_range(&self, observed: DateRange) -> Result<DateRange> {
        let start = self.start.unwrap_or(observed.start);
        let end = self.end.unwrap_or(observed.end);

        let range = DateRange::new(start, end).ok_or_else(|| AlignmentError::InvalidDateRange {
            start,
            end,
            reason: "start date is after end date".to_string(),
        })?;

        if !range.is_within(&observed) {
            return Err(AlignmentError::InvalidDateRange {
                start,
                end,
                reason: format!("data only covers {}", observed),
            });
        }

        Ok(range)
    }
}

/// Tabular export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Parquet,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Parquet => "parquet",
        }
    }
}

/// Where and how summary tables are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub format: ExportFormat,
}

impl ExportConfig {
    pub fn new(output_dir: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    pub fn monthly_path(&self) -> PathBuf {
        self.path_for(MONTHLY_EXPORT_STEM)
    }

    pub fn daily_path(&self) -> PathBuf {
        self.path_for(DAILY_EXPORT_STEM)
    }

    fn path_for(&self, stem: &str) -> PathBuf {
        Path::new(&self.output_dir).join(format!("{}.{}", stem, self.format.extension()))
    }
}
