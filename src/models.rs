//! Core data structures for alignment processing.
//!
//! Defines the two field layouts, typed alignment records, classified
//! records, and the monthly/daily summary types returned to callers.

use crate::constants::{
    DUAL_INSTRUMENT_COLUMNS, DUAL_INSTRUMENT_FIELDS, SINGLE_INSTRUMENT_COLUMNS,
    SINGLE_INSTRUMENT_FIELDS,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field layouts observed in alignment logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    SingleInstrument,
    DualInstrument,
}

impl SchemaVariant {
    /// Detect the layout from a data line's token count
    pub fn from_token_count(count: usize) -> Option<Self> {
        match count {
            SINGLE_INSTRUMENT_FIELDS => Some(SchemaVariant::SingleInstrument),
            DUAL_INSTRUMENT_FIELDS => Some(SchemaVariant::DualInstrument),
            _ => None,
        }
    }

    /// Get the token count of a data line in this layout
    pub fn field_count(&self) -> usize {
        match self {
            SchemaVariant::SingleInstrument => SINGLE_INSTRUMENT_FIELDS,
            SchemaVariant::DualInstrument => DUAL_INSTRUMENT_FIELDS,
        }
    }

    pub fn column_names(&self) -> &'static [&'static str] {
        match self {
            SchemaVariant::SingleInstrument => SINGLE_INSTRUMENT_COLUMNS,
            SchemaVariant::DualInstrument => DUAL_INSTRUMENT_COLUMNS,
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVariant::SingleInstrument => write!(f, "single-instrument"),
            SchemaVariant::DualInstrument => write!(f, "dual-instrument"),
        }
    }
}

/// Fields shared by every record regardless of layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pointing {
    /// UT time of the alignment; `None` when the token could not be parsed
    pub timestamp: Option<DateTime<Utc>>,
    pub routine_code: String,
    pub true_zenith: Option<f64>,
    pub true_azimuth: Option<f64>,
}

/// Field-of-view fit result for one instrument
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstrumentFit {
    pub apparent_zenith: Option<f64>,
    pub apparent_azimuth: Option<f64>,
    pub fit_rms: Option<f64>,
    pub weighting_factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleInstrumentRecord {
    pub pointing: Pointing,
    pub fit: InstrumentFit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualInstrumentRecord {
    pub pointing: Pointing,
    pub instrument_1: InstrumentFit,
    pub instrument_2: InstrumentFit,
}

/// One typed data line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum AlignmentRecord {
    Single(SingleInstrumentRecord),
    Dual(DualInstrumentRecord),
}

impl AlignmentRecord {
    pub fn pointing(&self) -> &Pointing {
        match self {
            AlignmentRecord::Single(record) => &record.pointing,
            AlignmentRecord::Dual(record) => &record.pointing,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.pointing().timestamp
    }

    /// Calendar date of the timestamp
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp().map(|ts| ts.date_naive())
    }

    /// (year, month) of the timestamp
    pub fn year_month(&self) -> Option<(i32, u32)> {
        self.timestamp().map(|ts| (ts.year(), ts.month()))
    }

    /// Combined weighting factor used for classification
    ///
    /// Dual-instrument records use the mean of both instruments and are null
    /// when either instrument's value is null.
    pub fn weighting_factor(&self) -> Option<f64> {
        match self {
            AlignmentRecord::Single(record) => record.fit.weighting_factor,
            AlignmentRecord::Dual(record) => {
                match (
                    record.instrument_1.weighting_factor,
                    record.instrument_2.weighting_factor,
                ) {
                    (Some(first), Some(second)) => Some((first + second) / 2.0),
                    _ => None,
                }
            }
        }
    }

    pub fn variant(&self) -> SchemaVariant {
        match self {
            AlignmentRecord::Single(_) => SchemaVariant::SingleInstrument,
            AlignmentRecord::Dual(_) => SchemaVariant::DualInstrument,
        }
    }
}

/// A record with its good-scan flag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    pub record: AlignmentRecord,
    pub good_scan: bool,
}

/// Good-scan percentage for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    pub good_scan_percentage: f64,
    pub records: usize,
    pub good_scans: usize,
}

impl MonthlyBucket {
    /// Chart label in `YYYY-M` form
    pub fn label(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }
}

/// Good-scan percentage for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub good_scan_percentage: f64,
    pub records: usize,
    pub good_scans: usize,
}

impl DailyBucket {
    pub fn label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Inclusive calendar-date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range; returns `None` when `start` is after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Check whether this range lies entirely within `outer`
    pub fn is_within(&self, outer: &DateRange) -> bool {
        outer.contains(self.start) && outer.contains(self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Outcome of the daily aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DailySummary {
    /// No record carries a valid timestamp, so no range can be offered
    NoValidDates,
    /// The range matched no records
    NoDataInRange { range: DateRange },
    /// One bucket per date in range with at least one record
    Buckets {
        range: DateRange,
        buckets: Vec<DailyBucket>,
    },
}

impl DailySummary {
    pub fn buckets(&self) -> &[DailyBucket] {
        match self {
            DailySummary::Buckets { buckets, .. } => buckets,
            _ => &[],
        }
    }

    pub fn range(&self) -> Option<DateRange> {
        match self {
            DailySummary::NoValidDates => None,
            DailySummary::NoDataInRange { range } | DailySummary::Buckets { range, .. } => {
                Some(*range)
            }
        }
    }
}

/// Pass/fail status of a bucket against the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStatus {
    /// At or above the threshold (green)
    Pass,
    /// Below the threshold (red)
    Fail,
}

impl ThresholdStatus {
    pub fn classify(percentage: f64, threshold: u32) -> Self {
        if percentage < f64::from(threshold) {
            ThresholdStatus::Fail
        } else {
            ThresholdStatus::Pass
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, ThresholdStatus::Pass)
    }
}
