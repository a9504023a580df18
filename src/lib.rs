//! Alignment Report Library
//!
//! Turns Pandora alignment log files into good-scan quality statistics.
//!
//! This library provides tools for:
//! - Splitting alignment logs into header metadata and a tokenized data block
//! - Detecting single- and dual-instrument layouts and loading typed records
//! - Classifying scans against the file-wide average weighting factor
//! - Aggregating good-scan percentages per month and per day in a date window
//! - Exporting summary tables to CSV or Parquet and drawing terminal bar charts
//!
//! ```no_run
//! use alignment_report::{AlignmentLog, ReportConfig};
//!
//! let log = AlignmentLog::from_path(std::path::Path::new("alignment.txt"))?;
//! let report = log.report(&ReportConfig::default().with_threshold(25))?;
//!
//! for (bucket, status) in report.monthly_statuses() {
//!     println!("{} {:.1}% {:?}", bucket.label(), bucket.good_scan_percentage, status);
//! }
//! # Ok::<(), alignment_report::AlignmentError>(())
//! ```

pub mod aggregator;
pub mod chart;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod header;
pub mod loader;
pub mod models;
pub mod report;

pub use config::{ExportConfig, ExportFormat, ReportConfig};
pub use error::{AlignmentError, Result};
pub use models::{
    AlignmentRecord, ClassifiedRecord, DailyBucket, DailySummary, DateRange, MonthlyBucket,
    SchemaVariant, ThresholdStatus,
};
pub use report::{AlignmentLog, AlignmentReport};
