//! End-to-end report pipeline.
//!
//! [`AlignmentLog`] holds one file parsed, typed and classified. Reports for
//! different thresholds or date windows are produced from it without
//! re-reading the file; a new file always yields a fresh `AlignmentLog`.

use crate::aggregator::{daily_summary, monthly_summary, observed_date_span};
use crate::classifier::{ClassifiedTable, classify};
use crate::config::ReportConfig;
use crate::error::{AlignmentError, Result};
use crate::header::{FileHeader, parse_data_block};
use crate::loader::{LoadStats, load_records};
use crate::models::{
    ClassifiedRecord, DailyBucket, DailySummary, DateRange, MonthlyBucket, SchemaVariant,
    ThresholdStatus,
};
use serde::Serialize;
use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A parsed and classified alignment file
#[derive(Debug, Clone)]
pub struct AlignmentLog {
    header: FileHeader,
    variant: SchemaVariant,
    load_stats: LoadStats,
    table: ClassifiedTable,
    observed_range: Option<DateRange>,
}

impl AlignmentLog {
    /// Parse raw file bytes
    ///
    /// Fails only when the data block is empty or its first line has an
    /// unrecognized field count.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let start_time = Instant::now();

        let content = String::from_utf8_lossy(bytes);
        if let Cow::Owned(_) = content {
            warn!("Input is not valid UTF-8; invalid sequences were replaced");
        }

        let block = parse_data_block(&content);
        if block.is_empty() {
            return Err(AlignmentError::EmptyInput {
                separators_seen: block.header.separators_seen,
            });
        }
        for (key, value) in &block.header.metadata {
            debug!("Header {}: {}", key, value);
        }

        let loaded = load_records(&block)?;
        let table = classify(loaded.records);
        let observed_range = observed_date_span(&table.records);

        match observed_range {
            Some(range) => info!("Observed dates: {}", range),
            None => warn!("No record has a valid timestamp; date-based summaries are empty"),
        }
        debug!(
            "Parsed alignment file in {}ms",
            start_time.elapsed().as_millis()
        );

        Ok(Self {
            header: block.header,
            variant: loaded.variant,
            load_stats: loaded.stats,
            table,
            observed_range,
        })
    }

    /// Read and parse a file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        info!("Read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(&bytes)
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    pub fn load_stats(&self) -> &LoadStats {
        &self.load_stats
    }

    pub fn records(&self) -> &[ClassifiedRecord] {
        &self.table.records
    }

    pub fn total_records(&self) -> usize {
        self.table.len()
    }

    pub fn average_weighting_factor(&self) -> Option<f64> {
        self.table.average_weighting_factor
    }

    /// Earliest and latest dates with data; `None` when no timestamp is valid
    pub fn observed_range(&self) -> Option<DateRange> {
        self.observed_range
    }

    /// Build the monthly and daily summaries for one configuration
    pub fn report(&self, config: &ReportConfig) -> Result<AlignmentReport> {
        config.validate()?;

        let monthly = monthly_summary(&self.table.records);
        let daily = match self.observed_range {
            Some(observed) => {
                let range = config.resolve_range(observed)?;
                daily_summary(&self.table.records, range)
            }
            None => DailySummary::NoValidDates,
        };

        Ok(AlignmentReport {
            header: self.header.clone(),
            variant: self.variant,
            total_records: self.table.len(),
            good_scans: self.table.good_scan_count(),
            average_weighting_factor: self.table.average_weighting_factor,
            load_stats: self.load_stats.clone(),
            threshold_percent: config.threshold_percent,
            observed_range: self.observed_range,
            monthly,
            daily,
        })
    }
}

/// Summary tables and diagnostics handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentReport {
    pub header: FileHeader,
    pub variant: SchemaVariant,
    pub total_records: usize,
    pub good_scans: usize,
    pub average_weighting_factor: Option<f64>,
    pub load_stats: LoadStats,
    pub threshold_percent: u32,
    pub observed_range: Option<DateRange>,
    pub monthly: Vec<MonthlyBucket>,
    pub daily: DailySummary,
}

impl AlignmentReport {
    /// Parse bytes and build a report in one step
    pub fn from_bytes(bytes: &[u8], config: &ReportConfig) -> Result<Self> {
        AlignmentLog::from_bytes(bytes)?.report(config)
    }

    /// Threshold status of every monthly bucket
    pub fn monthly_statuses(&self) -> Vec<(&MonthlyBucket, ThresholdStatus)> {
        self.monthly
            .iter()
            .map(|b| (b, ThresholdStatus::classify(b.good_scan_percentage, self.threshold_percent)))
            .collect()
    }

    /// Threshold status of every daily bucket
    pub fn daily_statuses(&self) -> Vec<(&DailyBucket, ThresholdStatus)> {
        self.daily
            .buckets()
            .iter()
            .map(|b| (b, ThresholdStatus::classify(b.good_scan_percentage, self.threshold_percent)))
            .collect()
    }

    /// Number of months below the threshold
    pub fn failing_months(&self) -> usize {
        self.monthly_statuses()
            .iter()
            .filter(|(_, status)| !status.is_pass())
            .count()
    }
}
