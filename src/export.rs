//! Tabular export of report summaries.
//!
//! Summary buckets are converted into polars DataFrames and written as CSV
//! or Parquet on request.

use crate::config::{ExportConfig, ExportFormat};
use crate::error::{AlignmentError, Result};
use crate::models::{DailyBucket, MonthlyBucket, ThresholdStatus};
use crate::report::AlignmentReport;
use polars::prelude::{
    CsvWriter, DataFrame, ParquetCompression, ParquetWriter as PolarsParquetWriter, SerWriter, df,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn status_label(percentage: f64, threshold_percent: u32) -> &'static str {
    match ThresholdStatus::classify(percentage, threshold_percent) {
        ThresholdStatus::Pass => "pass",
        ThresholdStatus::Fail => "fail",
    }
}

/// Monthly table: year, month, good-scan percentage, counts and threshold status
pub fn monthly_frame(buckets: &[MonthlyBucket], threshold_percent: u32) -> Result<DataFrame> {
    let years: Vec<i32> = buckets.iter().map(|b| b.year).collect();
    let months: Vec<u32> = buckets.iter().map(|b| b.month).collect();
    let percentages: Vec<f64> = buckets.iter().map(|b| b.good_scan_percentage).collect();
    let records: Vec<u64> = buckets.iter().map(|b| b.records as u64).collect();
    let good_scans: Vec<u64> = buckets.iter().map(|b| b.good_scans as u64).collect();
    let statuses: Vec<&str> = buckets
        .iter()
        .map(|b| status_label(b.good_scan_percentage, threshold_percent))
        .collect();

    let frame = df!(
        "Year" => years,
        "Month" => months,
        "Good Scan (%)" => percentages,
        "Records" => records,
        "Good Scans" => good_scans,
        "Status" => statuses
    )?;
    Ok(frame)
}

/// Daily table: date, good-scan percentage, counts and threshold status
pub fn daily_frame(buckets: &[DailyBucket], threshold_percent: u32) -> Result<DataFrame> {
    let dates: Vec<String> = buckets.iter().map(DailyBucket::label).collect();
    let percentages: Vec<f64> = buckets.iter().map(|b| b.good_scan_percentage).collect();
    let records: Vec<u64> = buckets.iter().map(|b| b.records as u64).collect();
    let good_scans: Vec<u64> = buckets.iter().map(|b| b.good_scans as u64).collect();
    let statuses: Vec<&str> = buckets
        .iter()
        .map(|b| status_label(b.good_scan_percentage, threshold_percent))
        .collect();

    let frame = df!(
        "Date" => dates,
        "Good Scan (%)" => percentages,
        "Records" => records,
        "Good Scans" => good_scans,
        "Status" => statuses
    )?;
    Ok(frame)
}

/// Write a DataFrame in the requested format
pub fn write_frame(frame: &mut DataFrame, path: &Path, format: ExportFormat) -> Result<()> {
    let mut file = File::create(path)?;
    match format {
        ExportFormat::Csv => {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(frame)
                .map_err(|e| AlignmentError::ExportFailed {
                    path: path.to_path_buf(),
                    reason: format!("Failed to write CSV: {}", e),
                })?;
        }
        ExportFormat::Parquet => {
            PolarsParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(frame)
                .map_err(|e| AlignmentError::ExportFailed {
                    path: path.to_path_buf(),
                    reason: format!("Failed to write Parquet: {}", e),
                })?;
        }
    }
    debug!("Wrote {} rows to {}", frame.height(), path.display());
    Ok(())
}

/// Write the monthly table and, when present, the daily table
///
/// Returns the paths written. No daily file is produced for an empty daily
/// outcome.
pub fn export_report(report: &AlignmentReport, export: &ExportConfig) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&export.output_dir)?;
    let mut written = Vec::new();

    let mut monthly = monthly_frame(&report.monthly, report.threshold_percent)?;
    let monthly_path = export.monthly_path();
    write_frame(&mut monthly, &monthly_path, export.format)?;
    written.push(monthly_path);

    let daily_buckets = report.daily.buckets();
    if !daily_buckets.is_empty() {
        let mut daily = daily_frame(daily_buckets, report.threshold_percent)?;
        let daily_path = export.daily_path();
        write_frame(&mut daily, &daily_path, export.format)?;
        written.push(daily_path);
    }

    info!(
        "Exported {} table(s) to {}",
        written.len(),
        export.output_dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn monthly() -> Vec<MonthlyBucket> {
        vec![
            MonthlyBucket {
                year: 2021,
                month: 3,
                good_scan_percentage: 12.5,
                records: 8,
                good_scans: 1,
            },
            MonthlyBucket {
                year: 2021,
                month: 4,
                good_scan_percentage: 50.0,
                records: 4,
                good_scans: 2,
            },
        ]
    }

    #[test]
    fn test_monthly_frame() {
        let frame = monthly_frame(&monthly(), 21).unwrap();

        assert_eq!(frame.height(), 2);
        assert_eq!(
            frame.get_column_names_str(),
            vec!["Year", "Month", "Good Scan (%)", "Records", "Good Scans", "Status"]
        );
        let statuses = frame.column("Status").unwrap().as_materialized_series().str().unwrap();
        assert_eq!(statuses.get(0), Some("fail"));
        assert_eq!(statuses.get(1), Some("pass"));
    }

    #[test]
    fn test_daily_frame_uses_iso_dates() {
        let buckets = vec![DailyBucket {
            date: NaiveDate::from_ymd_opt(2021, 3, 5).unwrap(),
            good_scan_percentage: 100.0,
            records: 1,
            good_scans: 1,
        }];
        let frame = daily_frame(&buckets, 21).unwrap();

        let dates = frame.column("Date").unwrap().as_materialized_series().str().unwrap();
        assert_eq!(dates.get(0), Some("2021-03-05"));
    }

    #[test]
    fn test_empty_monthly_frame() {
        let frame = monthly_frame(&[], 21).unwrap();
        assert_eq!(frame.height(), 0);
        assert_eq!(frame.width(), 6);
    }
}
