//! Command-line interface components.

use crate::chart::{Bar, BarChart};
use crate::config::{ExportConfig, ExportFormat, ReportConfig};
use crate::constants::DEFAULT_THRESHOLD_PERCENT;
use crate::export::export_report;
use crate::models::{DailySummary, ThresholdStatus};
use crate::report::{AlignmentLog, AlignmentReport};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

const MONTHLY_TITLE: &str = "Monthly Report of Pandora Alignments";
const DAILY_TITLE: &str = "Daily Report of Pandora Alignments";

#[derive(Parser, Debug)]
#[command(name = "alignment_report")]
#[command(about = "Monthly and daily good-scan report for Pandora alignment files")]
#[command(
    long_about = "Reads a Pandora alignment log, flags every scan whose weighting factor is above \
                  the file-wide average as a good scan, and reports the percentage of good scans \
                  per month and per day. Buckets below the threshold are shown in red."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Alignment log file to analyze
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Threshold for good scans in percent (0-100)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_THRESHOLD_PERCENT,
        value_parser = clap::value_parser!(u32).range(0..=100)
    )]
    pub threshold: u32,

    /// First day of the daily report (defaults to the earliest date in the file)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last day of the daily report (defaults to the latest date in the file)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Output format for stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Directory to write monthly/daily report tables into
    #[arg(short, long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// File format for exported tables
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub export_format: ExportFormat,

    /// Skip the bar charts
    #[arg(long)]
    pub no_chart: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output format for the report on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables and bar charts
    Table,
    /// The full report as JSON
    Json,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Build the report configuration from the arguments
    pub fn report_config(&self) -> ReportConfig {
        let mut config = ReportConfig::default().with_threshold(self.threshold);
        if let Some(start) = self.start {
            config = config.with_start(start);
        }
        if let Some(end) = self.end {
            config = config.with_end(end);
        }
        config
    }

    pub fn export_config(&self) -> Option<ExportConfig> {
        self.export
            .as_ref()
            .map(|dir| ExportConfig::new(dir, self.export_format))
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("alignment_report={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Render the full report as pretty-printed JSON
pub fn report_json(report: &AlignmentReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Run the report for the parsed arguments
pub fn run(args: &Args) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = args.report_config();
    config.validate()?;

    let log = AlignmentLog::from_path(&args.input)
        .with_context(|| format!("Failed to process {}", args.input.display()))?;
    let report = log.report(&config)?;

    let mut stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Json => writeln!(stdout, "{}", report_json(&report)?)?,
        OutputFormat::Table => write_report(&mut stdout, &report, args)?,
    }

    if let Some(export) = args.export_config() {
        let written = export_report(&report, &export).with_context(|| {
            format!("Failed to export tables to {}", export.output_dir.display())
        })?;
        if args.format == OutputFormat::Table {
            for path in written {
                writeln!(stdout, "  {} {}", "Exported:".bright_cyan(), path.display())?;
            }
        }
    }

    Ok(())
}

fn status_cell(status: ThresholdStatus) -> ColoredString {
    match status {
        ThresholdStatus::Pass => "pass".green(),
        ThresholdStatus::Fail => "fail".red(),
    }
}

fn chart(title: &str, bars: Vec<Bar>, args: &Args) -> BarChart {
    let chart = BarChart::new(title, bars, args.threshold);
    if args.no_color {
        chart.without_color()
    } else {
        chart
    }
}

/// Write summary, tables and charts in human-readable form
pub fn write_report(
    out: &mut impl Write,
    report: &AlignmentReport,
    args: &Args,
) -> io::Result<()> {
    writeln!(out, "{}", MONTHLY_TITLE.bright_green().bold())?;
    writeln!(out, "  {} {}", "File:".bright_cyan(), args.input.display())?;
    writeln!(out, "  {} {}", "Layout:".bright_cyan(), report.variant)?;
    writeln!(
        out,
        "  {} {}",
        "Records:".bright_cyan(),
        report.total_records.to_string().bright_white().bold()
    )?;
    match report.average_weighting_factor {
        Some(average) => writeln!(
            out,
            "  {} {:.4}",
            "Average weighting factor:".bright_cyan(),
            average
        )?,
        None => writeln!(
            out,
            "  {} {}",
            "Average weighting factor:".bright_cyan(),
            "none (no valid weighting factors)".yellow()
        )?,
    }
    writeln!(
        out,
        "  {} {}",
        "Good scans:".bright_cyan(),
        report.good_scans.to_string().bright_white()
    )?;
    writeln!(
        out,
        "  {} {}%",
        "Threshold:".bright_cyan(),
        report.threshold_percent
    )?;
    let coerced = report.load_stats.total_coerced();
    if coerced > 0 {
        writeln!(
            out,
            "  {} {}",
            "Unparsable fields:".bright_yellow(),
            coerced.to_string().bright_yellow()
        )?;
    }

    writeln!(out, "\n{}", "Monthly Report Data".bright_yellow())?;
    if report.monthly.is_empty() {
        writeln!(
            out,
            "  {}",
            "No monthly data: the file has no valid dates.".yellow()
        )?;
    } else {
        writeln!(
            out,
            "  {:>6} {:>5} {:>14} {:>8} {:>6}",
            "Year", "Month", "Good Scan (%)", "Records", "Status"
        )?;
        for (bucket, status) in report.monthly_statuses() {
            writeln!(
                out,
                "  {:>6} {:>5} {:>14.2} {:>8} {:>6}",
                bucket.year,
                bucket.month,
                bucket.good_scan_percentage,
                bucket.records,
                status_cell(status)
            )?;
        }
        if !args.no_chart {
            let bars = report.monthly.iter().map(Bar::from).collect();
            writeln!(out, "\n{}", chart(MONTHLY_TITLE, bars, args).render())?;
        }
    }

    writeln!(out, "{}", "Daily Report Data".bright_yellow())?;
    match &report.daily {
        DailySummary::NoValidDates => {
            writeln!(out, "  {}", "No valid dates found in the data.".yellow())?;
        }
        DailySummary::NoDataInRange { range } => {
            writeln!(out, "  {} {}", "No data in selected range:".yellow(), range)?;
        }
        DailySummary::Buckets { range, .. } => {
            writeln!(out, "  {} {}", "Range:".bright_cyan(), range)?;
            writeln!(
                out,
                "  {:>10} {:>14} {:>8} {:>6}",
                "Date", "Good Scan (%)", "Records", "Status"
            )?;
            for (bucket, status) in report.daily_statuses() {
                writeln!(
                    out,
                    "  {:>10} {:>14.2} {:>8} {:>6}",
                    bucket.label(),
                    bucket.good_scan_percentage,
                    bucket.records,
                    status_cell(status)
                )?;
            }
            if !args.no_chart {
                let bars = report.daily.buckets().iter().map(Bar::from).collect();
                writeln!(out, "\n{}", chart(DAILY_TITLE, bars, args).render())?;
            }
        }
    }

    Ok(())
}

/// Parse a calendar date argument
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "Instrument: Pandora 101\n\
                          ----------------------------------------\n\
                          Column 8: Weighting factor\n\
                          ----------------------------------------\n";

    fn write_log(dir: &TempDir, lines: &[&str]) -> PathBuf {
        let path = dir.path().join("alignment.txt");
        let mut content = HEADER.to_string();
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn args_for(path: &std::path::Path, extra: &[&str]) -> Args {
        let mut argv = vec!["alignment_report", path.to_str().unwrap(), "--no-color", "--no-chart"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn rendered(args: &Args) -> String {
        let report = AlignmentLog::from_path(&args.input)
            .unwrap()
            .report(&args.report_config())
            .unwrap();
        let mut out = Vec::new();
        write_report(&mut out, &report, args).unwrap();
        String::from_utf8(out).unwrap()
    }

    const TEN_DAYS: &[&str] = &[
        "20210301T101500.0Z  ZA  40.0  180.0  40.1  180.2  0.02  30.0",
        "20210310T101500.0Z  ZA  41.0  181.0  41.1  181.2  0.02  10.0",
    ];

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["alignment_report", "align.txt"]).unwrap();

        assert_eq!(args.threshold, 21);
        assert_eq!(args.format, OutputFormat::Table);
        assert_eq!(args.get_log_level(), "warn");
        assert!(args.export_config().is_none());
        assert_eq!(args.report_config(), ReportConfig::default());
    }

    #[test]
    fn test_range_and_export_args() {
        let args = Args::try_parse_from([
            "alignment_report",
            "align.txt",
            "--threshold",
            "40",
            "--start",
            "2021-03-01",
            "--end",
            "2021-03-31",
            "--export",
            "out",
            "--export-format",
            "parquet",
            "-vv",
        ])
        .unwrap();

        let config = args.report_config();
        assert_eq!(config.threshold_percent, 40);
        assert_eq!(config.start, Some(parse_date("2021-03-01").unwrap()));
        assert_eq!(config.end, Some(parse_date("2021-03-31").unwrap()));
        assert_eq!(args.get_log_level(), "debug");

        let export = args.export_config().unwrap();
        assert_eq!(export.format, ExportFormat::Parquet);
        assert_eq!(export.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        assert!(Args::try_parse_from(["alignment_report", "a.txt", "-t", "101"]).is_err());
    }

    #[test]
    fn test_run_reports_empty_range_without_error() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, TEN_DAYS);
        let args = args_for(&path, &["--start", "2021-03-04", "--end", "2021-03-05"]);

        assert!(run(&args).is_ok());

        let output = rendered(&args);
        assert!(output.contains("No data in selected range:"));
        assert!(output.contains("2021-03-04 to 2021-03-05"));
        assert!(!output.contains("No monthly data"));
    }

    #[test]
    fn test_run_reports_missing_dates_without_error() {
        let dir = TempDir::new().unwrap();
        let path = write_log(
            &dir,
            &["not-a-date  ZA  40.0  180.0  40.1  180.2  0.02  30.0"],
        );
        let args = args_for(&path, &[]);

        assert!(run(&args).is_ok());

        let output = rendered(&args);
        assert!(output.contains("No monthly data: the file has no valid dates."));
        assert!(output.contains("No valid dates found in the data."));
    }

    #[test]
    fn test_run_fails_on_unknown_layout() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, &["20210301T101500.0Z  ZA  40.0  180.0  40.1  180.2  0.02"]);
        let args = args_for(&path, &[]);

        let error = run(&args).unwrap_err();
        let message = format!("{:#}", error);
        assert!(message.contains("Failed to process"));
        assert!(message.contains("expected 8 or 12"));
    }

    #[test]
    fn test_run_fails_on_file_without_data() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, &[]);
        let args = args_for(&path, &[]);

        let message = format!("{:#}", run(&args).unwrap_err());
        assert!(message.contains("No data found after the second separator line"));
        assert!(!message.contains("expected 8 or 12"));
    }

    #[test]
    fn test_json_output() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, TEN_DAYS);
        let args = args_for(&path, &["--format", "json", "--start", "2021-03-04"]);

        assert!(run(&args).is_ok());

        let report = AlignmentLog::from_path(&path)
            .unwrap()
            .report(&args.report_config())
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&report_json(&report).unwrap()).unwrap();
        assert_eq!(json["variant"], "single_instrument");
        assert_eq!(json["total_records"], 2);
        assert_eq!(json["monthly"][0]["good_scan_percentage"], 50.0);
        assert_eq!(json["daily"]["status"], "buckets");
        assert_eq!(json["daily"]["buckets"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(Args::try_parse_from(["alignment_report", "a.txt", "--start", "March"]).is_err());
        assert!(parse_date("2021-02-30").is_err());
    }
}
