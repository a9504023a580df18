use alignment_report::{AlignmentLog, ReportConfig};
use criterion::{Criterion, criterion_group, criterion_main};
use std::fmt::Write;
use std::hint::black_box;

/// Two years of hourly single-instrument scans
fn synthetic_file() -> String {
    let mut content = String::from(
        "Instrument: Pandora 101\n----------------------------------------\n\
         Column 8: Weighting factor\n----------------------------------------\n",
    );
    let start = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start date");
    for hour in 0..(2 * 365 * 24) {
        let ts = start + chrono::Duration::hours(hour);
        let weighting = (hour % 97) as f64 * 0.5;
        writeln!(
            content,
            "{}Z  ZA  40.00  180.00  40.10  180.20  0.021  {:.2}",
            ts.format("%Y%m%dT%H%M%S%.3f"),
            weighting
        )
        .expect("write to String");
    }
    content
}

fn bench_pipeline(c: &mut Criterion) {
    let content = synthetic_file();
    let config = ReportConfig::default();

    c.bench_function("parse_and_classify", |b| {
        b.iter(|| AlignmentLog::from_bytes(black_box(content.as_bytes())))
    });

    let log = AlignmentLog::from_bytes(content.as_bytes()).expect("synthetic file parses");
    c.bench_function("monthly_and_daily_report", |b| {
        b.iter(|| log.report(black_box(&config)))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
