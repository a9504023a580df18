//! Monthly and daily good-scan aggregation.
//!
//! Records without a timestamp stay in the table but fall into no bucket.
//! Every bucket's percentage counts failing and null-weighted records in the
//! denominator.

use crate::models::{
    ClassifiedRecord, DailyBucket, DailySummary, DateRange, MonthlyBucket,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Running good/total count for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    records: usize,
    good_scans: usize,
}

impl Tally {
    fn add(&mut self, good_scan: bool) {
        self.records += 1;
        if good_scan {
            self.good_scans += 1;
        }
    }

    fn percentage(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            self.good_scans as f64 / self.records as f64 * 100.0
        }
    }
}

/// Earliest and latest calendar dates among valid timestamps
///
/// Returns `None` when no record carries a valid timestamp.
pub fn observed_date_span(records: &[ClassifiedRecord]) -> Option<DateRange> {
    let mut dates = records.iter().filter_map(|r| r.record.date());
    let first = dates.next()?;
    let (start, end) = dates.fold((first, first), |(start, end), date| {
        (start.min(date), end.max(date))
    });
    DateRange::new(start, end)
}

/// Good-scan percentage per (year, month), in chronological order
pub fn monthly_summary(records: &[ClassifiedRecord]) -> Vec<MonthlyBucket> {
    let mut tallies: BTreeMap<(i32, u32), Tally> = BTreeMap::new();
    for classified in records {
        if let Some(key) = classified.record.year_month() {
            tallies.entry(key).or_default().add(classified.good_scan);
        }
    }

    let buckets: Vec<MonthlyBucket> = tallies
        .into_iter()
        .map(|((year, month), tally)| MonthlyBucket {
            year,
            month,
            good_scan_percentage: tally.percentage(),
            records: tally.records,
            good_scans: tally.good_scans,
        })
        .collect();

    info!("Aggregated {} monthly buckets", buckets.len());
    buckets
}

/// Good-scan percentage per calendar date within `range`, in chronological order
///
/// An empty result is reported as [`DailySummary::NoDataInRange`] rather than
/// as an empty table.
pub fn daily_summary(records: &[ClassifiedRecord], range: DateRange) -> DailySummary {
    let mut tallies: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
    for classified in records {
        match classified.record.date() {
            Some(date) if range.contains(date) => {
                tallies.entry(date).or_default().add(classified.good_scan);
            }
            _ => {}
        }
    }

    if tallies.is_empty() {
        debug!("No records between {}", range);
        return DailySummary::NoDataInRange { range };
    }

    let buckets: Vec<DailyBucket> = tallies
        .into_iter()
        .map(|(date, tally)| DailyBucket {
            date,
            good_scan_percentage: tally.percentage(),
            records: tally.records,
            good_scans: tally.good_scans,
        })
        .collect();

    info!("Aggregated {} daily buckets for {}", buckets.len(), range);
    DailySummary::Buckets { range, buckets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlignmentRecord, InstrumentFit, Pointing, SingleInstrumentRecord};
    use chrono::{DateTime, Utc};

    fn at(year: i32, month: u32, day: u32, hour: u32) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .map(|dt| dt.and_utc())
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn classified(timestamp: Option<DateTime<Utc>>, good_scan: bool) -> ClassifiedRecord {
        ClassifiedRecord {
            record: AlignmentRecord::Single(SingleInstrumentRecord {
                pointing: Pointing {
                    timestamp,
                    routine_code: "ZA".to_string(),
                    true_zenith: None,
                    true_azimuth: None,
                },
                fit: InstrumentFit::default(),
            }),
            good_scan,
        }
    }

    fn sample() -> Vec<ClassifiedRecord> {
        vec![
            classified(at(2021, 4, 2, 10), true),
            classified(at(2021, 3, 15, 9), true),
            classified(at(2021, 3, 15, 12), false),
            classified(at(2021, 3, 16, 8), false),
            classified(None, true),
            classified(at(2020, 12, 31, 23), false),
        ]
    }

    #[test]
    fn test_monthly_percentage_one_in_three() {
        let buckets = monthly_summary(&sample());
        let march = buckets
            .iter()
            .find(|b| (b.year, b.month) == (2021, 3))
            .unwrap();

        assert_eq!(march.records, 3);
        assert_eq!(march.good_scans, 1);
        assert!((march.good_scan_percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_is_chronological_and_skips_null_timestamps() {
        let buckets = monthly_summary(&sample());
        let keys: Vec<(i32, u32)> = buckets.iter().map(|b| (b.year, b.month)).collect();

        assert_eq!(keys, vec![(2020, 12), (2021, 3), (2021, 4)]);
        assert_eq!(buckets.iter().map(|b| b.records).sum::<usize>(), 5);
        assert_eq!(buckets[2].good_scan_percentage, 100.0);
        assert_eq!(buckets[0].good_scan_percentage, 0.0);
    }

    #[test]
    fn test_observed_date_span() {
        let span = observed_date_span(&sample()).unwrap();
        assert_eq!(span.start, date(2020, 12, 31));
        assert_eq!(span.end, date(2021, 4, 2));
    }

    #[test]
    fn test_no_valid_dates() {
        let records = vec![classified(None, true), classified(None, false)];
        assert_eq!(observed_date_span(&records), None);
        assert!(monthly_summary(&records).is_empty());
    }

    #[test]
    fn test_daily_range_is_inclusive() {
        let range = DateRange::new(date(2021, 3, 15), date(2021, 3, 16)).unwrap();
        let summary = daily_summary(&sample(), range);

        let buckets = summary.buckets();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].date, date(2021, 3, 15));
        assert_eq!(buckets[0].good_scan_percentage, 50.0);
        assert_eq!(buckets[1].date, date(2021, 3, 16));
        assert_eq!(buckets[1].good_scan_percentage, 0.0);
        assert_eq!(summary.range(), Some(range));
    }

    #[test]
    fn test_daily_empty_range_is_explicit() {
        let range = DateRange::new(date(2021, 1, 1), date(2021, 2, 28)).unwrap();
        let summary = daily_summary(&sample(), range);

        assert_eq!(summary, DailySummary::NoDataInRange { range });
        assert!(summary.buckets().is_empty());
    }

    #[test]
    fn test_narrow_range_is_subset_of_full_range() {
        let records = sample();
        let full = daily_summary(&records, observed_date_span(&records).unwrap());
        let narrow = daily_summary(
            &records,
            DateRange::new(date(2021, 3, 16), date(2021, 4, 2)).unwrap(),
        );

        assert!(narrow.buckets().len() < full.buckets().len());
        for bucket in narrow.buckets() {
            assert!(full.buckets().contains(bucket));
        }
    }
}
