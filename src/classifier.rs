//! Good-scan classification against the file-wide weighting factor baseline.
//!
//! Two distinct null policies apply here. A missing weighting factor is left
//! out of the baseline mean entirely, but the record itself is still
//! classified, and always as a failing scan.

use crate::models::{AlignmentRecord, ClassifiedRecord};
use tracing::{debug, info};

/// Classified records plus the baseline they were compared against
#[derive(Debug, Clone)]
pub struct ClassifiedTable {
    pub records: Vec<ClassifiedRecord>,
    /// Mean of all non-null weighting factors; `None` when every value is null
    pub average_weighting_factor: Option<f64>,
}

impl ClassifiedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn good_scan_count(&self) -> usize {
        self.records.iter().filter(|r| r.good_scan).count()
    }
}

/// Mean of the non-null weighting factors
///
/// Null values count in neither the sum nor the denominator.
pub fn average_weighting_factor(records: &[AlignmentRecord]) -> Option<f64> {
    let (sum, count) = records
        .iter()
        .filter_map(AlignmentRecord::weighting_factor)
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// A scan is good when its weighting factor is strictly above the baseline
///
/// A null weighting factor or an undefined baseline is never good.
pub fn is_good_scan(weighting_factor: Option<f64>, baseline: Option<f64>) -> bool {
    match (weighting_factor, baseline) {
        (Some(value), Some(baseline)) => value > baseline,
        _ => false,
    }
}

/// Flag every record against the file-wide baseline
pub fn classify(records: Vec<AlignmentRecord>) -> ClassifiedTable {
    let average = average_weighting_factor(&records);
    match average {
        Some(value) => debug!("Average weighting factor: {:.4}", value),
        None => debug!("No valid weighting factors; every record is classified as not good"),
    }

    let records: Vec<ClassifiedRecord> = records
        .into_iter()
        .map(|record| {
            let good_scan = is_good_scan(record.weighting_factor(), average);
            ClassifiedRecord { record, good_scan }
        })
        .collect();

    let table = ClassifiedTable {
        records,
        average_weighting_factor: average,
    };

    info!(
        "Classified {} records: {} good scans",
        table.len(),
        table.good_scan_count()
    );

    table
}
