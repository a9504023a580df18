//! Application constants for the alignment report
//!
//! Field layouts, separator detection and default report parameters.

// =============================================================================
// File Layout
// =============================================================================

/// Minimum run of dashes that marks a section separator line
pub const SEPARATOR_MIN_DASHES: usize = 16;

/// Number of separator lines preceding the data block
pub const SEPARATORS_BEFORE_DATA: usize = 2;

/// Token count of a single-instrument data line
pub const SINGLE_INSTRUMENT_FIELDS: usize = 8;

/// Token count of a dual-instrument data line
pub const DUAL_INSTRUMENT_FIELDS: usize = 12;

/// Column names for single-instrument files, in file order
pub const SINGLE_INSTRUMENT_COLUMNS: &[&str] = &[
    "UT date and time (ISO 8601)",
    "Alignment routine code",
    "True zenith angle (deg)",
    "True azimuth (deg)",
    "Apparent zenith angle (deg)",
    "Apparent azimuth (deg)",
    "RMS of field of view fitting",
    "Weighting factor",
];

/// Column names for dual-instrument files, in file order
pub const DUAL_INSTRUMENT_COLUMNS: &[&str] = &[
    "UT date and time (ISO 8601)",
    "Alignment routine code",
    "True zenith angle (deg)",
    "True azimuth (deg)",
    "Apparent zenith angle instrument 1 (deg)",
    "Apparent azimuth instrument 1 (deg)",
    "RMS of field of view fitting instrument 1",
    "Weighting factor instrument 1",
    "Apparent zenith angle instrument 2 (deg)",
    "Apparent azimuth instrument 2 (deg)",
    "RMS of field of view fitting instrument 2",
    "Weighting factor instrument 2",
];

// =============================================================================
// Timestamp Parsing
// =============================================================================

/// Naive date-time formats tried in order after RFC 3339
///
/// `%.f` consumes an optional fractional part, so these cover both whole and
/// fractional seconds. A trailing `Z` is stripped before these are tried.
pub const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y%m%dT%H%M%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Formats with an explicit numeric offset
pub const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y%m%dT%H%M%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Date-only formats, interpreted as midnight UTC
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

// =============================================================================
// Report Defaults
// =============================================================================

/// Default good-scan threshold in percent
pub const DEFAULT_THRESHOLD_PERCENT: u32 = 21;

/// Upper bound for the threshold
pub const MAX_THRESHOLD_PERCENT: u32 = 100;

/// File stem for the exported monthly table
pub const MONTHLY_EXPORT_STEM: &str = "monthly_report";

/// File stem for the exported daily table
pub const DAILY_EXPORT_STEM: &str = "daily_report";

/// Width in characters of the longest bar in the terminal chart
pub const CHART_WIDTH: usize = 50;
