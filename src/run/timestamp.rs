//! Run directory names
//!
//! OpenLANE names each run after the time it started. The format changed a
//! few times; names that match none of the known formats sort first.

use chrono::NaiveDateTime;

/// Formats carrying a full date
const DATED_FORMATS: &[&str] = &[
    "RUN_%Y.%m.%d_%H.%M.%S",
    "%Y.%m.%d_%H.%M.%S",
    "RUN_%Y-%m-%d_%H-%M-%S",
];

/// Formats of early OpenLANE releases, which left out the year
const YEARLESS_FORMATS: &[&str] = &["%d-%m_%H-%M", "%d-%m_%H-%M-%S"];

/// Year assumed for year-less names.
///
/// 1900 is not a leap year, so a year-less `29-02_...` name does not parse
/// and sorts with the other unparseable names.
const YEARLESS_YEAR: i32 = 1900;

/// Parse the start time encoded in a run directory name
#[must_use]
pub fn parse_run_name(name: &str) -> Option<NaiveDateTime> {
    for fmt in DATED_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(name, fmt) {
            return Some(ts);
        }
    }

    let with_year = format!("{YEARLESS_YEAR}-{name}");
    for fmt in YEARLESS_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(&with_year, &format!("%Y-{fmt}")) {
            return Some(ts);
        }
    }

    None
}

/// Sort key for a run name: unparseable names (`None`) order before every
/// parsed timestamp, the name breaks ties.
#[must_use]
pub fn sort_key(name: &str) -> (Option<NaiveDateTime>, &str) {
    (parse_run_name(name), name)
}
