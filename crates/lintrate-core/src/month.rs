use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonthError {
    #[error("invalid month label {0:?}, expected YYYY-MM")]
    InvalidLabel(String),
    #[error("unparsable issuance date {0:?}")]
    MalformedDate(String),
}

/// Calendar month used as a grouping key: the half-open interval
/// `[first-of-month, first-of-next-month)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthBucket(NaiveDate);

impl MonthBucket {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(MonthBucket)
    }

    /// Truncate a date to the first of its month.
    pub fn containing(date: NaiveDate) -> Self {
        MonthBucket(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First day of the following month; `None` past the end of the calendar.
    pub fn end(&self) -> Option<NaiveDate> {
        self.0.checked_add_months(Months::new(1))
    }

    pub fn next(&self) -> Option<Self> {
        self.end().map(MonthBucket)
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthBucket {
    type Err = MonthError;

    /// Accepts `YYYY-MM`; a single-digit month (`2022-1`) is tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MonthError::InvalidLabel(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.is_empty() || m.len() > 2 {
            return Err(invalid());
        }
        if !y.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        MonthBucket::new(year, month).ok_or_else(invalid)
    }
}

/// Every month from `start` through `end`, both included and in order.
/// Empty when `end` precedes `start`.
pub fn enumerate_months(start: MonthBucket, end: MonthBucket) -> Vec<MonthBucket> {
    let mut out = vec![];
    let mut cur = start;
    while cur <= end {
        out.push(cur);
        match cur.next() {
            Some(n) => cur = n,
            None => break,
        }
    }
    out
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parse a stored issuance date into a calendar date.
///
/// Timestamps carrying an offset are normalised to UTC first, so a month
/// boundary is judged the same way the store's `date()` function judges it.
pub fn parse_issued_at(raw: &str) -> Result<NaiveDate, MonthError> {
    let s = raw.trim();
    let malformed = || MonthError::MalformedDate(raw.to_string());
    if s.is_empty() {
        return Err(malformed());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc).date_naive());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| malformed())
}

/// Month bucket of a stored issuance date.
pub fn bucket_of(raw: &str) -> Result<MonthBucket, MonthError> {
    parse_issued_at(raw).map(MonthBucket::containing)
}
