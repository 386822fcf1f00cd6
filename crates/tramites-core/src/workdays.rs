//! Business-day math for the justification submission window.
//!
//! A justification may only cover the two most recent business days
//! strictly before "today" in the institution's civil timezone. Saturdays
//! and Sundays are skipped; there is no holiday calendar.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::error::{Error, Result};

/// Parse a `YYYY-MM-DD` string.
pub fn parse_ymd(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_ymd(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Monday through Friday.
pub fn is_business_day(d: NaiveDate) -> bool {
    !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The `count` most recent business days strictly before `today`,
/// most recent first.
pub fn previous_business_days(today: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(count);
    let mut cur = today;
    while out.len() < count {
        match cur.checked_sub_days(Days::new(1)) {
            Some(prev) => {
                cur = prev;
                if is_business_day(cur) {
                    out.push(cur);
                }
            }
            None => break,
        }
    }
    out
}

/// Whether `date` falls inside the submission window derived from `today`.
pub fn in_submission_window(today: NaiveDate, date: NaiveDate) -> bool {
    previous_business_days(today, 2).contains(&date)
}
