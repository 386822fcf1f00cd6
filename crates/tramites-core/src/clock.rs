//! Civil clock for Costa Rica (UTC-06:00, no DST).
//!
//! All business-rule time decisions go through a [`Clock`] provider plus a
//! persisted offset in minutes, so that the administrator-controlled offset
//! is authoritative and uniformly applied, and tests can pin "now".

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

/// Seconds east of UTC for the institution's civil timezone.
pub const CIVIL_UTC_OFFSET_SECS: i32 = -6 * 3600;

/// Sanity bound on the persisted clock offset: three years of minutes.
pub const MAX_OFFSET_MINUTES: i64 = 3 * 365 * 24 * 60;

/// Source of the wall clock. Injected wherever "now" matters.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A pinned clock for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Clamp a requested offset to the ±3 year sanity bound.
pub fn clamp_offset(minutes: i64) -> i64 {
    minutes.clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES)
}

fn civil_offset() -> FixedOffset {
    // -06:00 is always within FixedOffset's valid range
    #[allow(clippy::unwrap_used)]
    FixedOffset::east_opt(CIVIL_UTC_OFFSET_SECS).unwrap()
}

/// Shifted "now" in the civil timezone.
pub fn civil_now(clock: &dyn Clock, offset_minutes: i64) -> DateTime<FixedOffset> {
    let shifted = clock.now_utc() + Duration::minutes(clamp_offset(offset_minutes));
    shifted.with_timezone(&civil_offset())
}

/// Shifted "today" in the civil timezone.
pub fn civil_today(clock: &dyn Clock, offset_minutes: i64) -> NaiveDate {
    civil_now(clock, offset_minutes).date_naive()
}

/// Shifted civil time of day as `HH:MM`.
pub fn civil_time_hm(clock: &dyn Clock, offset_minutes: i64) -> String {
    civil_now(clock, offset_minutes).format("%H:%M").to_string()
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn utc(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn civil_date_lags_utc_in_the_evening() {
        // 03:00 UTC is 21:00 the previous day in Costa Rica
        let clock = FixedClock(utc("2024-06-12 03:00:00"));
        assert_eq!(
            civil_today(&clock, 0),
            NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()
        );
        assert_eq!(civil_time_hm(&clock, 0), "21:00");
    }

    #[test]
    fn offset_shifts_the_civil_date() {
        let clock = FixedClock(utc("2024-06-12 18:00:00"));
        assert_eq!(
            civil_today(&clock, 0),
            NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
        );
        // +1 day
        assert_eq!(
            civil_today(&clock, 24 * 60),
            NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()
        );
        // -2 days
        assert_eq!(
            civil_today(&clock, -2 * 24 * 60),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );
    }

    #[test]
    fn offset_is_clamped_to_three_years() {
        assert_eq!(clamp_offset(MAX_OFFSET_MINUTES + 1), MAX_OFFSET_MINUTES);
        assert_eq!(clamp_offset(-MAX_OFFSET_MINUTES - 1), -MAX_OFFSET_MINUTES);
        assert_eq!(clamp_offset(90), 90);
    }
}
