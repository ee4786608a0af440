//! Time source and the stored timestamp format
//!
//! Timestamps are persisted as fixed-width UTC text (`YYYY-MM-DD HH:MM:SS.ffffff`),
//! so string order equals time order on every engine and "not deleted" can be a
//! far-future value compared with a single `>`.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::{RecordStoreError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Supplies the current time for record timestamps and soft-delete checks
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// Stored with microsecond precision, matching the persisted format.
#[derive(Debug)]
pub struct ManualClock {
    micros: AtomicI64,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            micros: AtomicI64::new(now.timestamp_micros()),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.micros.store(now.timestamp_micros(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let step = by.num_microseconds().unwrap_or(i64::MAX);
        self.micros.fetch_add(step, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.micros.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// The "not deleted" marker: 9999-12-31 23:59:59.999999 UTC
pub fn soft_delete_sentinel() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Render a timestamp in the stored text format
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp; RFC 3339 text is accepted too
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, TIMESTAMP_PARSE_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RecordStoreError::invalid_timestamp(format!("'{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_is_fixed_width() {
        assert_eq!(format_timestamp(&noon()), "2026-10-16 12:00:00.000000");
        assert_eq!(
            format_timestamp(&soft_delete_sentinel()),
            "9999-12-31 23:59:59.999999"
        );
    }

    #[test]
    fn test_parse_stored_format() {
        let parsed = parse_timestamp("2026-10-16 12:00:00.000000").unwrap();
        assert_eq!(parsed, noon());
    }

    #[test]
    fn test_parse_without_fraction() {
        let parsed = parse_timestamp("2026-10-16 12:00:00").unwrap();
        assert_eq!(parsed, noon());
    }

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_timestamp("2026-10-16T14:00:00+02:00").unwrap();
        assert_eq!(parsed, noon());
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, RecordStoreError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_text_order_matches_time_order() {
        let earlier = format_timestamp(&noon());
        let later = format_timestamp(&(noon() + Duration::microseconds(1)));
        assert!(earlier < later);
        assert!(later < format_timestamp(&soft_delete_sentinel()));
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(noon());
        assert_eq!(clock.now(), noon());

        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), noon() + Duration::seconds(90));

        clock.set(noon());
        assert_eq!(clock.now(), noon());
    }
}
