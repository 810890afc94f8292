//! Time handling for the noise-monitoring API.
//!
//! Measurements are stored in UTC. Everything user-facing (JSON timestamps,
//! report headers, export rows) is presented at a fixed +08:00 offset, the
//! offset of the monitoring site. There is no DST handling on purpose: the
//! site's offset never changes.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Display offset of the monitoring site (+08:00).
pub const LOCAL_OFFSET_SECS: i32 = 8 * 3600;

/// Timestamp format used by listing endpoints.
pub const LISTING_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format used inside rendered reports.
pub const REPORT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// The site's fixed UTC offset.
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_OFFSET_SECS).expect("+08:00 is a valid offset")
}

/// Convert a stored UTC timestamp to site-local time.
pub fn to_local(ts: DateTime<Utc>) -> DateTime<FixedOffset> {
    ts.with_timezone(&local_offset())
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` in site-local time.
pub fn format_listing(ts: DateTime<Utc>) -> String {
    to_local(ts).format(LISTING_FORMAT).to_string()
}

/// Format a timestamp as `DD/MM/YYYY HH:MM:SS` in site-local time.
pub fn format_report(ts: DateTime<Utc>) -> String {
    to_local(ts).format(REPORT_FORMAT).to_string()
}

/// Parse an explicit `startDate`/`endDate` query value.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and a bare
/// `YYYY-MM-DD` (interpreted as midnight). Values are taken as UTC, matching
/// how the stored column is compared. Unparseable input yields `None` and the
/// caller falls back to the default window.
pub fn parse_bound(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Coerce the export `days` query parameter.
///
/// Unparseable, zero or negative values all behave as 1.
pub fn coerce_days(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|d| *d > 0)
        .unwrap_or(1)
}

/// Local midnight of `now`'s day, expressed back in UTC.
///
/// Used for the dashboard's running daily statistics.
pub fn local_midnight_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = to_local(now);
    let midnight = local
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| local.naive_local());
    local_offset()
        .from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

/// A closed `[start, end]` query interval on a series' time column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Resolve the effective window for a series.
    ///
    /// `latest` is the series' most recent timestamp; `None` means the series
    /// has no rows at all and there is nothing to query. Explicit bounds win
    /// over the defaults; otherwise the window is `[end - lookback, end]`
    /// anchored on the latest row rather than on wall-clock time, so a feed
    /// that stopped yesterday still reports its final day of data.
    ///
    /// A reversed window (start after end) is returned as-is; it legitimately
    /// matches zero rows.
    pub fn resolve(
        latest: Option<DateTime<Utc>>,
        explicit_start: Option<DateTime<Utc>>,
        explicit_end: Option<DateTime<Utc>>,
        lookback: Duration,
    ) -> Option<Self> {
        let latest = latest?;
        let end = explicit_end.unwrap_or(latest);
        let start = explicit_start.unwrap_or(end - lookback);
        Some(Self { start, end })
    }

    /// Inclusive membership test, mirroring the SQL `BETWEEN` the storage
    /// layer applies.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// Default lookback for listing endpoints.
pub fn listing_lookback() -> Duration {
    Duration::hours(24)
}

/// Lookback for export endpoints, `days` already coerced.
pub fn export_lookback(days: i64) -> Duration {
    Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        parse_bound(s).expect("test timestamp")
    }

    #[test]
    fn default_listing_window_is_last_24_hours() {
        let latest = utc("2024-06-10 12:00:00");
        let window = TimeWindow::resolve(Some(latest), None, None, listing_lookback())
            .expect("series has data");
        assert_eq!(window.end, latest);
        assert_eq!(window.start, utc("2024-06-09 12:00:00"));
    }

    #[test]
    fn explicit_bounds_override_defaults() {
        let latest = utc("2024-06-10 12:00:00");
        let start = utc("2024-06-01 00:00:00");
        let end = utc("2024-06-05 00:00:00");
        let window =
            TimeWindow::resolve(Some(latest), Some(start), Some(end), listing_lookback()).unwrap();
        assert_eq!(window, TimeWindow::new(start, end));
    }

    #[test]
    fn empty_series_resolves_to_none() {
        assert_eq!(
            TimeWindow::resolve(None, None, None, listing_lookback()),
            None
        );
    }

    #[test]
    fn reversed_window_is_kept_and_matches_nothing() {
        let start = utc("2024-06-10 00:00:00");
        let end = utc("2024-06-01 00:00:00");
        let window =
            TimeWindow::resolve(Some(end), Some(start), Some(end), listing_lookback()).unwrap();
        assert!(window.start > window.end);
        assert!(!window.contains(utc("2024-06-05 00:00:00")));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = TimeWindow::new(utc("2024-06-09 00:00:00"), utc("2024-06-10 00:00:00"));
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(utc("2024-06-10 00:00:01")));
    }

    #[test]
    fn days_parameter_is_coerced() {
        assert_eq!(coerce_days(Some("3")), 3);
        assert_eq!(coerce_days(Some("0")), 1);
        assert_eq!(coerce_days(Some("-2")), 1);
        assert_eq!(coerce_days(Some("abc")), 1);
        assert_eq!(coerce_days(None), 1);
    }

    #[test]
    fn bound_parsing_accepts_common_shapes() {
        assert!(parse_bound("2024-06-10 12:00:00").is_some());
        assert!(parse_bound("2024-06-10T12:00:00").is_some());
        assert_eq!(parse_bound("2024-06-10"), parse_bound("2024-06-10 00:00:00"));
        assert_eq!(parse_bound("not a date"), None);
    }

    #[test]
    fn listing_format_applies_plus_eight_offset() {
        let ts = utc("2024-06-10 04:00:00");
        assert_eq!(format_listing(ts), "2024-06-10 12:00:00");
        assert_eq!(format_report(ts), "10/06/2024 12:00:00");
    }

    #[test]
    fn local_midnight_converts_back_to_utc() {
        // 2024-06-10 02:00 local is 2024-06-09 18:00 UTC; local midnight of
        // that day is 2024-06-09 16:00 UTC.
        let now = utc("2024-06-09 18:00:00");
        assert_eq!(local_midnight_utc(now), utc("2024-06-09 16:00:00"));
    }
}
