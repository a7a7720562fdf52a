//! 🕰️ Timestamp normalization: ISO-8601 with an offset in, `YYYY-MM-DD HH:MM:SS` out.
//!
//! The offset is read and then dropped. No conversion to UTC happens here: a
//! `+01:00` timestamp keeps its British Summer Time wall clock reading, which is
//! what the dashboards display and what passengers were told.
//!
//! Best effort by contract. Garbage in, `None` out, no errors thrown at anyone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// 📅 Offset-less shapes we still accept, tried in order.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// 🔄 Reformat a timestamp as `YYYY-MM-DD HH:MM:SS` in its own encoded offset.
///
/// Accepts RFC 3339 (`2023-09-10T00:00:00.000+01:00`, `...Z`), compact offsets
/// (`+0100`), offset-less date-times and bare dates (midnight). Anything else,
/// including `None`, gives `None`.
pub fn normalize_timestamp(raw: Option<&str>) -> Option<String> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }

    let wall_clock = DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|with_offset| with_offset.naive_local())
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    // ⏱️ chrono keeps `:60` leap seconds as an overflowing nanosecond; those are rejected
    if wall_clock.nanosecond() >= 1_000_000_000 {
        return None;
    }
    Some(wall_clock.format(OUTPUT_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_bst_midnight_stays_midnight() {
        assert_eq!(
            normalize_timestamp(Some("2023-09-10T00:00:00.000+01:00")),
            Some("2023-09-10 00:00:00".to_string())
        );
    }

    #[test]
    fn the_one_where_the_offset_is_dropped_not_converted() {
        // 🧪 17:30 in +05:30 is still 17:30 here. No UTC, no drama.
        assert_eq!(
            normalize_timestamp(Some("2023-03-01T17:30:45+05:30")),
            Some("2023-03-01 17:30:45".to_string())
        );
        assert_eq!(
            normalize_timestamp(Some("2023-03-01T17:30:45.123Z")),
            Some("2023-03-01 17:30:45".to_string())
        );
    }

    #[test]
    fn the_one_where_nonsense_returns_none_and_nobody_panics() {
        assert_eq!(normalize_timestamp(Some("not-a-time")), None);
        assert_eq!(normalize_timestamp(Some("")), None);
        assert_eq!(normalize_timestamp(Some("2023-13-45T99:00:00Z")), None);
        assert_eq!(normalize_timestamp(None), None);
    }

    #[test]
    fn the_one_where_lesser_iso_shapes_still_get_in() {
        assert_eq!(
            normalize_timestamp(Some("  2023-09-10T06:05:04  ")),
            Some("2023-09-10 06:05:04".to_string())
        );
        assert_eq!(
            normalize_timestamp(Some("2023-09-10")),
            Some("2023-09-10 00:00:00".to_string())
        );
    }

    #[test]
    fn the_one_where_a_leap_second_is_not_a_time_we_recognise() {
        assert_eq!(normalize_timestamp(Some("2016-12-31T23:59:60Z")), None);
        assert_eq!(normalize_timestamp(Some("2016-12-31T23:59:60+00:00")), None);
        assert_eq!(normalize_timestamp(Some("2016-12-31T23:59:60")), None);
        assert_eq!(
            normalize_timestamp(Some("2016-12-31T23:59:59Z")),
            Some("2016-12-31 23:59:59".to_string())
        );
    }
}
