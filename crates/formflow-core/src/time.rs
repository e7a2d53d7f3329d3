// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp handling for the record store.
//!
//! All elapsed-time comparisons run in UTC+7, the timezone of the operated
//! funnel. Stored values are RFC 3339 / ISO 8601 strings; values without an
//! offset are assumed to already be UTC+7.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Fixed offset of the funnel's operating timezone (UTC+7).
pub const LOCAL_OFFSET_HOURS: i32 = 7;

fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_OFFSET_HOURS * 3600).expect("static offset is in range")
}

/// Current time in the operating timezone.
pub fn now_local() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&local_offset())
}

/// Parse a stored timestamp cell.
///
/// Accepts RFC 3339 with any offset (normalized to UTC+7) or a naive
/// ISO 8601 datetime (assumed UTC+7). Returns `None` for empty or
/// malformed values.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&local_offset()));
    }
    // Sheet rows written by earlier revisions carry no offset.
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    naive.and_local_timezone(local_offset()).single()
}

/// Seconds elapsed from `earlier` to `later`. Negative when out of order.
pub fn elapsed_secs(later: DateTime<FixedOffset>, earlier: DateTime<FixedOffset>) -> i64 {
    (later - earlier).num_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2025-06-01T10:00:00+00:00").unwrap();
        // Normalized into UTC+7.
        assert_eq!(dt.offset().local_minus_utc(), 7 * 3600);
        assert_eq!(dt.format("%H:%M").to_string(), "17:00");
    }

    #[test]
    fn parses_naive_as_local() {
        let dt = parse_timestamp("2025-06-01T10:00:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7 * 3600);
        assert_eq!(dt.format("%H:%M").to_string(), "10:00");
    }

    #[test]
    fn parses_fractional_seconds() {
        assert!(parse_timestamp("2025-06-01T10:00:00.123456").is_some());
    }

    #[test]
    fn empty_and_garbage_yield_none() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn elapsed_is_signed() {
        let a = parse_timestamp("2025-06-01T10:00:00").unwrap();
        let b = parse_timestamp("2025-06-01T11:06:40").unwrap();
        assert_eq!(elapsed_secs(b, a), 4000);
        assert_eq!(elapsed_secs(a, b), -4000);
    }

    #[test]
    fn now_local_is_in_operating_timezone() {
        assert_eq!(now_local().offset().local_minus_utc(), 7 * 3600);
    }
}
