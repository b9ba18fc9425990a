//! Time and duration helpers shared by every HOS component.
//!
//! All regulatory arithmetic happens on `DateTime<Utc>` instants and real-valued
//! hours. Timestamps are moved along a running cursor by adding hours, so the
//! conversion between the two is centralized here and done at millisecond
//! resolution: adding the hours returned by [`hours_between`] back onto the
//! start instant lands exactly on the end instant.
//!
//! Nothing in this module reads the system clock.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::HosError;

pub const MINUTES_PER_HOUR: f64 = 60.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Tolerance used when comparing accumulated hour totals against zero.
pub(crate) const EPSILON_HOURS: f64 = 1e-9;

/// Naive layouts accepted besides RFC 3339. Interpreted in the caller's zone.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Convert whole minutes to fractional hours.
pub fn minutes_to_hours(minutes: u32) -> f64 {
    f64::from(minutes) / MINUTES_PER_HOUR
}

/// Fractional hours from `start` to `end` (negative if `end` is earlier).
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Whole minutes from `start` to `end`, truncated toward zero.
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_minutes()
}

/// Move `instant` forward by `hours`, rounded to the nearest millisecond.
pub fn add_hours(instant: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    instant + Duration::milliseconds((hours * MILLIS_PER_HOUR).round() as i64)
}

/// Hours of driving needed to cover `total_distance` at `avg_speed`, rounded up
/// to a whole hour.
///
/// # Errors
///
/// Returns [`HosError::InvalidPlanInput`] if the speed is not strictly positive
/// or the distance is negative or not finite.
pub fn driving_hours_for(total_distance: f64, avg_speed: f64) -> Result<f64, HosError> {
    if !total_distance.is_finite() || total_distance < 0.0 {
        return Err(HosError::InvalidPlanInput(format!(
            "total_distance must be a non-negative number, got {total_distance}"
        )));
    }
    if !avg_speed.is_finite() || avg_speed <= 0.0 {
        return Err(HosError::InvalidPlanInput(format!(
            "avg_speed must be greater than zero, got {avg_speed}"
        )));
    }
    Ok((total_distance / avg_speed).ceil())
}

/// Parse an IANA timezone name.
pub fn parse_timezone(s: &str) -> Result<Tz, HosError> {
    s.parse::<Tz>()
        .map_err(|_| HosError::InvalidTimezone(format!("'{}'", s)))
}

/// Parse a timestamp into UTC.
///
/// RFC 3339 strings carry their own offset. Naive `YYYY-MM-DDTHH:MM[:SS]` or
/// `YYYY-MM-DD HH:MM[:SS]` strings are read as wall-clock time in `tz`.
///
/// # Errors
///
/// Returns [`HosError::InvalidDatetime`] if no layout matches, or if the local
/// time is ambiguous or skipped by a DST transition in `tz`.
pub fn parse_timestamp(s: &str, tz: &Tz) -> Result<DateTime<Utc>, HosError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| HosError::InvalidDatetime(format!("'{}'", s)))?;

    tz.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            HosError::InvalidDatetime(format!(
                "'{}' is ambiguous or does not exist in {}",
                s,
                tz.name()
            ))
        })
}

/// Render hours without trailing zeros: `11`, `2.5`, `0.25`.
pub fn format_hours(hours: f64) -> String {
    let fixed = format!("{hours:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    // ── conversions ─────────────────────────────────────────────────────

    #[test]
    fn test_minutes_to_hours() {
        assert_eq!(minutes_to_hours(660), 11.0);
        assert_eq!(minutes_to_hours(90), 1.5);
        assert_eq!(minutes_to_hours(0), 0.0);
    }

    #[test]
    fn test_hours_between_fractional() {
        let start = utc("2024-01-01T06:00:00Z");
        let end = utc("2024-01-01T08:45:00Z");
        assert_eq!(hours_between(start, end), 2.75);
        assert_eq!(hours_between(end, start), -2.75);
    }

    #[test]
    fn test_minutes_between_truncates() {
        let start = utc("2024-01-01T06:00:00Z");
        let end = utc("2024-01-01T06:10:59Z");
        assert_eq!(minutes_between(start, end), 10);
    }

    #[test]
    fn test_add_hours_round_trips_hours_between() {
        let start = utc("2024-01-01T06:00:00Z");
        let end = utc("2024-01-02T01:17:23Z");
        assert_eq!(add_hours(start, hours_between(start, end)), end);
    }

    #[test]
    fn test_add_hours_fractional() {
        let start = utc("2024-01-01T06:00:00Z");
        assert_eq!(add_hours(start, 1.5), utc("2024-01-01T07:30:00Z"));
    }

    // ── driving_hours_for ───────────────────────────────────────────────

    #[test]
    fn test_driving_hours_rounds_up() {
        assert_eq!(driving_hours_for(610.0, 60.0).unwrap(), 11.0);
        assert_eq!(driving_hours_for(600.0, 60.0).unwrap(), 10.0);
        assert_eq!(driving_hours_for(0.0, 60.0).unwrap(), 0.0);
    }

    #[test]
    fn test_driving_hours_rejects_zero_speed() {
        let err = driving_hours_for(100.0, 0.0).unwrap_err().to_string();
        assert!(err.contains("avg_speed"), "got: {err}");
    }

    #[test]
    fn test_driving_hours_rejects_negative_distance() {
        assert!(driving_hours_for(-5.0, 50.0).is_err());
        assert!(driving_hours_for(f64::NAN, 50.0).is_err());
    }

    // ── parsing ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-01-01T06:00:00-05:00", &Tz::UTC).unwrap();
        assert_eq!(dt, utc("2024-01-01T11:00:00Z"));
    }

    #[test]
    fn test_parse_naive_minutes_in_utc() {
        let dt = parse_timestamp("2024-01-01T06:00", &Tz::UTC).unwrap();
        assert_eq!(dt, utc("2024-01-01T06:00:00Z"));
    }

    #[test]
    fn test_parse_naive_with_space_in_zone() {
        let tz = parse_timezone("America/Chicago").unwrap();
        let dt = parse_timestamp("2024-01-01 06:00:00", &tz).unwrap();
        assert_eq!(dt, utc("2024-01-01T12:00:00Z"));
    }

    #[test]
    fn test_parse_nonexistent_local_time() {
        // 2024-03-10 02:30 is skipped by the US spring-forward transition
        let tz = parse_timezone("America/New_York").unwrap();
        let err = parse_timestamp("2024-03-10T02:30", &tz).unwrap_err().to_string();
        assert!(err.contains("does not exist"), "got: {err}");
    }

    #[test]
    fn test_parse_garbage_timestamp() {
        let err = parse_timestamp("tomorrow", &Tz::UTC).unwrap_err().to_string();
        assert!(err.contains("Invalid datetime"), "got: {err}");
    }

    #[test]
    fn test_parse_invalid_timezone() {
        let err = parse_timezone("Mars/Olympus").unwrap_err().to_string();
        assert!(err.contains("Invalid timezone"), "got: {err}");
    }

    // ── format_hours ────────────────────────────────────────────────────

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(11.0), "11");
        assert_eq!(format_hours(2.5), "2.5");
        assert_eq!(format_hours(0.25), "0.25");
        assert_eq!(format_hours(70.0), "70");
        assert_eq!(format_hours(0.0), "0");
    }
}
