use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::error::{DashboardError, Result};

// ── Durations ─────────────────────────────────────────────────────────────────

/// Convert an `H:MM` / `HH:MM` duration string into total minutes.
///
/// Both components are parsed as decimal numbers and are not range checked,
/// so `"0:75"` yields `75.0`.
///
/// # Examples
///
/// ```
/// use pump_core::time_utils::time_to_mins;
///
/// assert_eq!(time_to_mins("1:30").unwrap(), 90.0);
/// assert_eq!(time_to_mins("0:45").unwrap(), 45.0);
/// assert!(time_to_mins("45").is_err());
/// ```
pub fn time_to_mins(time: &str) -> Result<f64> {
    let bad = || DashboardError::DurationFormat(time.to_string());

    let (hours, minutes) = time.split_once(':').ok_or_else(bad)?;
    if minutes.contains(':') {
        return Err(bad());
    }

    let hours: f64 = hours.trim().parse().map_err(|_| bad())?;
    let minutes: f64 = minutes.trim().parse().map_err(|_| bad())?;

    Ok(hours * 60.0 + minutes)
}

/// Convert an optional duration cell; blank cells stay `None`.
pub fn optional_minutes(cell: Option<&str>) -> Result<Option<f64>> {
    match cell.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => time_to_mins(s).map(Some),
    }
}

// ── Volumes ───────────────────────────────────────────────────────────────────

/// Parse a `"<number>mL"` condition string into millilitres.
///
/// The trailing two characters are dropped whatever they are, then the rest
/// must parse as a float.
pub fn parse_volume_ml(cell: Option<&str>) -> Result<f64> {
    let raw = cell.ok_or_else(|| DashboardError::VolumeFormat(String::new()))?;

    let cut = raw
        .char_indices()
        .rev()
        .nth(1)
        .map(|(i, _)| i)
        .ok_or_else(|| DashboardError::VolumeFormat(raw.to_string()))?;

    raw[..cut]
        .trim()
        .parse::<f64>()
        .map_err(|_| DashboardError::VolumeFormat(raw.to_string()))
}

// ── Timestamps ────────────────────────────────────────────────────────────────

/// Naive formats accepted for the `Start` column, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M %p",
];

/// Parse a care-log `Start` timestamp into a naive local datetime.
///
/// Exports carry wall-clock times; an RFC 3339 offset, when present, is
/// dropped so the calendar date stays the one the caregiver saw.  Date-only
/// values are taken at midnight.
pub fn parse_start_timestamp(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(DashboardError::TimestampParse(s.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive);
        }
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(midnight);
            }
        }
    }

    warn!("could not parse timestamp \"{}\"", s);
    Err(DashboardError::TimestampParse(s.to_string()))
}

/// Dataset label for a calendar date, e.g. `"2024-03-01"`.
pub fn date_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a dataset label back into a date.
pub fn parse_date_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label, "%Y-%m-%d").ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    // ── time_to_mins ──────────────────────────────────────────────────────────

    #[test]
    fn test_time_to_mins_basic() {
        assert_eq!(time_to_mins("1:30").unwrap(), 90.0);
        assert_eq!(time_to_mins("0:45").unwrap(), 45.0);
        assert_eq!(time_to_mins("12:05").unwrap(), 725.0);
    }

    #[test]
    fn test_time_to_mins_minutes_not_bounded() {
        assert_eq!(time_to_mins("0:75").unwrap(), 75.0);
    }

    #[test]
    fn test_time_to_mins_decimal_components() {
        assert_eq!(time_to_mins("0:2.5").unwrap(), 2.5);
    }

    #[test]
    fn test_time_to_mins_missing_colon() {
        assert!(matches!(
            time_to_mins("90"),
            Err(DashboardError::DurationFormat(_))
        ));
    }

    #[test]
    fn test_time_to_mins_too_many_colons() {
        assert!(time_to_mins("1:30:00").is_err());
    }

    #[test]
    fn test_time_to_mins_non_numeric() {
        assert!(time_to_mins("a:30").is_err());
        assert!(time_to_mins("1:xx").is_err());
    }

    #[test]
    fn test_optional_minutes_blank_is_none() {
        assert_eq!(optional_minutes(None).unwrap(), None);
        assert_eq!(optional_minutes(Some("  ")).unwrap(), None);
        assert_eq!(optional_minutes(Some("0:20")).unwrap(), Some(20.0));
    }

    // ── parse_volume_ml ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_volume_ml() {
        assert_eq!(parse_volume_ml(Some("20mL")).unwrap(), 20.0);
        assert_eq!(parse_volume_ml(Some("15.5mL")).unwrap(), 15.5);
        assert_eq!(parse_volume_ml(Some("0mL")).unwrap(), 0.0);
    }

    #[test]
    fn test_parse_volume_ml_strips_any_two_char_suffix() {
        assert_eq!(parse_volume_ml(Some("30oz")).unwrap(), 30.0);
    }

    #[test]
    fn test_parse_volume_ml_missing_or_malformed() {
        assert!(matches!(
            parse_volume_ml(None),
            Err(DashboardError::VolumeFormat(_))
        ));
        assert!(parse_volume_ml(Some("mL")).is_err());
        assert!(parse_volume_ml(Some("m")).is_err());
        assert!(parse_volume_ml(Some("lotsmL")).is_err());
    }

    // ── parse_start_timestamp ─────────────────────────────────────────────────

    #[test]
    fn test_parse_start_timestamp_minutes() {
        let ts = parse_start_timestamp("2024-03-01 07:45").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(ts.hour(), 7);
        assert_eq!(ts.minute(), 45);
    }

    #[test]
    fn test_parse_start_timestamp_rfc3339_keeps_wall_clock_date() {
        let ts = parse_start_timestamp("2024-03-01T23:30:00-05:00").unwrap();
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.hour(), 23);
    }

    #[test]
    fn test_parse_start_timestamp_us_format() {
        let ts = parse_start_timestamp("03/02/2024 08:10").unwrap();
        assert_eq!(ts.month(), 3);
        assert_eq!(ts.day(), 2);
    }

    #[test]
    fn test_parse_start_timestamp_date_only() {
        let ts = parse_start_timestamp("2024-03-04").unwrap();
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.day(), 4);
    }

    #[test]
    fn test_parse_start_timestamp_garbage() {
        assert!(matches!(
            parse_start_timestamp("yesterday-ish"),
            Err(DashboardError::TimestampParse(_))
        ));
        assert!(parse_start_timestamp("").is_err());
    }

    // ── labels ────────────────────────────────────────────────────────────────

    #[test]
    fn test_date_label_round_trip() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(date_label(d), "2024-01-09");
        assert_eq!(parse_date_label("2024-01-09"), Some(d));
        assert_eq!(parse_date_label("notes"), None);
    }
}
