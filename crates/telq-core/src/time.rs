use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{Result, TelqError};

/// Resolves a textual time bound against a reference instant.
///
/// Accepts either a relative duration like `15m`, `1h`, `7d` (that much time
/// before `now`) or an absolute ISO 8601 timestamp. The empty string and the
/// literal `now` resolve to `now` itself. Relative parsing is always tried
/// before the absolute forms.
pub fn parse_time_or_relative(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if input.is_empty() || input == "now" {
        return Ok(now);
    }

    if let Ok(delta) = parse_relative_duration(input) {
        return Ok(now - delta);
    }

    // Handles both plain RFC3339 and sub-second precision.
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(TelqError::UnparseableTime(input.to_string()))
}

/// Parses a relative duration token like `15m`, `1h`, `24h`, `7d`, `2w`.
/// The numeric part may be fractional.
fn parse_relative_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s.len() < 2 {
        return Err(TelqError::InvalidDuration(format!("{s:?} is too short")));
    }

    let unit = s.chars().next_back().unwrap_or(' ');
    let num_str = &s[..s.len() - unit.len_utf8()];
    let num: f64 = num_str
        .parse()
        .map_err(|e| TelqError::InvalidDuration(format!("{s:?}: {e}")))?;

    let secs = match unit {
        's' => num,
        'm' => num * 60.0,
        'h' => num * 3600.0,
        'd' => num * 86_400.0,
        'w' => num * 7.0 * 86_400.0,
        _ => {
            return Err(TelqError::InvalidDuration(format!(
                "unknown unit {unit:?} in {s:?} (use s, m, h, d, or w)"
            )));
        }
    };

    Ok(Duration::nanoseconds((secs * 1e9) as i64))
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_and_now_return_reference_instant() {
        let now = fixed_now();
        assert_eq!(parse_time_or_relative("", now).unwrap(), now);
        assert_eq!(parse_time_or_relative("now", now).unwrap(), now);
    }

    #[test]
    fn relative_durations() {
        let now = fixed_now();
        let cases = [
            ("30s", Duration::seconds(30)),
            ("15m", Duration::minutes(15)),
            ("1h", Duration::hours(1)),
            ("24h", Duration::hours(24)),
            ("7d", Duration::days(7)),
            ("2w", Duration::days(14)),
        ];
        for (input, delta) in cases {
            assert_eq!(
                parse_time_or_relative(input, now).unwrap(),
                now - delta,
                "input {input}"
            );
        }
    }

    #[test]
    fn fractional_durations() {
        let now = fixed_now();
        assert_eq!(
            parse_time_or_relative("1.5h", now).unwrap(),
            now - Duration::minutes(90)
        );
        assert_eq!(
            parse_time_or_relative("0.5d", now).unwrap(),
            now - Duration::hours(12)
        );
    }

    #[test]
    fn rfc3339() {
        let got = parse_time_or_relative("2024-01-01T00:00:00Z", fixed_now()).unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rfc3339_with_offset() {
        let got = parse_time_or_relative("2024-06-15T08:30:00+05:00", fixed_now()).unwrap();
        let want = FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 15, 8, 30, 0)
            .unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn rfc3339_with_subsecond_precision() {
        let got = parse_time_or_relative("2024-01-01T00:00:00.250Z", fixed_now()).unwrap();
        assert_eq!(got.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn naive_datetime_assumes_utc() {
        let got = parse_time_or_relative("2024-01-01T15:30:00", fixed_now()).unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2024, 1, 1, 15, 30, 0).unwrap());
    }

    #[test]
    fn bare_date_assumes_utc_midnight() {
        let got = parse_time_or_relative("2024-01-01", fixed_now()).unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        for input in ["foobar", "x", "12q", "--"] {
            let err = parse_time_or_relative(input, fixed_now()).unwrap_err();
            assert!(
                matches!(err, TelqError::UnparseableTime(_)),
                "input {input}: {err}"
            );
        }
    }

    #[test]
    fn relative_duration_reports_bad_unit() {
        let err = parse_relative_duration("15q").unwrap_err();
        assert!(matches!(err, TelqError::InvalidDuration(_)));
        assert!(err.to_string().contains("s, m, h, d, or w"));
    }
}
