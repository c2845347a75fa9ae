//! Timestamp and duration parsing for Prometheus API parameters.
//!
//! Prometheus accepts RFC3339 or Unix timestamps, and durations either in
//! its own `1h30m` notation or as float seconds. Inputs are validated here
//! so a malformed value fails the tool call with a readable message instead
//! of a generic `bad_data` from the server.

use std::sync::OnceLock;
use std::time::Duration;

use chrono::DateTime;
use regex::Regex;

use crate::error::PrometheusError;

/// Parse an RFC3339 or Unix timestamp into the Unix-seconds string sent to
/// Prometheus.
pub fn parse_timestamp(input: &str) -> Result<String, PrometheusError> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        let millis = dt.timestamp_subsec_millis();
        return Ok(if millis == 0 {
            dt.timestamp().to_string()
        } else {
            format!("{}.{:03}", dt.timestamp(), millis)
        });
    }
    match trimmed.parse::<f64>() {
        Ok(secs) if secs.is_finite() => Ok(trimmed.to_string()),
        _ => Err(PrometheusError::InvalidTime(input.to_string())),
    }
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:(\d+)y)?(?:(\d+)w)?(?:(\d+)d)?(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?(?:(\d+)ms)?$",
        )
        .expect("duration regex is valid")
    })
}

/// Parse a Prometheus duration (`5m`, `1h30m`, `250ms`) or float seconds.
pub fn parse_duration(input: &str) -> Result<Duration, PrometheusError> {
    let trimmed = input.trim();
    let invalid = || PrometheusError::InvalidDuration(input.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    if let Ok(secs) = trimmed.parse::<f64>() {
        if secs < 0.0 {
            return Err(invalid());
        }
        return Duration::try_from_secs_f64(secs).map_err(|_| invalid());
    }

    let caps = duration_regex().captures(trimmed).ok_or_else(invalid)?;
    // y, w, d, h, m, s in milliseconds; the last group is already ms.
    const UNIT_MS: [u64; 7] = [
        365 * 24 * 3_600_000,
        7 * 24 * 3_600_000,
        24 * 3_600_000,
        3_600_000,
        60_000,
        1_000,
        1,
    ];

    let mut total_ms: u64 = 0;
    for (idx, unit) in UNIT_MS.iter().enumerate() {
        if let Some(m) = caps.get(idx + 1) {
            let n: u64 = m.as_str().parse().map_err(|_| invalid())?;
            total_ms = n
                .checked_mul(*unit)
                .and_then(|v| total_ms.checked_add(v))
                .ok_or_else(invalid)?;
        }
    }
    Ok(Duration::from_millis(total_ms))
}

/// Validate a query resolution step. Must be strictly positive.
pub fn parse_step(input: &str) -> Result<String, PrometheusError> {
    let d = parse_duration(input)?;
    if d.is_zero() {
        return Err(PrometheusError::InvalidDuration(input.to_string()));
    }
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("2023-01-01T00:00:00Z", "1672531200" ; "rfc3339 utc")]
    #[test_case("2023-01-01T01:00:00+01:00", "1672531200" ; "rfc3339 offset")]
    #[test_case("2023-01-01T00:00:00.250Z", "1672531200.250" ; "rfc3339 millis")]
    #[test_case("1672531200", "1672531200" ; "unix integer")]
    #[test_case("1672531200.5", "1672531200.5" ; "unix float")]
    #[test_case("  1672531200 ", "1672531200" ; "trimmed")]
    fn timestamps_accepted(input: &str, expected: &str) {
        assert_eq!(parse_timestamp(input).unwrap(), expected);
    }

    #[test_case("yesterday" ; "word")]
    #[test_case("" ; "empty")]
    #[test_case("2023-13-01T00:00:00Z" ; "bad month")]
    #[test_case("NaN" ; "nan")]
    fn timestamps_rejected(input: &str) {
        assert!(matches!(
            parse_timestamp(input),
            Err(PrometheusError::InvalidTime(_))
        ));
    }

    #[test_case("15s", 15_000 ; "seconds")]
    #[test_case("1m", 60_000 ; "minutes")]
    #[test_case("1h30m", 5_400_000 ; "compound")]
    #[test_case("500ms", 500 ; "millis")]
    #[test_case("1d", 86_400_000 ; "days")]
    #[test_case("1w", 604_800_000 ; "weeks")]
    #[test_case("30", 30_000 ; "bare seconds")]
    #[test_case("0.5", 500 ; "float seconds")]
    fn durations_accepted(input: &str, expected_ms: u128) {
        assert_eq!(parse_duration(input).unwrap().as_millis(), expected_ms);
    }

    #[test_case("" ; "empty")]
    #[test_case("5x" ; "bad unit")]
    #[test_case("m5" ; "unit first")]
    #[test_case("30m1h" ; "wrong order")]
    #[test_case("-5" ; "negative")]
    #[test_case("1e300" ; "float overflow")]
    #[test_case("18446744073709551616" ; "past u64 seconds")]
    #[test_case("inf" ; "infinite")]
    #[test_case("NaN" ; "nan")]
    fn durations_rejected(input: &str) {
        assert!(matches!(
            parse_duration(input),
            Err(PrometheusError::InvalidDuration(_))
        ));
    }

    #[test]
    fn zero_step_rejected() {
        assert!(parse_step("0s").is_err());
        assert!(parse_step("0").is_err());
        assert_eq!(parse_step("1m").unwrap(), "1m");
    }
}
