use chrono::{DateTime, NaiveDateTime, Utc};

/// Convert a reset timestamp into a display countdown and seconds remaining.
///
/// `seconds = max(reset - now, 0)`. Unparseable input yields `("", 0.0)`
/// rather than an error; the window simply shows no countdown.
pub fn normalize(resets_at: &str, now: DateTime<Utc>) -> (String, f64) {
    let Some(reset) = parse_reset_time(resets_at) else {
        return (String::new(), 0.0);
    };
    let remaining = ((reset - now).num_milliseconds() as f64 / 1000.0).max(0.0);
    (reset_string(remaining), remaining)
}

/// Fractional-aware RFC 3339 first, plain `...SZ` as fallback.
fn parse_reset_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SZ")
                .map(|naive| naive.and_utc())
                .ok()
        })
}

/// Largest two non-zero units of {days, hours, minutes}: "1d3h", "2h15m",
/// "45m"; zero or negative renders "now".
pub fn reset_string(seconds: f64) -> String {
    if seconds <= 0.0 {
        return "now".to_string();
    }
    let total = seconds as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    if days > 0 {
        format!("{}d{}h", days, hours)
    } else if hours > 0 {
        format!("{}h{}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn reset_string_unit_boundaries() {
        assert_eq!(reset_string(90_061.0), "1d1h");
        assert_eq!(reset_string(86_400.0), "1d0h");
        assert_eq!(reset_string(86_399.0), "23h59m");
        assert_eq!(reset_string(3_661.0), "1h1m");
        assert_eq!(reset_string(3_600.0), "1h0m");
        assert_eq!(reset_string(3_599.0), "59m");
        assert_eq!(reset_string(45.0), "0m");
        assert_eq!(reset_string(0.0), "now");
        assert_eq!(reset_string(-10.0), "now");
    }

    #[test]
    fn normalize_future_reset() {
        let now = at(1_700_000_000);
        let (label, seconds) = normalize("2023-11-14T23:28:38Z", now);
        // 1_700_004_518 - 1_700_000_000 = 4518s = 1h15m
        assert!((seconds - 4_518.0).abs() < 1e-9);
        assert_eq!(label, "1h15m");
    }

    #[test]
    fn normalize_accepts_fractional_seconds() {
        let now = at(1_700_000_000);
        let (_, plain) = normalize("2023-11-14T23:28:38Z", now);
        let (_, fractional) = normalize("2023-11-14T23:28:38.500Z", now);
        assert!((fractional - plain - 0.5).abs() < 1e-9);
    }

    #[test]
    fn normalize_accepts_offset_timestamps() {
        let now = at(1_700_000_000);
        let (_, from_z) = normalize("2023-11-14T23:28:38Z", now);
        let (_, from_offset) = normalize("2023-11-15T00:28:38+01:00", now);
        assert!((from_z - from_offset).abs() < 1e-9);
    }

    #[test]
    fn normalize_past_reset_clamps_to_now() {
        let now = at(1_700_000_000);
        let (label, seconds) = normalize("2020-01-01T00:00:00Z", now);
        assert_eq!(label, "now");
        assert!(seconds.abs() < f64::EPSILON);
    }

    #[test]
    fn normalize_unparseable_yields_empty() {
        let (label, seconds) = normalize("not-a-date", at(0));
        assert!(label.is_empty());
        assert!(seconds.abs() < f64::EPSILON);
    }

    #[test]
    fn countdown_is_non_increasing_as_now_advances() {
        let reset = "2023-11-15T00:00:00Z";
        let mut previous = f64::MAX;
        for offset in [0, 1_000, 10_000, 100_000] {
            let (_, seconds) = normalize(reset, at(1_699_900_000 + offset));
            assert!(seconds <= previous);
            previous = seconds;
        }
    }
}
