//! Duration normalization utilities.
//!
//! FlowMonitor encodes accumulated times as signed decimal strings with a
//! unit suffix (e.g. "+1.5e+09ns"). This module turns those strings into
//! seconds.

/// A fixed time-unit literal and how many of it make one second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnit {
    pub suffix: &'static str,
    pub per_second: f64,
}

/// Nanoseconds, the unit FlowMonitor writes for delay and jitter sums
pub const NANOSECONDS: TimeUnit = TimeUnit {
    suffix: "ns",
    per_second: 1e9,
};

/// Sign literal that may prefix the value
const SIGN: char = '+';

/// Convert a unit-suffixed duration string to seconds.
///
/// Strips whitespace, the `+` sign and the unit suffix, then parses the rest
/// as a decimal (scientific notation allowed). Anything that does not parse
/// to a finite number yields `0.0`; this function never fails.
///
/// # Examples
/// ```
/// use iotsec_metrics::utils::duration::{normalize_duration, NANOSECONDS};
///
/// assert_eq!(normalize_duration("1000000000ns", NANOSECONDS), 1.0);
/// assert_eq!(normalize_duration("+2.5e9ns", NANOSECONDS), 2.5);
/// assert_eq!(normalize_duration(None, NANOSECONDS), 0.0);
/// assert_eq!(normalize_duration("abc", NANOSECONDS), 0.0);
/// ```
pub fn normalize_duration<'a>(value: impl Into<Option<&'a str>>, unit: TimeUnit) -> f64 {
    let Some(raw) = value.into() else {
        return 0.0;
    };

    let cleaned = raw.trim().replace(SIGN, "").replace(unit.suffix, "");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v / unit.per_second,
        _ => 0.0,
    }
}

/// [`normalize_duration`] for nanosecond-encoded values.
pub fn nanos_to_seconds<'a>(value: impl Into<Option<&'a str>>) -> f64 {
    normalize_duration(value, NANOSECONDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanos_to_seconds() {
        assert_eq!(nanos_to_seconds("1000000000ns"), 1.0);
        assert_eq!(nanos_to_seconds("+2.5e9ns"), 2.5);
        assert_eq!(nanos_to_seconds("500000000ns"), 0.5);

        // FlowMonitor writes the exponent sign too
        assert_eq!(nanos_to_seconds("+1.5e+09ns"), 1.5);
        assert_eq!(nanos_to_seconds("  +3e9ns \n"), 3.0);
        assert_eq!(nanos_to_seconds("0ns"), 0.0);
        assert_eq!(nanos_to_seconds("-1000000000ns"), -1.0);

        // No suffix is still a nanosecond count
        assert_eq!(nanos_to_seconds("2000000000"), 2.0);
    }

    #[test]
    fn test_nanos_to_seconds_fallback() {
        assert_eq!(nanos_to_seconds(""), 0.0);
        assert_eq!(nanos_to_seconds("   "), 0.0);
        assert_eq!(nanos_to_seconds(None), 0.0);
        assert_eq!(nanos_to_seconds("abc"), 0.0);
        assert_eq!(nanos_to_seconds("ns"), 0.0);
        assert_eq!(nanos_to_seconds("+"), 0.0);
        assert_eq!(nanos_to_seconds("1.2.3ns"), 0.0);
        assert_eq!(nanos_to_seconds("infns"), 0.0);
        assert_eq!(nanos_to_seconds("NaNns"), 0.0);
    }

    #[test]
    fn test_other_units() {
        let micros = TimeUnit {
            suffix: "us",
            per_second: 1e6,
        };
        assert_eq!(normalize_duration("+250000us", micros), 0.25);
        assert_eq!(normalize_duration("250000ns", micros), 0.0);
    }
}
