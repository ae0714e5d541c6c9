//! Age expression parsing.
//!
//! Upstream age strings are inconsistent ("5d", "2w", "1mo", "1y", "12:30",
//! bare numbers), so units are detected by substring containment rather than a
//! strict grammar. Check order is year, month, week, day, clock time, bare
//! number, and must not change: malformed strings can satisfy several checks.

use serde_json::Value;

const DAYS_PER_YEAR: f64 = 365.0;
const DAYS_PER_MONTH: f64 = 30.0;
const DAYS_PER_WEEK: f64 = 7.0;

/// Converts a free-form age expression into whole days.
///
/// Never fails: anything unparseable yields `0`, and negative values clamp
/// to `0`. Fractions round to the nearest day, halves rounding up.
///
/// ## Supported Forms
///
/// - `y` - years (365 days)
/// - `mo` - months (30 days)
/// - `w` - weeks (7 days)
/// - `d` - days
/// - `HH:MM` - a time of day, which always means "today" (`0`)
/// - a bare number - days
///
/// ## Examples
///
/// ```
/// use merges_lib::parse_duration;
///
/// assert_eq!(parse_duration("5d"), 5);
/// assert_eq!(parse_duration("1.5w"), 11);
/// assert_eq!(parse_duration("0.5y"), 183);
/// assert_eq!(parse_duration("12:30"), 0);
/// assert_eq!(parse_duration("garbage"), 0);
/// ```
pub fn parse_duration(input: &str) -> u32 {
    let normalized = input.trim().to_lowercase();

    if normalized.contains('y') {
        scaled(&normalized, DAYS_PER_YEAR)
    } else if normalized.contains("mo") {
        scaled(&normalized, DAYS_PER_MONTH)
    } else if normalized.contains('w') {
        scaled(&normalized, DAYS_PER_WEEK)
    } else if normalized.contains('d') {
        scaled(&normalized, 1.0)
    } else if normalized.contains(':') {
        0
    } else {
        normalized.parse::<f64>().map(round_days).unwrap_or(0)
    }
}

/// Converts a JSON age value into whole days.
///
/// `None` and `null` yield `0`. Numbers are read through their textual form,
/// so `5` and `"5"` agree. Booleans, arrays and objects yield `0`.
///
/// ## Examples
///
/// ```
/// use merges_lib::parse_duration_value;
/// use serde_json::json;
///
/// assert_eq!(parse_duration_value(Some(&json!("2w"))), 14);
/// assert_eq!(parse_duration_value(Some(&json!(3))), 3);
/// assert_eq!(parse_duration_value(Some(&json!(null))), 0);
/// assert_eq!(parse_duration_value(None), 0);
/// ```
pub fn parse_duration_value(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::String(s)) => parse_duration(s),
        Some(Value::Number(n)) => parse_duration(&n.to_string()),
        _ => 0,
    }
}

fn scaled(normalized: &str, unit_days: f64) -> u32 {
    leading_number(normalized)
        .map(|amount| round_days(amount * unit_days))
        .unwrap_or(0)
}

fn round_days(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX
    value.round() as u32
}

/// Reads the numeric prefix of `s`: optional sign, digits, optional fraction,
/// optional exponent. Returns `None` when no digit leads the string.
fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
