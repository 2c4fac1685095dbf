//! Numeric coercion shared by the mapper and the metrics engine.

use serde_json::Value;

/// Coerce a loosely-typed upstream amount into a non-negative integer.
///
/// Accepts a JSON number, a numeric string, `null`, or nothing at all.
/// Strings are read like a leading-integer parse: optional whitespace and
/// sign, then digits up to the first non-digit (`"1500000.50"` is 1500000,
/// `"12abc"` is 12). Anything unparsable, negative, or non-finite is 0.
pub fn parse_amount(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                u
            } else if let Some(f) = n.as_f64() {
                float_to_amount(f)
            } else {
                0
            }
        }
        Some(Value::String(s)) => parse_amount_str(s),
        _ => 0,
    }
}

/// String half of [`parse_amount`].
pub fn parse_amount_str(raw: &str) -> u64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 || negative {
        return 0;
    }

    // Saturate instead of failing on absurdly long digit runs.
    digits[..end].parse::<u64>().unwrap_or(u64::MAX)
}

fn float_to_amount(f: f64) -> u64 {
    if !f.is_finite() || f <= 0.0 {
        0
    } else {
        f.trunc() as u64
    }
}

/// Sum of amounts, clamped at `u64::MAX` instead of overflowing.
pub fn saturating_total<I>(amounts: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    amounts.into_iter().fold(0, u64::saturating_add)
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Round to one decimal place for presentation.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean of the values, or 0 when there are none.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
