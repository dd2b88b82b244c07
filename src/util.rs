// Utility helpers for parsing and basic statistics.
//
// This module centralizes the "dirty" cell handling so the rest of the code
// can assume clean, typed values.
use crate::schema::is_null_token;
use num_format::{Locale, ToFormattedString};

/// Coerce a raw cell into `f64`, turning anything unusable into `None`.
///
/// - Trims whitespace.
/// - Null tokens (`""`, `NA`, `NaN`, ...) are missing.
/// - Text that does not parse as a number is missing, not an error.
/// - Infinities are missing too; a canonical table only holds finite values.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if is_null_token(s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a production year. Accepts integral floats such as `2019.0`, which
/// is how a year column round-trips through float-typed tooling.
pub fn parse_year_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let v = parse_f64_safe(Some(s))?;
    if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return None;
    }
    Some(v as i32)
}

/// Parse a non-negative whole count, with the same `3.0` leniency as years.
pub fn parse_count_safe(s: Option<&str>) -> Option<u32> {
    let v = parse_f64_safe(s)?;
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return None;
    }
    Some(v as u32)
}

/// Arithmetic mean; `None` for an empty slice rather than a NaN.
pub fn average(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

/// Relative change from `previous` to `current`, 0 when there is no usable
/// baseline.
pub fn relative_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous
    } else {
        0.0
    }
}

/// Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
///
/// Grouping works on the rendered digits, so magnitude is unbounded, and a
/// value that rounds to zero never carries a minus sign.
pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let s = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let sep = Locale::en.separator();
    let mut res = String::with_capacity(s.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            res.push_str(sep);
        }
        res.push(ch);
    }
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    let rounds_to_zero = s.bytes().all(|b| b == b'0' || b == b'.');
    if n.is_sign_negative() && !rounds_to_zero {
        format!("-{}", res)
    } else {
        res
    }
}

/// `format_number` with a prefix/suffix, rendering a missing value as `N/A`.
pub fn format_metric(value: Option<f64>, prefix: &str, suffix: &str, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => {
            format!("{}{}{}", prefix, format_number(v, decimals), suffix)
        }
        _ => "N/A".to_string(),
    }
}

pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
