//! Human-readable number abbreviations (K / M / B / T / scientific).

/// Default threshold for the "K" suffix.
pub const K_THRESHOLD: f64 = 1_000.0;
/// Default threshold for the "M" suffix.
pub const M_THRESHOLD: f64 = 1_000_000.0;
/// Default threshold for the "B" suffix.
pub const B_THRESHOLD: f64 = 1_000_000_000.0;

/// Format a number with the default thresholds (e.g. 1500 → "1.5K").
pub fn format_number(n: f64) -> String {
    format_number_with(n, K_THRESHOLD, M_THRESHOLD, B_THRESHOLD)
}

/// Format a number with custom suffix thresholds.
///
/// The "T" threshold is always `b * 1000`, and anything at or above
/// `1000 * T` switches to scientific notation. The K and M divisors are fixed
/// (1e3 and 1e6) even when their thresholds are raised, so
/// `format_number_with(5e6, 1e3, 1e7, 1e9)` is `"5000K"`.
pub fn format_number_with(n: f64, k: f64, m: f64, b: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    if n < 0.0 {
        return format!("-{}", format_number_with(-n, k, m, b));
    }

    let t = b * 1_000.0;
    if n >= t * 1_000.0 {
        scientific(n)
    } else if n >= t {
        suffixed(n / t, 'T')
    } else if n >= b {
        suffixed(n / b, 'B')
    } else if n >= m {
        suffixed(n / 1_000_000.0, 'M')
    } else if n >= k {
        suffixed(n / 1_000.0, 'K')
    } else if n >= 1.0 {
        format!("{}", n.round() as u64)
    } else if n > 0.0 {
        fraction(n)
    } else {
        "0".to_string()
    }
}

/// One decimal place, with a trailing ".0" dropped.
fn suffixed(scaled: f64, suffix: char) -> String {
    let s = format!("{scaled:.1}");
    let s = s.strip_suffix(".0").unwrap_or(&s);
    format!("{s}{suffix}")
}

/// Up to three decimals with trailing zeros stripped (0.5 → "0.5").
fn fraction(n: f64) -> String {
    let s = format!("{n:.3}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Two fractional digits and an explicitly signed exponent ("1.23e+15").
fn scientific(n: f64) -> String {
    let s = format!("{n:.2e}");
    match s.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}e+{exp}"),
        None => s,
    }
}
