//! Lenient numeric field parsing for pasted columns
//!
//! Spreadsheet pastes carry stray units, thousands noise and half-typed
//! cells. Fields are read from their leading numeric prefix; anything that
//! has no prefix reads as zero rather than failing the row.

use regex::Regex;
use std::sync::LazyLock;

static INTEGER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("valid integer prefix pattern"));

static DECIMAL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("valid decimal prefix pattern")
});

/// Parse the leading integer of a field, e.g. `"12"`, `"3rd"`, `"1.9"` -> 1
///
/// Returns `None` when the field has no leading digits. Values beyond the
/// range of an `i64` saturate, so a huge pump number still reads as positive.
pub fn parse_leading_int(field: &str) -> Option<i64> {
    let matched = INTEGER_PREFIX.find(field.trim_start())?.as_str();
    match matched.parse::<i64>() {
        Ok(value) => Some(value),
        // The prefix is all digits, so the only failure left is overflow
        Err(_) if matched.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

/// Parse the leading decimal of a field, e.g. `"254.99"`, `"254.99L"`, `".5"`
pub fn parse_leading_float(field: &str) -> Option<f64> {
    let matched = DECIMAL_PREFIX.find(field.trim_start())?;
    matched.as_str().parse::<f64>().ok().filter(|value| !value.is_nan())
}

/// Integer field, zero when unparseable
pub fn int_or_zero(field: &str) -> i64 {
    parse_leading_int(field).unwrap_or(0)
}

/// Decimal field, zero when unparseable
pub fn float_or_zero(field: &str) -> f64 {
    parse_leading_float(field).unwrap_or(0.0)
}
