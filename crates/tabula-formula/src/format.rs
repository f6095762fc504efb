//! Result formatting
//!
//! Renders an [`EvaluationResult`] as cell display text. The output is never empty:
//! a missing value shows as an em-dash and any failure as the literal `Error`.

use crate::evaluator::EvaluationResult;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Display text for a result with no value
pub const NO_VALUE_TEXT: &str = "—";

/// Display text for any failed or non-finite result
pub const ERROR_TEXT: &str = "Error";

/// Decimal places used when none are requested
pub const DEFAULT_DECIMALS: u32 = 2;

/// Largest scale a [`Decimal`] can carry
const MAX_DECIMALS: u32 = 28;

/// Display options for formatted results
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatOptions {
    /// Currency code (`USD`) or symbol (`$`) to prefix
    pub currency: Option<String>,
    /// Fixed number of decimal places
    pub decimals: u32,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            currency: None,
            decimals: DEFAULT_DECIMALS,
        }
    }
}

impl FormatOptions {
    /// Format a result with these options
    pub fn format(&self, result: &EvaluationResult) -> String {
        format_result(result, self.currency.as_deref(), Some(self.decimals))
    }
}

/// Currency prefix for an ISO code (case-insensitive)
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code.to_ascii_uppercase().as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "INR" => "₹",
        "KRW" => "₩",
        "CHF" => "CHF ",
        _ => return None,
    };
    Some(symbol)
}

/// Resolve a configured currency to the prefix that is actually written
///
/// Known codes map to their symbol. Anything else without letters (`$`, `€`) is taken
/// as a symbol already; unknown alphabetic codes get no prefix.
fn currency_prefix(currency: &str) -> Option<&str> {
    let currency = currency.trim();
    if currency.is_empty() {
        return None;
    }
    if let Some(symbol) = currency_symbol(currency) {
        return Some(symbol);
    }
    if currency.chars().any(char::is_alphabetic) {
        log::debug!("unrecognized currency {:?}, no prefix written", currency);
        return None;
    }
    Some(currency)
}

/// Format an evaluation result as display text
///
/// # Example
/// ```rust
/// use tabula_formula::{format_result, FormulaError};
///
/// assert_eq!(format_result(&Ok(Some(1234.5)), Some("USD"), None), "$1,234.50");
/// assert_eq!(format_result(&Ok(Some(0.125)), None, Some(2)), "0.13");
/// assert_eq!(format_result(&Ok(None), None, None), "—");
/// assert_eq!(format_result(&Err(FormulaError::DivisionByZero), None, None), "Error");
/// ```
pub fn format_result(
    result: &EvaluationResult,
    currency: Option<&str>,
    decimals: Option<u32>,
) -> String {
    let value = match result {
        Ok(Some(value)) if value.is_finite() => *value,
        Ok(Some(_)) | Err(_) => return ERROR_TEXT.to_string(),
        Ok(None) => return NO_VALUE_TEXT.to_string(),
    };

    let decimals = decimals.unwrap_or(DEFAULT_DECIMALS).min(MAX_DECIMALS);
    let fixed = to_fixed(value, decimals);

    let (negative, digits) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fixed.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut out = String::with_capacity(fixed.len() + 8);
    if negative {
        out.push('-');
    }
    if let Some(prefix) = currency.and_then(currency_prefix) {
        out.push_str(prefix);
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Fixed-point text with exactly `decimals` places, rounding half away from zero
///
/// Never returns a negative zero.
fn to_fixed(value: f64, decimals: u32) -> String {
    // Shortest round-trip text keeps 1.005 as 1.005 rather than its binary expansion
    let decimal = Decimal::from_str(&value.to_string()).ok().and_then(|d| {
        let mut rounded =
            d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        // rescale caps the scale when the integer digits leave no room
        rounded.rescale(decimals);
        (rounded.scale() == decimals).then(|| rounded.to_string())
    });
    // Beyond Decimal's range or precision
    let text = decimal.unwrap_or_else(|| format!("{:.*}", decimals as usize, value));

    if text.starts_with('-') && text.bytes().all(|b| matches!(b, b'-' | b'0' | b'.')) {
        text[1..].to_string()
    } else {
        text
    }
}

/// Insert `,` between groups of three integer digits
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormulaError;
    use pretty_assertions::assert_eq;

    fn fmt(value: f64) -> String {
        format_result(&Ok(Some(value)), None, None)
    }

    #[test]
    fn test_default_two_decimals() {
        assert_eq!(fmt(0.0), "0.00");
        assert_eq!(fmt(42.0), "42.00");
        assert_eq!(fmt(3.14159), "3.14");
        assert_eq!(fmt(-7.5), "-7.50");
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(fmt(999.0), "999.00");
        assert_eq!(fmt(1000.0), "1,000.00");
        assert_eq!(fmt(1234567.891), "1,234,567.89");
        assert_eq!(fmt(-1234.5), "-1,234.50");
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(fmt(0.125), "0.13");
        assert_eq!(fmt(-0.125), "-0.13");
        assert_eq!(fmt(2.675), "2.68");
        assert_eq!(format_result(&Ok(Some(2.5)), None, Some(0)), "3");
        assert_eq!(format_result(&Ok(Some(-2.5)), None, Some(0)), "-3");
    }

    #[test]
    fn test_no_negative_zero() {
        assert_eq!(fmt(-0.0), "0.00");
        assert_eq!(fmt(-0.001), "0.00");
        assert_eq!(format_result(&Ok(Some(-0.4)), None, Some(0)), "0");
    }

    #[test]
    fn test_custom_decimals() {
        assert_eq!(format_result(&Ok(Some(1.0 / 3.0)), None, Some(4)), "0.3333");
        assert_eq!(format_result(&Ok(Some(12345.678)), None, Some(0)), "12,346");
        assert_eq!(format_result(&Ok(Some(5.0)), None, Some(1)), "5.0");
    }

    #[test]
    fn test_currency_codes() {
        let value = Ok(Some(1234.5));
        assert_eq!(format_result(&value, Some("USD"), None), "$1,234.50");
        assert_eq!(format_result(&value, Some("eur"), None), "€1,234.50");
        assert_eq!(format_result(&value, Some("GBP"), None), "£1,234.50");
        assert_eq!(format_result(&value, Some("JPY"), Some(0)), "¥1,235");
        assert_eq!(format_result(&value, Some("INR"), None), "₹1,234.50");
        assert_eq!(format_result(&value, Some("KRW"), Some(0)), "₩1,235");
        assert_eq!(format_result(&value, Some("CHF"), None), "CHF 1,234.50");
        assert_eq!(format_result(&Ok(Some(-3.0)), Some("USD"), None), "-$3.00");
    }

    #[test]
    fn test_currency_symbols_and_unknown_codes() {
        let value = Ok(Some(10.0));
        assert_eq!(format_result(&value, Some("€"), None), "€10.00");
        assert_eq!(format_result(&value, Some("XYZ"), None), "10.00");
        assert_eq!(format_result(&value, Some(""), None), "10.00");
    }

    #[test]
    fn test_no_value_and_errors() {
        assert_eq!(format_result(&Ok(None), Some("USD"), None), NO_VALUE_TEXT);
        assert_eq!(
            format_result(&Err(FormulaError::DivisionByZero), None, None),
            ERROR_TEXT
        );
        assert_eq!(format_result(&Ok(Some(f64::INFINITY)), None, None), ERROR_TEXT);
        assert_eq!(format_result(&Ok(Some(f64::NAN)), None, None), ERROR_TEXT);
    }

    #[test]
    fn test_huge_values_fall_back() {
        let text = fmt(1e30);
        assert!(text.starts_with("1,000,000,000,000,000,0"));
        assert!(text.ends_with(".00"));

        assert_eq!(
            format_result(&Ok(Some(1e20)), None, Some(10)),
            "100,000,000,000,000,000,000.0000000000"
        );
        let text = format_result(&Ok(Some(12345678901234567.0)), None, Some(14));
        assert_eq!(text.split_once('.').map(|(_, frac)| frac.len()), Some(14));
    }

    #[test]
    fn test_format_options() {
        let options = FormatOptions {
            currency: Some("USD".into()),
            decimals: 1,
        };
        assert_eq!(options.format(&Ok(Some(2.25))), "$2.3");
        assert_eq!(FormatOptions::default().format(&Ok(Some(2.25))), "2.25");
    }

    #[test]
    fn test_never_empty() {
        for result in [Ok(None), Ok(Some(0.0)), Err(FormulaError::InvalidExpression)] {
            assert!(!format_result(&result, None, Some(0)).is_empty());
        }
    }
}
