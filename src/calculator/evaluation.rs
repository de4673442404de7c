//! Operand parsing and number formatting.
//!
//! Operands are held as text until evaluation. This module converts between
//! that text and `f64`, applies the configured decimal rounding and adds
//! thousand separators for display.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest fixed decimal count accepted in preferences.
pub const MAX_DECIMAL_PLACES: u8 = 10;

lazy_static! {
    /// A plain decimal operand, optionally signed, optionally in exponent form.
    static ref OPERAND: Regex = Regex::new(
        r"^-?(\d+\.?\d*|\.\d+)(e[+-]?\d+)?$"
    ).unwrap();
}

/// How many decimals a result keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DecimalPlacesRepr", into = "DecimalPlacesRepr")]
pub enum DecimalPlaces {
    /// The natural string form of the number.
    #[default]
    Auto,
    /// Round to this many decimals, then strip trailing zeros.
    Fixed(u8),
}

/// Stored either as `"auto"`, a bare number, or a numeric string.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DecimalPlacesRepr {
    Number(u64),
    Text(String),
}

impl From<DecimalPlaces> for DecimalPlacesRepr {
    fn from(places: DecimalPlaces) -> Self {
        match places {
            DecimalPlaces::Auto => Self::Text("auto".to_string()),
            DecimalPlaces::Fixed(n) => Self::Number(u64::from(n)),
        }
    }
}

impl TryFrom<DecimalPlacesRepr> for DecimalPlaces {
    type Error = String;

    fn try_from(repr: DecimalPlacesRepr) -> Result<Self, Self::Error> {
        match repr {
            DecimalPlacesRepr::Number(n) => u8::try_from(n)
                .ok()
                .filter(|&n| n <= MAX_DECIMAL_PLACES)
                .map(Self::Fixed)
                .ok_or_else(|| format!("decimal places out of range: {}", n)),
            DecimalPlacesRepr::Text(text) => text.parse(),
        }
    }
}

impl FromStr for DecimalPlaces {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        match s.parse::<u8>() {
            Ok(n) if n <= MAX_DECIMAL_PLACES => Ok(Self::Fixed(n)),
            _ => Err(format!(
                "expected 'auto' or 0-{}, got '{}'",
                MAX_DECIMAL_PLACES, s
            )),
        }
    }
}

impl fmt::Display for DecimalPlaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(n) => write!(f, "{}", n),
        }
    }
}

/// The subset of preferences that affects how numbers are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Formatting {
    pub decimal_places: DecimalPlaces,
    pub thousands_separator: bool,
}

impl Formatting {
    /// Render operand text for the display, grouping digits if enabled.
    pub fn display(&self, text: &str) -> String {
        if self.thousands_separator {
            with_separators(text)
        } else {
            text.to_string()
        }
    }
}

/// Parse operand text. Returns `None` for anything that is not a finite
/// number, including the empty operand and the error marker.
pub fn parse_operand(text: &str) -> Option<f64> {
    if !OPERAND.is_match(text) {
        return None;
    }
    text.parse().ok().filter(|value: &f64| value.is_finite())
}

/// Format a number in its natural string form.
///
/// Uses the shortest representation that round-trips, switching to exponent
/// notation outside `[1e-6, 1e21)`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value.is_sign_positive() {
            "Infinity"
        } else {
            "-Infinity"
        };
        return text.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if (1e-6..1e21).contains(&abs) {
        return value.to_string();
    }

    let sci = format!("{:e}", value);
    match sci.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => sci,
    }
}

/// Format a result according to the configured decimal places.
pub fn format_result(value: f64, places: DecimalPlaces) -> String {
    match places {
        DecimalPlaces::Auto => format_number(value),
        DecimalPlaces::Fixed(_) if !value.is_finite() => format_number(value),
        DecimalPlaces::Fixed(n) => {
            let fixed = to_fixed(value, n);
            match fixed.parse::<f64>() {
                Ok(rounded) => format_number(rounded),
                Err(_) => fixed,
            }
        }
    }
}

/// Round a result the same way [`format_result`] renders it.
pub fn round_result(value: f64, places: DecimalPlaces) -> f64 {
    match places {
        DecimalPlaces::Auto => value,
        DecimalPlaces::Fixed(_) if !value.is_finite() => value,
        DecimalPlaces::Fixed(n) => to_fixed(value, n).parse().unwrap_or(value),
    }
}

/// Render `value` with exactly `places` decimals, rounding halves away from zero.
///
/// `{:.N}` rounds an exact tie to the even digit, so a tie is nudged one ulp
/// outward first. The ulp of a tie at `places` decimals is at most
/// `10^-(places + 1)`, so the nudge never crosses the next rounding step.
fn to_fixed(value: f64, places: u8) -> String {
    let value = if is_tie(value, places) {
        f64::from_bits(value.to_bits() + 1)
    } else {
        value
    };
    format!("{:.*}", usize::from(places), value)
}

/// Whether the exact binary value of `value` ends in a 5 right after `places` decimals.
///
/// With `value = m * 2^e`, that holds exactly when the lowest set bit of the
/// value is worth `2^-(places + 1)`.
fn is_tie(value: f64, places: u8) -> bool {
    if !value.is_finite() {
        return false;
    }
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, exponent) = match biased {
        0 => (fraction, -1074),
        _ => (fraction | 1 << 52, biased - 1075),
    };
    mantissa != 0 && mantissa.trailing_zeros() as i32 + exponent == -(i32::from(places) + 1)
}

/// Group the integer part of a number with `,` every three digits.
///
/// Text without a leading run of digits (such as `Error`) is returned unchanged.
pub fn with_separators(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };

    let split = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let (int_part, rest) = unsigned.split_at(split);

    if int_part.len() <= 3 {
        return text.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}{}{}", sign, grouped, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_format() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_fixed_places_strip_trailing_zeros() {
        assert_eq!(format_result(1.0 / 3.0, DecimalPlaces::Fixed(2)), "0.33");
        assert_eq!(format_result(2.5, DecimalPlaces::Fixed(4)), "2.5");
        assert_eq!(format_result(7.0, DecimalPlaces::Fixed(3)), "7");
        assert_eq!(format_result(2.0 / 3.0, DecimalPlaces::Fixed(0)), "1");
        assert_eq!(round_result(0.1 + 0.2, DecimalPlaces::Fixed(2)), 0.3);
    }

    #[test]
    fn test_fixed_places_round_halves_up() {
        assert_eq!(format_result(5.0 / 2.0, DecimalPlaces::Fixed(0)), "3");
        assert_eq!(format_result(1.0 / 8.0, DecimalPlaces::Fixed(2)), "0.13");
        assert_eq!(format_result(0.5, DecimalPlaces::Fixed(0)), "1");
        assert_eq!(format_result(-2.5, DecimalPlaces::Fixed(0)), "-3");
        assert_eq!(round_result(1.0 / 8.0, DecimalPlaces::Fixed(2)), 0.13);
        assert_eq!(round_result(3.5, DecimalPlaces::Fixed(0)), 4.0);
    }

    #[test]
    fn test_fixed_places_near_ties() {
        // The nearest f64 to 1.005 lies just below it.
        assert_eq!(format_result(1.005, DecimalPlaces::Fixed(2)), "1");
        assert_eq!(format_result(0.25, DecimalPlaces::Fixed(2)), "0.25");
        assert_eq!(format_result(0.375, DecimalPlaces::Fixed(2)), "0.38");
        assert!(!is_tie(0.25, 2));
        assert!(is_tie(0.125, 2));
        assert!(!is_tie(0.0, 0));
    }

    #[test]
    fn test_parse_operand() {
        assert_eq!(parse_operand("5"), Some(5.0));
        assert_eq!(parse_operand("5."), Some(5.0));
        assert_eq!(parse_operand(".5"), Some(0.5));
        assert_eq!(parse_operand("-4"), Some(-4.0));
        assert_eq!(parse_operand("1e+21"), Some(1e21));
        assert_eq!(parse_operand("Infinity"), None);
        assert_eq!(parse_operand("1e400"), None);
        assert_eq!(parse_operand(""), None);
        assert_eq!(parse_operand("."), None);
        assert_eq!(parse_operand("Error"), None);
        assert_eq!(parse_operand("NaN"), None);
    }

    #[test]
    fn test_thousand_separators() {
        assert_eq!(with_separators("1000000"), "1,000,000");
        assert_eq!(with_separators("-1234.5678"), "-1,234.5678");
        assert_eq!(with_separators("999"), "999");
        assert_eq!(with_separators("Error"), "Error");
        assert_eq!(with_separators(""), "");
    }

    #[test]
    fn test_decimal_places_parsing() {
        assert_eq!("auto".parse::<DecimalPlaces>(), Ok(DecimalPlaces::Auto));
        assert_eq!("4".parse::<DecimalPlaces>(), Ok(DecimalPlaces::Fixed(4)));
        assert!("11".parse::<DecimalPlaces>().is_err());
        assert!("two".parse::<DecimalPlaces>().is_err());
    }

    #[test]
    fn test_decimal_places_json() {
        let auto: DecimalPlaces = serde_json::from_str("\"auto\"").unwrap();
        let text: DecimalPlaces = serde_json::from_str("\"2\"").unwrap();
        let number: DecimalPlaces = serde_json::from_str("6").unwrap();
        assert_eq!(auto, DecimalPlaces::Auto);
        assert_eq!(text, DecimalPlaces::Fixed(2));
        assert_eq!(number, DecimalPlaces::Fixed(6));
        assert_eq!(
            serde_json::to_string(&DecimalPlaces::Fixed(3)).unwrap(),
            "3"
        );
        assert!(serde_json::from_str::<DecimalPlaces>("99").is_err());
    }
}
