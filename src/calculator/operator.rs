//! Binary operators supported by the calculator.

use crate::error::CalcError;
use std::fmt;
use std::str::FromStr;

/// A pending binary operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// The symbol shown on the display and recorded in history expressions.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
            Self::Divide => "÷",
        }
    }

    /// Parse a display symbol or its keyboard alias (`*`, `x`, `/`).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "×" | "*" | "x" => Some(Self::Multiply),
            "÷" | "/" => Some(Self::Divide),
            _ => None,
        }
    }

    /// Apply the operator.
    ///
    /// Fails on division by an exact zero and on results that are not finite.
    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, CalcError> {
        let value = match self {
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
            Self::Multiply => lhs * rhs,
            Self::Divide if rhs == 0.0 => return Err(CalcError::DivisionByZero),
            Self::Divide => lhs / rhs,
        };
        finite(value)
    }
}

/// Reject infinities and NaN so they never reach the display or history.
pub(crate) fn finite(value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::Overflow)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s.trim()).ok_or_else(|| format!("unknown operator '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_aliases() {
        assert_eq!(Operator::from_symbol("*"), Some(Operator::Multiply));
        assert_eq!(Operator::from_symbol("/"), Some(Operator::Divide));
        assert_eq!(Operator::from_symbol("÷"), Some(Operator::Divide));
        assert_eq!(Operator::from_symbol("^"), None);
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(
            Operator::Divide.apply(1.0, 0.0),
            Err(CalcError::DivisionByZero)
        );
        assert_eq!(
            Operator::Divide.apply(1.0, -0.0),
            Err(CalcError::DivisionByZero)
        );
        assert_eq!(Operator::Divide.apply(0.0, 4.0), Ok(0.0));
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert_eq!(
            Operator::Multiply.apply(1e200, 1e200),
            Err(CalcError::Overflow)
        );
        assert_eq!(
            Operator::Subtract.apply(-f64::MAX, f64::MAX),
            Err(CalcError::Overflow)
        );
        assert_eq!(Operator::Add.apply(f64::MAX, 0.0), Ok(f64::MAX));
    }

    #[test]
    fn test_display_uses_symbol() {
        assert_eq!(Operator::Multiply.to_string(), "×");
        assert_eq!("  -".parse::<Operator>(), Ok(Operator::Subtract));
    }
}
