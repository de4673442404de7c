//! The calculator engine.
//!
//! Operands are kept as text while they are being typed. A binary operation
//! is only resolved when another operator is chosen or the user evaluates,
//! so `2 + 3 × 4` computes `(2 + 3) × 4`.

use super::evaluation::{Formatting, format_number, format_result, parse_operand, round_result};
use super::operator::{Operator, finite};
use crate::error::CalcError;
use std::time::{Duration, Instant};
use tracing::debug;

/// Text shown in place of the current operand after a division by zero.
pub const ERROR_MARKER: &str = "Error";

/// How long the error marker stays on the display before the engine resets.
pub const DEFAULT_ERROR_RESET: Duration = Duration::from_millis(1500);

/// Operands, pending operator and memory register.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatorState {
    pub current_operand: String,
    pub previous_operand: String,
    pub operation: Option<Operator>,
    pub memory: f64,
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self {
            current_operand: "0".to_string(),
            previous_operand: String::new(),
            operation: None,
            memory: 0.0,
        }
    }
}

/// A finished calculation, ready to be recorded in history.
#[derive(Clone, Debug, PartialEq)]
pub struct Calculation {
    pub expression: String,
    pub result: f64,
}

/// What the front end should show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Display {
    /// The operand being typed, or the latest result.
    pub current: String,
    /// The previous operand followed by the pending operator, if any.
    pub previous: String,
    /// Memory indicator, present while memory holds a non-zero value.
    pub memory: Option<String>,
}

#[derive(Debug)]
pub struct Calculator {
    state: CalculatorState,
    error_since: Option<Instant>,
    error_reset: Duration,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Calculator {
    /// Create an engine with a restored memory register.
    pub fn new(memory: f64) -> Self {
        Self {
            state: CalculatorState {
                memory,
                ..CalculatorState::default()
            },
            error_since: None,
            error_reset: DEFAULT_ERROR_RESET,
        }
    }

    pub fn with_error_reset(mut self, delay: Duration) -> Self {
        self.error_reset = delay;
        self
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn memory(&self) -> f64 {
        self.state.memory
    }

    /// Whether the display is currently showing the error marker.
    pub fn is_error(&self) -> bool {
        self.error_since.is_some()
    }

    /// When the error state will clear itself, if the engine is in one.
    pub fn error_deadline(&self) -> Option<Instant> {
        self.error_since.map(|since| since + self.error_reset)
    }

    /// Append a digit or the decimal point to the current operand.
    ///
    /// Anything other than `0-9` and `.` is ignored.
    pub fn append_digit(&mut self, digit: char) {
        if !(digit.is_ascii_digit() || digit == '.') {
            return;
        }
        self.leave_error();

        let current = &mut self.state.current_operand;
        if digit == '.' {
            if current.contains('.') {
                return;
            }
            if current.is_empty() {
                current.push_str("0.");
                return;
            }
        }

        if current == "0" && digit != '.' {
            current.clear();
        }
        current.push(digit);
    }

    /// Replace the current operand with typed text.
    ///
    /// Returns `false`, leaving the state unchanged, if the text is not a number.
    pub fn set_operand(&mut self, text: &str) -> bool {
        let text = text.trim();
        if parse_operand(text).is_none() {
            return false;
        }
        self.leave_error();
        self.state.current_operand = text.to_string();
        true
    }

    /// Remove the last typed character.
    pub fn delete_digit(&mut self) {
        if self.is_error() {
            self.clear_all();
            return;
        }

        let current = &mut self.state.current_operand;
        if current.is_empty() || current == "0" {
            return;
        }
        current.pop();
        if current.is_empty() || current == "-" {
            *current = "0".to_string();
        }
    }

    /// Reset operands and operator. Memory is kept.
    pub fn clear_all(&mut self) {
        self.state.current_operand = "0".to_string();
        self.state.previous_operand.clear();
        self.state.operation = None;
        self.error_since = None;
    }

    /// Start a new binary operation, resolving any pending one first.
    ///
    /// Returns the calculation that was finished on the way, if any. When
    /// that calculation fails the new operator is not applied.
    pub fn choose_operator(
        &mut self,
        op: Operator,
        fmt: &Formatting,
    ) -> Result<Option<Calculation>, CalcError> {
        if self.state.current_operand.is_empty() || self.is_error() {
            return Ok(None);
        }

        let finished = if self.state.previous_operand.is_empty() {
            None
        } else {
            self.evaluate(fmt)?
        };

        self.state.operation = Some(op);
        self.state.previous_operand = std::mem::take(&mut self.state.current_operand);
        Ok(finished)
    }

    /// Apply the pending operator to the previous and current operands.
    ///
    /// Returns `Ok(None)` when there is nothing to evaluate or an operand is
    /// not a number. Division by zero and overflow switch the engine into the
    /// error state.
    pub fn evaluate(&mut self, fmt: &Formatting) -> Result<Option<Calculation>, CalcError> {
        let Some(op) = self.state.operation else {
            return Ok(None);
        };
        let (Some(lhs), Some(rhs)) = (
            parse_operand(&self.state.previous_operand),
            parse_operand(&self.state.current_operand),
        ) else {
            return Ok(None);
        };

        let expression = format!(
            "{} {} {}",
            self.state.previous_operand, op, self.state.current_operand
        );

        let value = match op.apply(lhs, rhs) {
            Ok(value) => value,
            Err(err) => {
                self.enter_error();
                return Err(err);
            }
        };

        let result = round_result(value, fmt.decimal_places);
        debug!(%expression, result, "evaluated");

        self.state.current_operand = format_number(result);
        self.state.previous_operand.clear();
        self.state.operation = None;

        Ok(Some(Calculation { expression, result }))
    }

    /// Divide the current operand by 100.
    pub fn percentage(&mut self) -> Option<Calculation> {
        let value = self.current_value()?;
        let result = value / 100.0;
        let expression = format!("{}%", self.state.current_operand);
        self.state.current_operand = format_number(result);
        Some(Calculation { expression, result })
    }

    /// Square the current operand. The display is rounded, the recorded result is not.
    ///
    /// A square too large for `f64` switches the engine into the error state.
    pub fn square(&mut self, fmt: &Formatting) -> Result<Option<Calculation>, CalcError> {
        let Some(value) = self.current_value() else {
            return Ok(None);
        };
        let result = match finite(value * value) {
            Ok(result) => result,
            Err(err) => {
                self.enter_error();
                return Err(err);
            }
        };
        let expression = format!("{}²", self.state.current_operand);
        self.state.current_operand = format_result(result, fmt.decimal_places);
        Ok(Some(Calculation { expression, result }))
    }

    /// Take the square root of the current operand.
    ///
    /// Negative input fails and leaves the state untouched.
    pub fn square_root(&mut self, fmt: &Formatting) -> Result<Option<Calculation>, CalcError> {
        let Some(value) = self.current_value() else {
            return Ok(None);
        };
        if value < 0.0 {
            return Err(CalcError::NegativeSquareRoot);
        }

        let result = value.sqrt();
        let expression = format!("√{}", self.state.current_operand);
        self.state.current_operand = format_result(result, fmt.decimal_places);
        Ok(Some(Calculation { expression, result }))
    }

    /// Load the memory register into the current operand.
    ///
    /// Returns `false` when memory is empty.
    pub fn memory_recall(&mut self) -> bool {
        if self.state.memory == 0.0 {
            return false;
        }
        self.leave_error();
        self.state.current_operand = format_number(self.state.memory);
        true
    }

    /// Add the current operand to memory.
    ///
    /// Returns `Ok(false)` if the operand is not a number. A sum too large for
    /// `f64` fails and leaves memory untouched.
    pub fn memory_add(&mut self) -> Result<bool, CalcError> {
        let Some(value) = self.current_value() else {
            return Ok(false);
        };
        self.state.memory = finite(self.state.memory + value)?;
        Ok(true)
    }

    pub fn memory_clear(&mut self) {
        self.state.memory = 0.0;
    }

    /// Load a previous result and drop any pending operation.
    pub fn reuse(&mut self, value: f64) {
        self.error_since = None;
        self.state.current_operand = format_number(value);
        self.state.previous_operand.clear();
        self.state.operation = None;
    }

    /// Clear the error state once its delay has elapsed.
    ///
    /// Returns `true` if a reset happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.error_deadline() {
            Some(deadline) if now >= deadline => {
                debug!("error state expired");
                self.clear_all();
                true
            }
            _ => false,
        }
    }

    pub fn display(&self, fmt: &Formatting) -> Display {
        let previous = match self.state.operation {
            Some(op) => format!("{} {}", fmt.display(&self.state.previous_operand), op),
            None => self.state.previous_operand.clone(),
        };

        let memory = (self.state.memory != 0.0)
            .then(|| format!("M: {}", fmt.display(&format!("{:.2}", self.state.memory))));

        Display {
            current: fmt.display(&self.state.current_operand),
            previous,
            memory,
        }
    }

    fn current_value(&self) -> Option<f64> {
        parse_operand(&self.state.current_operand)
    }

    fn enter_error(&mut self) {
        debug!("entering error state");
        self.state.current_operand = ERROR_MARKER.to_string();
        self.state.previous_operand.clear();
        self.state.operation = None;
        self.error_since = Some(Instant::now());
    }

    fn leave_error(&mut self) {
        if self.is_error() {
            self.clear_all();
        }
    }
}
