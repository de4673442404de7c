//! Calculator engine and number formatting.
//!
//! This module provides functionality to:
//! - Enter operands and chain binary operations left to right
//! - Apply unary operations and the memory register
//! - Format results according to the decimal and separator preferences
//! - Map typed keys to calculator input
//! - Copy results to the clipboard

mod clipboard;
mod engine;
mod evaluation;
mod input;
mod operator;

pub use clipboard::{ClipboardError, copy_to_clipboard};
pub use engine::{
    Calculation, Calculator, CalculatorState, DEFAULT_ERROR_RESET, Display, ERROR_MARKER,
};
pub use evaluation::{
    DecimalPlaces, Formatting, MAX_DECIMAL_PLACES, format_number, format_result, parse_operand,
    round_result, with_separators,
};
pub use input::{Key, looks_like_keys, parse_keys};
pub use operator::Operator;
