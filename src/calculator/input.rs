//! Key mapping for the calculator.
//!
//! Translates typed tokens into calculator keys. A token is either a named
//! key (`sqrt`, `mr`, `enter`, ...) or a run of keypad characters such as
//! `12+7=`, which is replayed one key at a time.

use super::operator::Operator;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Matches strings made only of keypad characters.
    static ref KEYPAD_RUN: Regex = Regex::new(
        r"^[\d\.\+\-\*/×÷=%]+$"
    ).unwrap();
}

/// A single calculator key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// A digit `0-9` or the decimal point.
    Digit(char),
    Operator(Operator),
    Evaluate,
    Clear,
    Backspace,
    Percent,
    Square,
    SquareRoot,
    MemoryRecall,
    MemoryAdd,
    MemoryClear,
}

/// Parse one whitespace-free token into the key presses it stands for.
///
/// Returns `None` if the token is not calculator input.
pub fn parse_keys(token: &str) -> Option<Vec<Key>> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(key) = named_key(token) {
        return Some(vec![key]);
    }

    if !KEYPAD_RUN.is_match(token) {
        return None;
    }

    token.chars().map(keypad_key).collect()
}

/// Check whether a line consists entirely of calculator input.
pub fn looks_like_keys(line: &str) -> bool {
    let mut tokens = line.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|token| parse_keys(token).is_some())
}

fn named_key(token: &str) -> Option<Key> {
    let key = match token.to_lowercase().as_str() {
        "enter" | "=" => Key::Evaluate,
        "escape" | "esc" | "c" => Key::Clear,
        "backspace" | "del" => Key::Backspace,
        "%" => Key::Percent,
        "sq" | "²" => Key::Square,
        "sqrt" | "√" => Key::SquareRoot,
        "mr" => Key::MemoryRecall,
        "m+" => Key::MemoryAdd,
        "mc" => Key::MemoryClear,
        _ => return None,
    };
    Some(key)
}

fn keypad_key(c: char) -> Option<Key> {
    match c {
        '0'..='9' | '.' => Some(Key::Digit(c)),
        '=' => Some(Key::Evaluate),
        '%' => Some(Key::Percent),
        _ => {
            let mut buf = [0u8; 4];
            Operator::from_symbol(c.encode_utf8(&mut buf)).map(Key::Operator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_keys() {
        assert_eq!(parse_keys("sqrt"), Some(vec![Key::SquareRoot]));
        assert_eq!(parse_keys("M+"), Some(vec![Key::MemoryAdd]));
        assert_eq!(parse_keys("Enter"), Some(vec![Key::Evaluate]));
        assert_eq!(parse_keys("esc"), Some(vec![Key::Clear]));
    }

    #[test]
    fn test_keypad_runs() {
        assert_eq!(
            parse_keys("12+7="),
            Some(vec![
                Key::Digit('1'),
                Key::Digit('2'),
                Key::Operator(Operator::Add),
                Key::Digit('7'),
                Key::Evaluate,
            ])
        );
        assert_eq!(
            parse_keys("6*2/3"),
            Some(vec![
                Key::Digit('6'),
                Key::Operator(Operator::Multiply),
                Key::Digit('2'),
                Key::Operator(Operator::Divide),
                Key::Digit('3'),
            ])
        );
    }

    #[test]
    fn test_non_keys_rejected() {
        assert_eq!(parse_keys(""), None);
        assert_eq!(parse_keys("history"), None);
        assert_eq!(parse_keys("2^8"), None);
        assert!(!looks_like_keys("search 5"));
        assert!(!looks_like_keys("   "));
        assert!(looks_like_keys("5 + 3 ="));
    }
}
