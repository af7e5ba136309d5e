//! Numeric literal parsing.
//!
//! Literal text arrives from the parser unmodified, so it may carry a type
//! suffix (`1u8`, `2.5f64`), `_` separators and a radix prefix. Suffixes are
//! accepted and ignored: every integer literal is an `i32` and every float
//! literal an `f32` as far as typing is concerned.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INTEGER_LITERAL: Regex = Regex::new(
        r"^(?P<digits>0x[0-9a-fA-F_]+|0o[0-7_]+|0b[01_]+|[0-9][0-9_]*)(?:[iu](?:8|16|32|64|128|size))?$"
    )
    .unwrap();
    static ref FLOAT_LITERAL: Regex = Regex::new(
        r"^(?P<digits>[0-9][0-9_]*(?:\.(?:[0-9][0-9_]*)?)?(?:[eE][+-]?[0-9_]*[0-9][0-9_]*)?)(?:f32|f64)?$"
    )
    .unwrap();
}

/// Parses an integer literal, `None` if it is malformed or does not fit.
pub fn parse_integer(text: &str) -> Option<i128> {
    let captures = INTEGER_LITERAL.captures(text)?;
    let digits = captures.name("digits")?.as_str().replace('_', "");

    let (radix, digits) = if let Some(hex) = digits.strip_prefix("0x") {
        (16, hex.to_string())
    } else if let Some(octal) = digits.strip_prefix("0o") {
        (8, octal.to_string())
    } else if let Some(binary) = digits.strip_prefix("0b") {
        (2, binary.to_string())
    } else {
        (10, digits)
    };

    if digits.is_empty() {
        return None;
    }

    i128::from_str_radix(&digits, radix).ok()
}

/// Parses a float literal, `None` if it is malformed or not finite.
pub fn parse_float(text: &str) -> Option<f64> {
    let captures = FLOAT_LITERAL.captures(text)?;
    let digits = captures.name("digits")?.as_str().replace('_', "");
    let digits = digits.strip_suffix('.').unwrap_or(&digits);

    digits.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_plain() {
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("1_000_000"), Some(1_000_000));
    }

    #[test]
    fn test_parse_integer_suffix_ignored() {
        assert_eq!(parse_integer("1u8"), Some(1));
        assert_eq!(parse_integer("300i64"), Some(300));
        assert_eq!(parse_integer("7usize"), Some(7));
    }

    #[test]
    fn test_parse_integer_radix() {
        assert_eq!(parse_integer("0xff"), Some(255));
        assert_eq!(parse_integer("0o17"), Some(15));
        assert_eq!(parse_integer("0b1010_1010"), Some(170));
        assert_eq!(parse_integer("0xFFu32"), Some(255));
    }

    #[test]
    fn test_parse_integer_rejects_garbage() {
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("abc"), None);
        assert_eq!(parse_integer("0x"), None);
        assert_eq!(parse_integer("1.5"), None);
        assert_eq!(parse_integer("12f32"), None);
    }

    #[test]
    fn test_parse_integer_overflow() {
        assert_eq!(
            parse_integer("999999999999999999999999999999999999999999"),
            None
        );
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("1.5"), Some(1.5));
        assert_eq!(parse_float("2.5f64"), Some(2.5));
        assert_eq!(parse_float("1_000.25"), Some(1000.25));
        assert_eq!(parse_float("3."), Some(3.0));
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float("2E-1f32"), Some(0.2));
    }

    #[test]
    fn test_parse_float_rejects_garbage() {
        assert_eq!(parse_float("x1.0"), None);
        assert_eq!(parse_float("1.0.0"), None);
        assert_eq!(parse_float("1e400"), None);
    }
}
