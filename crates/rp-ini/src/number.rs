//! Integer literal parsing
//!
//! Values are read the way C's `strtol` with base 0 reads them: optional
//! leading whitespace and sign, then `0x`/`0X` for hex, a leading `0` for
//! octal, decimal otherwise. Unlike `strtol`, leftover characters are an
//! error rather than silently ignored.

use crate::error::IniError;

/// Parse an integer literal that must fit in an `i32`
pub fn parse_integer(text: &str) -> Result<i32, IniError> {
    let not_an_integer = || IniError::NotAnInteger {
        value: text.to_string(),
    };
    let out_of_range = || IniError::OutOfRange {
        value: text.to_string(),
    };

    let trimmed = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    // Trailing garbage is reported before overflow, so "99999999999x" is not an integer
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(not_an_integer());
    }

    let magnitude = digits.chars().try_fold(0i64, |acc, c| {
        let digit = i64::from(c.to_digit(radix).unwrap_or(0));
        acc.checked_mul(i64::from(radix))
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(out_of_range)
    })?;

    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).map_err(|_| out_of_range())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodedError, ErrorCode};

    #[test]
    fn test_decimal() {
        assert_eq!(parse_integer("42").unwrap(), 42);
        assert_eq!(parse_integer("0").unwrap(), 0);
        assert_eq!(parse_integer("-17").unwrap(), -17);
        assert_eq!(parse_integer("+5").unwrap(), 5);
        assert_eq!(parse_integer("  9").unwrap(), 9);
    }

    #[test]
    fn test_hex_and_octal() {
        assert_eq!(parse_integer("0x1F").unwrap(), 31);
        assert_eq!(parse_integer("0XfF").unwrap(), 255);
        assert_eq!(parse_integer("010").unwrap(), 8);
        assert_eq!(parse_integer("-0x10").unwrap(), -16);
    }

    #[test]
    fn test_limits() {
        assert_eq!(parse_integer("2147483647").unwrap(), i32::MAX);
        assert_eq!(parse_integer("-2147483648").unwrap(), i32::MIN);
    }

    #[test]
    fn test_trailing_characters() {
        let err = parse_integer("12x").unwrap_err();
        assert!(matches!(err, IniError::NotAnInteger { .. }));
        assert_eq!(err.code(), ErrorCode::BadArgument);

        assert!(matches!(
            parse_integer("12 ").unwrap_err(),
            IniError::NotAnInteger { .. }
        ));
        assert!(matches!(
            parse_integer("08").unwrap_err(),
            IniError::NotAnInteger { .. }
        ));
        assert!(matches!(
            parse_integer("0x").unwrap_err(),
            IniError::NotAnInteger { .. }
        ));
        assert!(matches!(
            parse_integer("").unwrap_err(),
            IniError::NotAnInteger { .. }
        ));
        assert!(matches!(
            parse_integer("-").unwrap_err(),
            IniError::NotAnInteger { .. }
        ));
    }

    #[test]
    fn test_out_of_range() {
        let err = parse_integer("2147483648").unwrap_err();
        assert!(matches!(err, IniError::OutOfRange { .. }));
        assert_eq!(err.code(), ErrorCode::ValueOutOfRange);

        assert!(matches!(
            parse_integer("-2147483649").unwrap_err(),
            IniError::OutOfRange { .. }
        ));
        assert!(matches!(
            parse_integer("99999999999999999999999").unwrap_err(),
            IniError::OutOfRange { .. }
        ));
    }

    #[test]
    fn test_garbage_wins_over_overflow() {
        assert!(matches!(
            parse_integer("99999999999999999999999x").unwrap_err(),
            IniError::NotAnInteger { .. }
        ));
    }
}
