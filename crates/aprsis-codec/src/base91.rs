//! Base-91 positional encoding used by compressed APRS positions.
//!
//! Digit value `v` is written as the byte `v + 33`, so the alphabet runs from
//! `!` (0) to `{` (90). Digits are most significant first.

use crate::error::{CodecError, Result};

/// Number of symbols in the alphabet.
pub const RADIX: u64 = 91;

/// Byte code of the zero digit (`!`).
pub const FIRST_DIGIT: u8 = 33;

/// Byte code of the highest digit (`{`).
pub const LAST_DIGIT: u8 = FIRST_DIGIT + (RADIX as u8) - 1;

/// Encode `value` with the minimal number of digits.
///
/// Zero encodes as a single `!`.
pub fn encode(value: u64) -> String {
    let mut place = 1u128;
    let mut width = 1usize;
    while place * RADIX as u128 <= value as u128 {
        place *= RADIX as u128;
        width += 1;
    }

    let mut out = String::with_capacity(width);
    let mut rest = value as u128;
    while width > 0 {
        let digit = rest / place;
        rest %= place;
        out.push(char::from(FIRST_DIGIT + digit as u8));
        place /= RADIX as u128;
        width -= 1;
    }
    out
}

/// Encode `value` left-padded with zero digits to at least `width` digits.
pub fn encode_padded(value: u64, width: usize) -> String {
    let digits = encode(value);
    if digits.len() >= width {
        return digits;
    }
    let mut out = String::with_capacity(width);
    out.extend(std::iter::repeat(char::from(FIRST_DIGIT)).take(width - digits.len()));
    out.push_str(&digits);
    out
}

/// Decode base-91 text. The empty string decodes to zero.
pub fn decode(text: &str) -> Result<u64> {
    text.chars().try_fold(0u64, |acc, c| {
        let digit = digit_value(c)?;
        acc.checked_mul(RADIX)
            .and_then(|v| v.checked_add(digit))
            .ok_or(CodecError::Base91Overflow)
    })
}

fn digit_value(c: char) -> Result<u64> {
    match u8::try_from(c) {
        Ok(b) if (FIRST_DIGIT..=LAST_DIGIT).contains(&b) => Ok(u64::from(b - FIRST_DIGIT)),
        _ => Err(CodecError::InvalidBase91Digit(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_single_digit() {
        assert_eq!(encode(0), "!");
        assert_eq!(decode("!").unwrap(), 0);
    }

    #[test]
    fn digit_boundaries() {
        assert_eq!(encode(90), "{");
        assert_eq!(encode(91), "\"!");
        assert_eq!(encode(91 * 91 - 1), "{{");
        assert_eq!(encode(91 * 91), "\"!!");
    }

    #[test]
    fn decodes_most_significant_first() {
        // "<*e7" is the compressed longitude 72°45'W from the APRS reference.
        assert_eq!(decode("<*e7").unwrap(), 20_427_156);
        assert_eq!(encode(20_427_156), "<*e7");
    }

    #[test]
    fn padded_encoding() {
        assert_eq!(encode_padded(0, 4), "!!!!");
        assert_eq!(encode_padded(90, 4), "!!!{");
        assert_eq!(encode_padded(20_427_156, 2), "<*e7");
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        assert_eq!(decode("ab|"), Err(CodecError::InvalidBase91Digit('|')));
        assert_eq!(decode(" "), Err(CodecError::InvalidBase91Digit(' ')));
        assert_eq!(decode("é"), Err(CodecError::InvalidBase91Digit('é')));
    }

    #[test]
    fn rejects_overflow() {
        assert_eq!(decode(&"{".repeat(11)), Err(CodecError::Base91Overflow));
    }

    #[test]
    fn empty_text_is_zero() {
        assert_eq!(decode("").unwrap(), 0);
    }

    #[test]
    fn largest_value_roundtrips() {
        assert_eq!(decode(&encode(u64::MAX)).unwrap(), u64::MAX);
    }
}
