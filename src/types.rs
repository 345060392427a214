//! Type spelling and enum literal normalization
//!
//! Shared by the model builder and the linter so both agree on what a
//! canonical type string and a decoded enum value are.

use crate::error::{ApiError, Result};

/// Canonicalize a raw C type spelling.
///
/// `*` becomes a token of its own and tokens are joined by single spaces,
/// so `"const GLfloat*"` and `"const  GLfloat *"` compare equal.
pub fn normalize_type(raw: &str) -> String {
    type_tokens(raw).join(" ")
}

/// Split a raw type spelling into tokens, pointers included.
pub fn type_tokens(raw: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for word in raw.split_whitespace() {
        let mut rest = word;
        while let Some(star) = rest.find('*') {
            if star > 0 {
                tokens.push(&rest[..star]);
            }
            tokens.push("*");
            rest = &rest[star + 1..];
        }
        if !rest.is_empty() {
            tokens.push(rest);
        }
    }
    tokens
}

/// Decode the `value` attribute of an enum.
///
/// One trailing unsigned marker is dropped, then the remainder is read as a
/// C integer literal: `0x` is hex, a leading `0` is octal, anything else is
/// decimal. Values must fit in either an `i64` or a `u64`.
pub fn decode_enum_value(name: &str, value_str: &str) -> Result<i128> {
    parse_c_integer(value_str).ok_or_else(|| ApiError::MalformedEnumValue {
        name: name.to_string(),
        value: value_str.to_string(),
    })
}

fn parse_c_integer(literal: &str) -> Option<i128> {
    let literal = literal.trim();
    let literal = literal
        .strip_suffix(|c: char| c == 'u' || c == 'U')
        .unwrap_or(literal);

    let (negative, digits) = match literal.as_bytes().first().copied()? {
        b'-' => (true, &literal[1..]),
        b'+' => (false, &literal[1..]),
        _ => (false, literal),
    };

    let (radix, body) = if let Some(hex) = strip_radix_prefix(digits, 'x') {
        (16, hex)
    } else if let Some(oct) = strip_radix_prefix(digits, 'o') {
        (8, oct)
    } else if let Some(bin) = strip_radix_prefix(digits, 'b') {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    // from_str_radix tolerates a sign, so check the digits ourselves
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i128::from_str_radix(body, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    (i128::from(i64::MIN)..=i128::from(u64::MAX))
        .contains(&value)
        .then_some(value)
}

fn strip_radix_prefix(digits: &str, marker: char) -> Option<&str> {
    let mut chars = digits.chars();
    match (chars.next(), chars.next()) {
        (Some('0'), Some(c)) if c.to_ascii_lowercase() == marker => Some(&digits[2..]),
        _ => None,
    }
}
