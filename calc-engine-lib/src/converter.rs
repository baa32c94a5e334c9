//! Conversion between integers and their textual form in a given base.

use crate::error::{CalcError, ErrorCode, Result};
use std::fmt;
use std::fmt::Formatter;

/// The bases a literal can be written in, and a result can be displayed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberBase {
    #[default]
    Decimal,
    Binary,
    Octal,
    Hexadecimal,
}

impl NumberBase {
    pub fn radix(&self) -> u32 {
        match self {
            NumberBase::Decimal => 10,
            NumberBase::Binary => 2,
            NumberBase::Octal => 8,
            NumberBase::Hexadecimal => 16,
        }
    }

    /// The literal prefix for the base, e.g. `0x`. Decimal has none.
    pub fn prefix(&self) -> &'static str {
        match self {
            NumberBase::Decimal => "",
            NumberBase::Binary => "0b",
            NumberBase::Octal => "0o",
            NumberBase::Hexadecimal => "0x",
        }
    }

    pub fn from_radix(radix: u32) -> Result<NumberBase> {
        match radix {
            2 => Ok(NumberBase::Binary),
            8 => Ok(NumberBase::Octal),
            10 => Ok(NumberBase::Decimal),
            16 => Ok(NumberBase::Hexadecimal),
            _ => Err(CalcError::invalid_base(format!(
                "Invalid base: {}. Must be 2, 8, 10, or 16",
                radix
            ))),
        }
    }

    /// Maps the character following a leading `0` to a base, e.g. `x` in `0xFF`.
    pub fn from_prefix_char(c: char) -> Option<NumberBase> {
        match c {
            'b' | 'B' => Some(NumberBase::Binary),
            'o' | 'O' => Some(NumberBase::Octal),
            'x' | 'X' => Some(NumberBase::Hexadecimal),
            _ => None,
        }
    }

    pub fn is_digit(&self, c: char) -> bool {
        c.is_digit(self.radix())
    }
}

impl fmt::Display for NumberBase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumberBase::Decimal => "DECIMAL",
            NumberBase::Binary => "BINARY",
            NumberBase::Octal => "OCTAL",
            NumberBase::Hexadecimal => "HEX",
        };
        f.write_str(name)
    }
}

fn check_radix(radix: u32) -> Result<()> {
    if !(2..=36).contains(&radix) {
        return Err(CalcError::invalid_base(format!(
            "Base must be between 2 and 36, got {}",
            radix
        )));
    }
    Ok(())
}

/// Renders `value` in the given radix with upper-case digits and a leading `-` for negatives.
///
/// # Examples
///
/// ```
/// use calc_engine::converter::to_base;
///
/// assert_eq!(to_base(255, 16).unwrap(), "FF");
/// assert_eq!(to_base(-10, 2).unwrap(), "-1010");
/// ```
pub fn to_base(value: i64, radix: u32) -> Result<String> {
    check_radix(radix)?;
    let digits = magnitude_digits(value.unsigned_abs(), radix);
    if value < 0 {
        Ok(format!("-{}", digits))
    } else {
        Ok(digits)
    }
}

/// Radix must already be within 2..=36.
fn magnitude_digits(mut magnitude: u64, radix: u32) -> String {
    if magnitude == 0 {
        return "0".into();
    }
    let mut digits = Vec::new();
    while magnitude > 0 {
        let digit = (magnitude % radix as u64) as u32;
        digits.push(
            std::char::from_digit(digit, radix)
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('?'),
        );
        magnitude /= radix as u64;
    }
    digits.iter().rev().collect()
}

/// Parses `text` (optionally starting with `-`) as an integer in the given radix.
pub fn from_base(text: &str, radix: u32) -> Result<i64> {
    check_radix(radix)?;
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if digits.is_empty() {
        return Err(CalcError::invalid_base("Cannot convert empty string"));
    }

    let mut magnitude: u64 = 0;
    for c in digits.chars() {
        let digit = c.to_digit(radix).ok_or_else(|| {
            CalcError::invalid_base(format!("Invalid digit for base {}: '{}'", radix, c))
        })?;
        magnitude = magnitude
            .checked_mul(radix as u64)
            .and_then(|m| m.checked_add(digit as u64))
            .ok_or_else(|| {
                CalcError::new(
                    ErrorCode::NumericOverflow,
                    format!("Value {} does not fit in 64 bits", text),
                    0,
                )
            })?;
    }

    let limit = if negative {
        i64::MIN.unsigned_abs()
    } else {
        i64::MAX as u64
    };
    if magnitude > limit {
        return Err(CalcError::new(
            ErrorCode::NumericOverflow,
            format!("Value {} does not fit in 64 bits", text),
            0,
        ));
    }
    if negative {
        Ok((magnitude as i64).wrapping_neg())
    } else {
        Ok(magnitude as i64)
    }
}

/// Whether `text` is a well-formed (optionally negative) number in `base`.
pub fn is_valid(text: &str, base: NumberBase) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| base.is_digit(c))
}

/// Renders `value` for display in `base`, including the base prefix, e.g. `-0xFF`.
pub fn format(value: i64, base: NumberBase) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let digits = magnitude_digits(value.unsigned_abs(), base.radix());
    format!("{}{}{}", sign, base.prefix(), digits)
}
