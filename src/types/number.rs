//! Oracle NUMBER decoding
//!
//! Oracle NUMBER is stored in a variable-length format:
//! - First byte: exponent (with sign encoding)
//! - Subsequent bytes: mantissa digits in base-100
//!
//! For positive numbers: exponent byte has high bit set, mantissa bytes are value + 1
//! For negative numbers: exponent byte is inverted, mantissa bytes are 101 - value,
//!                       and a trailing 102 byte is added (if not at max digits)
//!
//! Values are decoded to `f64`. Mantissas wider than an `i64` are truncated to
//! the leading digits that fit.

/// Single-byte encoding of zero
const ZERO: u8 = 0x80;

/// Terminator appended to negative numbers
const NEGATIVE_TERMINATOR: u8 = 0x66;

/// Decode an Oracle NUMBER from wire format bytes
///
/// An empty input yields `NaN`.
pub fn decode_packed_decimal(data: &[u8]) -> f64 {
    let Some(&exponent_byte) = data.first() else {
        return f64::NAN;
    };
    if exponent_byte == ZERO {
        return 0.0;
    }

    let negative = exponent_byte & 0x80 == 0;
    let exponent = if negative {
        (exponent_byte ^ 0x7F) as i32 - 64
    } else {
        (exponent_byte & 0x7F) as i32 - 64
    };

    let mut digits = &data[1..];
    if negative && digits.last() == Some(&NEGATIVE_TERMINATOR) {
        digits = &digits[..digits.len() - 1];
    }

    let mut mantissa: i64 = 0;
    let mut mantissa_digits: i32 = 0;
    'digits: for &byte in digits {
        let mut pair = byte.wrapping_sub(1);
        if negative {
            pair = 100u8.wrapping_sub(pair);
        }
        for figure in [pair / 10, pair % 10] {
            match push_figure(mantissa, figure) {
                Some(next) => mantissa = next,
                None => break 'digits,
            }
            mantissa_digits += 1;
        }
    }

    if negative {
        mantissa = -mantissa;
    }
    scale(mantissa as f64, exponent * 2 - mantissa_digits)
}

/// Append a decimal figure to the mantissa, or `None` once an `i64` would overflow
fn push_figure(mantissa: i64, figure: u8) -> Option<i64> {
    mantissa.checked_mul(10)?.checked_add(figure as i64)
}

fn scale(mantissa: f64, power: i32) -> f64 {
    if power >= 0 {
        mantissa * 10f64.powi(power)
    } else {
        mantissa / 10f64.powi(-power)
    }
}

/// Render a decoded NUMBER with the shortest text that reads back to the same value
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}
