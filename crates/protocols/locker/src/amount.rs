//! Decimal amount codec
//!
//! Converts user-entered decimal strings to integer amounts in the smallest
//! token unit and back. Pure integer/string arithmetic: no floating point is
//! involved at any step, so `decode(encode(s))` is exact.

use locker_core::{Amount, LockError};

fn invalid(message: impl Into<String>) -> LockError {
    LockError::InvalidAmount {
        message: message.into(),
    }
}

/// Encode a decimal string with at most `precision` fractional digits.
///
/// Accepts `123`, `123.45`, `123.` and `.45` (surrounding whitespace is
/// ignored). Empty input, signs, exponents, separators, too many fractional
/// digits and values beyond `u128` are rejected with `InvalidAmount`.
pub fn encode_amount(input: &str, precision: u32) -> Result<Amount, LockError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(invalid("Amount is empty"));
    }
    if s.starts_with('-') {
        return Err(invalid(format!("Amount must not be negative: {}", s)));
    }

    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    let is_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !is_digits(int_part) || !is_digits(frac_part)
    {
        return Err(invalid(format!("Not a decimal number: {}", s)));
    }

    let precision_digits = precision as usize;
    if frac_part.len() > precision_digits {
        return Err(invalid(format!(
            "At most {} decimal places allowed, got {}",
            precision,
            frac_part.len()
        )));
    }

    let too_large = || invalid(format!("Amount too large: {}", s));
    let scale = 10u128.checked_pow(precision).ok_or_else(too_large)?;

    let whole: Amount = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| too_large())?
    };
    let fraction: Amount = if precision_digits == 0 {
        0
    } else {
        format!("{:0<width$}", frac_part, width = precision_digits)
            .parse()
            .map_err(|_| too_large())?
    };

    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(too_large)
}

/// Like [`encode_amount`], but blank input is the integer zero.
///
/// Used while the user is still typing, so the allowance gate can be
/// evaluated before a complete amount exists.
pub fn encode_amount_or_zero(input: &str, precision: u32) -> Result<Amount, LockError> {
    if input.trim().is_empty() {
        return Ok(0);
    }
    encode_amount(input, precision)
}

/// Decode an integer amount into its shortest exact decimal form.
///
/// `1_500_000` at 6 decimals is `"1.5"`; zero is `"0"`.
pub fn decode_amount(value: Amount, precision: u32) -> String {
    let digits = value.to_string();
    let precision = precision as usize;
    if precision == 0 {
        return digits;
    }

    let (whole, fraction) = if digits.len() > precision {
        let split = digits.len() - precision;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = precision))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Canonical spelling of a decimal amount string
pub fn normalize_amount(input: &str, precision: u32) -> Result<String, LockError> {
    encode_amount(input, precision).map(|v| decode_amount(v, precision))
}
