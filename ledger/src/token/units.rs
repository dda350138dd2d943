//! Conversions between whole tokens and 18-decimal minor units
//!
//! All conversions are exact integer arithmetic.

use primitive_types::U256;

use super::{TokenError, TokenResult, DECIMALS};

/// 10^18, one whole token in minor units
pub fn coin_value() -> U256 {
    U256::exp10(DECIMALS as usize)
}

/// Whole tokens to minor units
pub fn to_base_units(whole: u64) -> U256 {
    U256::from(whole) * coin_value()
}

/// Parse a decimal token amount such as `"1000"` or `"0.25"`
pub fn parse_units(text: &str) -> TokenResult<U256> {
    let text = text.trim();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TokenError::InvalidAmount(format!("'{}' is not a number", text)));
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TokenError::InvalidAmount(format!("'{}' is not a number", text)));
    }
    if fraction.len() > DECIMALS as usize {
        return Err(TokenError::InvalidAmount(format!(
            "'{}' has more than {} decimals",
            text, DECIMALS
        )));
    }

    let whole = U256::from_dec_str(whole).map_err(|_| TokenError::Overflow)?;
    let scaled = whole.checked_mul(coin_value()).ok_or(TokenError::Overflow)?;

    if fraction.is_empty() {
        return Ok(scaled);
    }
    let padded = format!("{:0<width$}", fraction, width = DECIMALS as usize);
    let fraction = U256::from_dec_str(&padded).map_err(|_| TokenError::Overflow)?;
    scaled.checked_add(fraction).ok_or(TokenError::Overflow)
}

/// Render minor units as a decimal token amount, e.g. `"1000.0"`
pub fn format_units(amount: U256) -> String {
    let (whole, fraction) = amount.div_mod(coin_value());
    let fraction = format!("{:0>width$}", fraction.to_string(), width = DECIMALS as usize);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}
