//! Raw on-chain integer amounts → human-readable decimal strings.
//!
//! Token values routinely exceed what an `f64` (or even a 96-bit decimal)
//! can hold exactly, so the division by `10^decimals` is done positionally on
//! the integer's base-10 digits.

use alloy::primitives::U256;

/// Decimals assumed when a token reports none, or an unparseable count.
pub const DEFAULT_DECIMALS: u32 = 18;

/// Format `raw_value` using a decimals count as reported by the explorer
/// (a string such as `"6"`). Unparseable counts fall back to 18.
pub fn format_token_amount(raw_value: &str, token_decimal: &str) -> String {
    let decimals = token_decimal
        .trim()
        .parse::<u32>()
        .unwrap_or(DEFAULT_DECIMALS);
    format_units(raw_value, decimals)
}

/// Widest base-10 rendering of a U256.
const MAX_U256_DIGITS: usize = 78;

/// Divide `raw_value` by `10^decimals` and render it in normalized form:
/// no trailing fractional zeros, no dangling decimal point.
///
/// `decimals == 0` returns the input untouched. Inputs that are not a
/// non-negative base-10 integer are also returned untouched. Scales wider
/// than any U256 switch to exponent form (`1E-100`) so the output stays
/// small whatever a token contract reports.
pub fn format_units(raw_value: &str, decimals: u32) -> String {
    if decimals == 0 {
        return raw_value.to_string();
    }

    let trimmed = raw_value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return raw_value.to_string();
    }
    let Ok(value) = U256::from_str_radix(trimmed, 10) else {
        return raw_value.to_string();
    };

    // Canonical digits, leading zeros dropped
    let digits = value.to_string();
    let scale = decimals as usize;

    if scale > MAX_U256_DIGITS {
        return exponent_form(&digits, decimals);
    }

    let (int_part, frac_part) = if digits.len() > scale {
        let split = digits.len() - scale;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        let padded = format!("{}{}", "0".repeat(scale - digits.len()), digits);
        ("0".to_string(), padded)
    };

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac)
    }
}

/// `digits * 10^-decimals` as `d.dddE-n`, trailing zeros folded into the exponent.
fn exponent_form(digits: &str, decimals: u32) -> String {
    if digits == "0" {
        return "0".to_string();
    }
    let significant = digits.trim_end_matches('0');
    let folded = (digits.len() - significant.len()) as i64;
    let exponent = (significant.len() as i64 - 1) + folded - i64::from(decimals);

    let (lead, rest) = significant.split_at(1);
    if rest.is_empty() {
        format!("{}E{}", lead, exponent)
    } else {
        format!("{}.{}E{}", lead, rest, exponent)
    }
}
