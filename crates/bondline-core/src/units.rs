// crates/bondline-core/src/units.rs
//
// Native value and share quantity units.
//
// Native value is tracked in wei (10^18 wei = 1 whole unit), creator equity in
// fixed-point shares with the same 10^18 scale. All accounting is integer.

use crate::error::BondlineError;

/// Smallest unit of native value.
pub type Wei = u128;

/// Native-value scale: wei per whole unit of value.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Fixed-point unit of creator equity (one whole share).
pub const SHARE_UNIT: u128 = 1_000_000_000_000_000_000;

/// Basis-point denominator: 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Default curve constant shared by both markets.
pub const DEFAULT_CURVE_K: u128 = 32_000;

/// Number of decimal places in [`SCALE`].
pub const DECIMALS: usize = 18;

/// Parse a native amount.
///
/// Accepts plain integer wei (`"31250000000000"`, underscores allowed) or a
/// decimal value with an `ether` suffix (`"1.5 ether"`).
pub fn parse_amount(input: &str) -> Result<Wei, BondlineError> {
    let cleaned = input.trim().replace('_', "");
    if let Some(value) = cleaned.strip_suffix("ether") {
        return parse_decimal_units(value.trim());
    }
    cleaned
        .parse::<u128>()
        .map_err(|e| BondlineError::InvalidAmount(format!("{}: {}", input, e)))
}

fn parse_decimal_units(value: &str) -> Result<Wei, BondlineError> {
    let invalid = || BondlineError::InvalidAmount(format!("{} ether", value));
    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if frac.len() > DECIMALS || (whole.is_empty() && frac.is_empty()) {
        return Err(invalid());
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac_wei: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = DECIMALS);
        padded.parse().map_err(|_| invalid())?
    };
    whole
        .checked_mul(SCALE)
        .and_then(|w| w.checked_add(frac_wei))
        .ok_or_else(invalid)
}

/// Render wei as a decimal number of whole units, trimming trailing zeros.
pub fn format_amount(wei: Wei) -> String {
    let whole = wei / SCALE;
    let frac = wei % SCALE;
    if frac == 0 {
        whole.to_string()
    } else {
        let frac_str = format!("{:018}", frac);
        format!("{}.{}", whole, frac_str.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_wei() {
        assert_eq!(parse_amount("31250000000000").unwrap(), 31_250_000_000_000);
        assert_eq!(parse_amount("1_000").unwrap(), 1_000);
    }

    #[test]
    fn test_parse_ether_suffix() {
        assert_eq!(parse_amount("1 ether").unwrap(), SCALE);
        assert_eq!(parse_amount("1.5 ether").unwrap(), 1_500_000_000_000_000_000);
        assert_eq!(parse_amount(".25ether").unwrap(), 250_000_000_000_000_000);
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("1.0000000000000000001 ether").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(SCALE * 42), "42");
        assert_eq!(format_amount(1_500_000_000_000_000_000), "1.5");
        assert_eq!(format_amount(31_250_000_000_000), "0.00003125");
        assert_eq!(format_amount(0), "0");
    }
}
