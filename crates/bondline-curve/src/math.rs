// crates/bondline-curve/src/math.rs
//
// Wide-integer helpers shared by the curves and the fee schedule.
//
// Curve terms are cubes of 18-decimal fixed-point quantities, so they are
// evaluated in 512-bit space and narrowed back to u128 at the end.

use primitive_types::{U256, U512};

use bondline_core::BondlineError;

pub(crate) fn invalid(msg: impl Into<String>) -> BondlineError {
    BondlineError::InvalidCurveInput(msg.into())
}

/// Narrow a 512-bit result to u128, failing if it does not fit.
pub(crate) fn narrow(value: U512, what: &str) -> Result<u128, BondlineError> {
    if value > U512::from(u128::MAX) {
        return Err(invalid(format!("{} overflows u128", what)));
    }
    Ok(value.low_u128())
}

pub(crate) fn checked_mul(a: U512, b: U512, what: &str) -> Result<U512, BondlineError> {
    a.checked_mul(b)
        .ok_or_else(|| invalid(format!("{} overflows 512-bit arithmetic", what)))
}

pub(crate) fn cube(n: U512) -> Result<U512, BondlineError> {
    let squared = checked_mul(n, n, "cube")?;
    checked_mul(squared, n, "cube")
}

/// Compute `floor(a * b / d)` without intermediate overflow.
///
/// # Errors
/// `InvalidCurveInput` if `d` is zero or the quotient does not fit in u128.
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128, BondlineError> {
    if d == 0 {
        return Err(invalid("mul_div by zero"));
    }
    let quotient = U256::from(a) * U256::from(b) / U256::from(d);
    if quotient > U256::from(u128::MAX) {
        return Err(invalid("mul_div result overflows u128"));
    }
    Ok(quotient.low_u128())
}

/// Floor integer cube root.
///
/// Newton iteration started above the root: `x' = (2x + n / x^2) / 3`. The
/// sequence strictly decreases while `x > floor(cbrt(n))` and never drops
/// below it, so the first non-decreasing step marks the exact floor root.
pub fn icbrt(n: U512) -> U512 {
    if n.is_zero() {
        return U512::zero();
    }
    let two = U512::from(2u8);
    let three = U512::from(3u8);
    let mut x = U512::one() << ((n.bits() + 2) / 3);
    loop {
        let y = (x * two + n / (x * x)) / three;
        if y >= x {
            return x;
        }
        x = y;
    }
}
