// crates/bondline-curve/src/quadratic.rs
//
// Discrete quadratic curve for content shares.
//
// The n-th share costs n^2 * SCALE / K, so buying `a` shares at supply `s`
// costs the sum of squares over (s, s + a]:
//
//   Cost(s, a) = (SumSq(s + a) - SumSq(s)) * SCALE / K
//   SumSq(n)   = n (n + 1) (2n + 1) / 6
//
// With the default K = 32000 the first share costs 1e18 / 32000 wei.

use primitive_types::U512;
use serde::{Deserialize, Serialize};

use bondline_core::{BondlineError, Wei, DEFAULT_CURVE_K, SCALE};

use crate::curve::BondingCurve;
use crate::math::{checked_mul, invalid, narrow};

/// Quadratic (sum-of-squares) bonding curve over whole-share quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadraticCurve {
    k: u128,
    scale: u128,
}

impl QuadraticCurve {
    /// Create a curve with constant `k` at the native 10^18 scale.
    ///
    /// # Errors
    /// `InvalidCurveInput` if `k` is zero.
    pub fn new(k: u128) -> Result<Self, BondlineError> {
        Self::with_scale(k, SCALE)
    }

    pub fn with_scale(k: u128, scale: u128) -> Result<Self, BondlineError> {
        if k == 0 {
            return Err(invalid("curve constant K must be non-zero"));
        }
        if scale == 0 {
            return Err(invalid("curve scale must be non-zero"));
        }
        Ok(Self { k, scale })
    }

    pub fn scale(&self) -> u128 {
        self.scale
    }
}

impl Default for QuadraticCurve {
    fn default() -> Self {
        Self {
            k: DEFAULT_CURVE_K,
            scale: SCALE,
        }
    }
}

/// n (n + 1) (2n + 1) / 6, exact for every u128 input.
pub fn sum_of_squares(n: u128) -> U512 {
    let n = U512::from(n);
    let one = U512::one();
    n * (n + one) * (U512::from(2u8) * n + one) / U512::from(6u8)
}

impl BondingCurve for QuadraticCurve {
    const EXPONENT: u32 = 2;

    fn k(&self) -> u128 {
        self.k
    }

    fn unit(&self) -> u128 {
        1
    }

    fn cost(&self, supply: u128, amount: u128) -> Result<Wei, BondlineError> {
        let end = supply
            .checked_add(amount)
            .ok_or_else(|| invalid(format!("supply {} + amount {} overflows", supply, amount)))?;
        let delta = sum_of_squares(end) - sum_of_squares(supply);
        let scaled = checked_mul(delta, U512::from(self.scale), "quadratic cost")?;
        narrow(scaled / U512::from(self.k), "quadratic cost")
    }
}
