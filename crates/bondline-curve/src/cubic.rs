// crates/bondline-curve/src/cubic.rs
//
// Continuous cubic curve for creator equity.
//
// Quantities are fixed-point with unit U = 10^18. With n = s / U and
// m = a / U the price integral of n^2 / K is ((n + m)^3 - n^3) / (3K), so in
// integer terms:
//
//   Cost(s, a) = ((s + a)^3 - s^3) * SCALE / (3K * U^3)
//
// The inverse solves Cost(s, a) = v for a:
//
//   a = icbrt(s^3 + v * 3K * U^3 / SCALE) - s
//
// Both directions floor, so the inverse lands within one quantity unit of the
// real-valued solution and never buys more than `v` pays for.

use primitive_types::U512;
use serde::{Deserialize, Serialize};

use bondline_core::{BondlineError, Wei, DEFAULT_CURVE_K, SCALE, SHARE_UNIT};

use crate::curve::BondingCurve;
use crate::math::{checked_mul, cube, icbrt, invalid, narrow};

/// Cubic (integral of n^2) bonding curve over fixed-point quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubicCurve {
    k: u128,
    scale: u128,
    unit: u128,
}

impl CubicCurve {
    /// # Errors
    /// `InvalidCurveInput` if `k` is zero.
    pub fn new(k: u128) -> Result<Self, BondlineError> {
        if k == 0 {
            return Err(invalid("curve constant K must be non-zero"));
        }
        Ok(Self {
            k,
            scale: SCALE,
            unit: SHARE_UNIT,
        })
    }

    pub fn scale(&self) -> u128 {
        self.scale
    }

    /// 3K * U^3, the denominator shared by both directions.
    fn denominator(&self) -> U512 {
        let unit = U512::from(self.unit);
        U512::from(3u8) * U512::from(self.k) * unit * unit * unit
    }

    /// Largest quantity `a` such that buying `a` at `supply` costs at most
    /// `value` before fees.
    ///
    /// # Errors
    /// `InvalidCurveInput` if the target supply does not fit in u128.
    pub fn amount_for_value(&self, supply: u128, value: Wei) -> Result<u128, BondlineError> {
        if value == 0 {
            return Ok(0);
        }
        let s = U512::from(supply);
        let added = checked_mul(U512::from(value), self.denominator(), "inverse cubic")?
            / U512::from(self.scale);
        let target = cube(s)?
            .checked_add(added)
            .ok_or_else(|| invalid("inverse cubic overflows 512-bit arithmetic"))?;
        let end = narrow(icbrt(target), "inverse cubic supply")?;
        Ok(end.saturating_sub(supply))
    }
}

impl Default for CubicCurve {
    fn default() -> Self {
        Self {
            k: DEFAULT_CURVE_K,
            scale: SCALE,
            unit: SHARE_UNIT,
        }
    }
}

impl BondingCurve for CubicCurve {
    const EXPONENT: u32 = 3;

    fn k(&self) -> u128 {
        self.k
    }

    fn unit(&self) -> u128 {
        self.unit
    }

    fn cost(&self, supply: u128, amount: u128) -> Result<Wei, BondlineError> {
        let end = supply
            .checked_add(amount)
            .ok_or_else(|| invalid(format!("supply {} + amount {} overflows", supply, amount)))?;
        let delta = cube(U512::from(end))? - cube(U512::from(supply))?;
        let scaled = checked_mul(delta, U512::from(self.scale), "cubic cost")?;
        narrow(scaled / self.denominator(), "cubic cost")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const U: u128 = SHARE_UNIT;

    #[test]
    fn test_whole_share_costs() {
        let c = CubicCurve::default();
        assert_eq!(c.cost(0, U).unwrap(), 10_416_666_666_666);
        assert_eq!(c.cost(U, U).unwrap(), 72_916_666_666_666);
        assert_eq!(c.cost(0, U).unwrap(), 1_000_000_000_000_000_000 / 96_000);
    }

    #[test]
    fn test_amount_for_value_literals() {
        let c = CubicCurve::default();
        assert_eq!(
            c.amount_for_value(0, 10_416_666_666_666).unwrap(),
            999_999_999_999_978_666
        );
        assert_eq!(
            c.amount_for_value(U, 72_916_666_666_666).unwrap(),
            999_999_999_999_994_666
        );
        assert_eq!(c.amount_for_value(U, 0).unwrap(), 0);
    }

    #[test]
    fn test_inverse_never_overspends() {
        let c = CubicCurve::default();
        for supply in [0u128, 1, U / 3, U, 7 * U + 12_345] {
            for value in [1u128, 999, 31_249_999_999_999, 5_000_000_000_000_000] {
                let amount = c.amount_for_value(supply, value).unwrap();
                assert!(c.cost(supply, amount).unwrap() <= value);
            }
        }
    }

    #[test]
    fn test_equity_for_first_content_share() {
        // Full conversion of the first content share's raw cost.
        let c = CubicCurve::default();
        let amount = c.amount_for_value(0, 31_250_000_000_000).unwrap();
        assert_eq!(amount, 1_442_249_570_307_408_382);
        assert_eq!(c.cost(0, amount).unwrap(), 31_249_999_999_999);
    }

    #[test]
    fn test_split_within_one_wei() {
        let c = CubicCurve::default();
        for s in [0u128, U / 2, 3 * U] {
            for (a, b) in [(U, U), (U / 3, 2 * U / 3), (17, U)] {
                let whole = c.cost(s, a + b).unwrap();
                let split = c.cost(s, a).unwrap() + c.cost(s + a, b).unwrap();
                assert!(whole >= split && whole - split <= 1, "s={} a={} b={}", s, a, b);
            }
        }
    }

    #[test]
    fn test_rejects_zero_k_and_overflow() {
        assert!(CubicCurve::new(0).is_err());
        assert!(CubicCurve::default().cost(u128::MAX, 1).is_err());
        assert!(CubicCurve::default().cost(0, u128::MAX).is_err());
    }
}
