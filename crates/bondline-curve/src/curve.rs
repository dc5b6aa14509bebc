// crates/bondline-curve/src/curve.rs
//
// The pricing seam shared by both share markets.
//
// A bonding curve maps (current supply, quantity delta) to the native value
// that moving supply across that interval costs. Buying `a` at supply `s`
// costs `cost(s, a)`; selling `a` back pays `cost(s - a, a)`, so a buy
// followed by a sell of the same quantity nets out to zero before fees.

use std::fmt;

use bondline_core::{BondlineError, Wei};

/// A pure, stateless power-law pricing function.
pub trait BondingCurve: Clone + fmt::Debug + Send + Sync + 'static {
    /// Exponent the curve is named for: 2 for quadratic, 3 for cubic.
    const EXPONENT: u32;

    /// Curve constant `K` (price divisor).
    fn k(&self) -> u128;

    /// Quantity units per whole share: 1 for integer markets, 10^18 for
    /// fixed-point markets.
    fn unit(&self) -> u128;

    /// Cost of moving supply from `supply` to `supply + amount`.
    fn cost(&self, supply: u128, amount: u128) -> Result<Wei, BondlineError>;

    /// Proceeds of moving supply from `supply` down to `supply - amount`.
    fn proceeds(&self, supply: u128, amount: u128) -> Result<Wei, BondlineError> {
        let remaining = supply
            .checked_sub(amount)
            .ok_or(BondlineError::SupplyExceeded {
                requested: amount,
                supply,
            })?;
        self.cost(remaining, amount)
    }
}
