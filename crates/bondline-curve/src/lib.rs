// crates/bondline-curve/src/lib.rs
//
// bondline-curve: Pure pricing functions for the Bondline share markets.
//
// Quadratic pricing for discrete content shares, cubic pricing (and its
// inverse) for fixed-point creator equity, and the fee schedule layered on
// top of both. Nothing here holds state.

pub mod cubic;
pub mod curve;
pub mod fees;
pub mod math;
pub mod quadratic;

pub use cubic::CubicCurve;
pub use curve::BondingCurve;
pub use fees::{FeeBreakdown, FeeSchedule, TradeSide};
pub use math::{icbrt, mul_div};
pub use quadratic::QuadraticCurve;
