// crates/bondline-curve/src/fees.rs
//
// Fee schedule applied on top of raw curve prices.
//
// Each fee is floor(raw * bps / 10000), computed independently. Buys pay raw
// plus both fees; sells receive raw minus both fees.

use std::fmt;

use serde::{Deserialize, Serialize};

use bondline_core::{BondlineError, Wei, BPS_DENOMINATOR};

use crate::math::{invalid, mul_div};

/// Direction of a trade against a share ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Protocol and subject fee rates in basis points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    protocol_bps: u32,
    subject_bps: u32,
}

impl FeeSchedule {
    /// # Errors
    /// `FeePercentOutOfRange` if either rate exceeds 10000 bps or their sum
    /// does.
    pub fn new(protocol_bps: u32, subject_bps: u32) -> Result<Self, BondlineError> {
        let out_of_range = protocol_bps > BPS_DENOMINATOR
            || subject_bps > BPS_DENOMINATOR
            || protocol_bps + subject_bps > BPS_DENOMINATOR;
        if out_of_range {
            return Err(BondlineError::FeePercentOutOfRange {
                protocol_bps,
                subject_bps,
            });
        }
        Ok(Self {
            protocol_bps,
            subject_bps,
        })
    }

    pub fn protocol_bps(&self) -> u32 {
        self.protocol_bps
    }

    pub fn subject_bps(&self) -> u32 {
        self.subject_bps
    }

    pub fn with_protocol_bps(&self, protocol_bps: u32) -> Result<Self, BondlineError> {
        Self::new(protocol_bps, self.subject_bps)
    }

    pub fn with_subject_bps(&self, subject_bps: u32) -> Result<Self, BondlineError> {
        Self::new(self.protocol_bps, subject_bps)
    }

    /// Split a raw curve price into its fee components for `side`.
    pub fn apply(&self, raw: Wei, side: TradeSide) -> Result<FeeBreakdown, BondlineError> {
        let denominator = u128::from(BPS_DENOMINATOR);
        let protocol_fee = mul_div(raw, u128::from(self.protocol_bps), denominator)?;
        let subject_fee = mul_div(raw, u128::from(self.subject_bps), denominator)?;
        let fees = protocol_fee + subject_fee;
        let total = match side {
            TradeSide::Buy => raw
                .checked_add(fees)
                .ok_or_else(|| invalid("price after fee overflows u128"))?,
            // Combined bps never exceed the denominator, so fees <= raw.
            TradeSide::Sell => raw - fees,
        };
        Ok(FeeBreakdown {
            side,
            raw,
            protocol_fee,
            subject_fee,
            total,
        })
    }
}

/// A priced trade: raw curve value, each fee, and the after-fee total.
///
/// `total` is what a buyer pays or what a seller receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub side: TradeSide,
    pub raw: Wei,
    pub protocol_fee: Wei,
    pub subject_fee: Wei,
    pub total: Wei,
}

impl FeeBreakdown {
    pub fn zero(side: TradeSide) -> Self {
        Self {
            side,
            raw: 0,
            protocol_fee: 0,
            subject_fee: 0,
            total: 0,
        }
    }

    pub fn fees(&self) -> Wei {
        self.protocol_fee + self.subject_fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_and_five_percent() {
        let fees = FeeSchedule::new(500, 500).unwrap();
        let raw = 31_250_000_000_000;

        let buy = fees.apply(raw, TradeSide::Buy).unwrap();
        assert_eq!(buy.protocol_fee, 1_562_500_000_000);
        assert_eq!(buy.subject_fee, 1_562_500_000_000);
        assert_eq!(buy.total, raw * 110 / 100);

        let sell = fees.apply(raw, TradeSide::Sell).unwrap();
        assert_eq!(sell.total, raw * 90 / 100);
    }

    #[test]
    fn test_fees_floor_independently() {
        let fees = FeeSchedule::new(500, 500).unwrap();
        let buy = fees.apply(31_249_999_999_999, TradeSide::Buy).unwrap();
        assert_eq!(buy.protocol_fee, 1_562_499_999_999);
        assert_eq!(buy.total, 31_249_999_999_999 + 2 * 1_562_499_999_999);
    }

    #[test]
    fn test_zero_fees_pass_through() {
        let fees = FeeSchedule::default();
        let sell = fees.apply(42, TradeSide::Sell).unwrap();
        assert_eq!(sell.total, 42);
        assert_eq!(sell.fees(), 0);
    }

    #[test]
    fn test_out_of_range_rates() {
        assert!(FeeSchedule::new(10_000, 0).is_ok());
        assert_eq!(
            FeeSchedule::new(10_001, 0).unwrap_err(),
            BondlineError::FeePercentOutOfRange {
                protocol_bps: 10_001,
                subject_bps: 0
            }
        );
        assert!(FeeSchedule::new(6_000, 5_000).is_err());
        let fees = FeeSchedule::new(6_000, 0).unwrap();
        assert!(fees.with_subject_bps(4_000).is_ok());
        assert!(fees.with_subject_bps(4_001).is_err());
    }
}
