// crates/bondline-gateway/src/config.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use bondline_core::AccountId;

/// Share of the raw content cost converted into creator equity: 10%.
pub const DEFAULT_EQUITY_CONVERSION_BPS: u32 = 1_000;

/// Who holds the creator equity minted alongside content purchases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityRecipient {
    /// The creator ledger's fee destination accumulates all equity. A sale of
    /// `q` content shares burns `q / content supply` of its holding.
    #[default]
    FeeDestination,
    /// Each buyer receives the equity its purchase paid for. A sale of `q`
    /// content shares burns `q / seller's content balance` of the seller's
    /// equity.
    Buyer,
}

impl fmt::Display for EquityRecipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquityRecipient::FeeDestination => write!(f, "fee_destination"),
            EquityRecipient::Buyer => write!(f, "buyer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub owner: AccountId,
    /// Trading starts paused and is opened by the owner.
    pub paused: bool,
    pub content_ledger: AccountId,
    pub creator_ledger: AccountId,
    pub equity_conversion_bps: u32,
    pub equity_recipient: EquityRecipient,
}

impl GatewayConfig {
    pub fn new(owner: AccountId, content_ledger: AccountId, creator_ledger: AccountId) -> Self {
        Self {
            owner,
            paused: true,
            content_ledger,
            creator_ledger,
            equity_conversion_bps: DEFAULT_EQUITY_CONVERSION_BPS,
            equity_recipient: EquityRecipient::default(),
        }
    }
}
