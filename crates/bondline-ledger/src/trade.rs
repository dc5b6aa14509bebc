// crates/bondline-ledger/src/trade.rs
//
// Prepared and committed trades.
//
// A `PendingTrade` is a fully validated trade that has not touched the
// ledger yet. It pins the ledger version it was priced against; committing it
// after any other mutation of that ledger fails with `StaleTrade`.

use serde::Serialize;

use bondline_core::{AccountId, Settlement};
use bondline_curve::{FeeBreakdown, TradeSide};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTrade<S> {
    pub(crate) ledger: AccountId,
    pub(crate) version: u64,
    pub(crate) subject: S,
    pub(crate) trader: AccountId,
    pub(crate) amount: u128,
    pub(crate) price: FeeBreakdown,
    pub(crate) supply_before: u128,
    pub(crate) settlement: Settlement,
}

impl<S> PendingTrade<S> {
    pub fn ledger(&self) -> AccountId {
        self.ledger
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn side(&self) -> TradeSide {
        self.price.side
    }

    pub fn subject(&self) -> &S {
        &self.subject
    }

    /// Buyer or seller whose balance the trade changes.
    pub fn trader(&self) -> AccountId {
        self.trader
    }

    pub fn amount(&self) -> u128 {
        self.amount
    }

    pub fn price(&self) -> &FeeBreakdown {
        &self.price
    }

    pub fn supply_before(&self) -> u128 {
        self.supply_before
    }

    /// Value movements the trade requires once committed.
    pub fn settlement(&self) -> &Settlement {
        &self.settlement
    }
}

/// Outcome of a committed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeReceipt<S> {
    pub ledger: AccountId,
    pub trader: AccountId,
    pub subject: S,
    pub side: TradeSide,
    pub amount: u128,
    pub price: FeeBreakdown,
    pub supply_after: u128,
    pub settlement: Settlement,
}
