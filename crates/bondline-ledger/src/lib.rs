// crates/bondline-ledger/src/lib.rs
//
// bondline-ledger: Share ledgers for the Bondline protocol.
//
// One generic `ShareLedger` serves both markets: content shares priced by the
// quadratic curve and creator equity priced by the cubic curve. A ledger
// tracks balances, supply and collateral, enforces its fee configuration, and
// only trades on behalf of its authorized caller.

pub mod config;
pub mod ledger;
pub mod market;
pub mod trade;

pub use config::FeeConfig;
pub use ledger::{AuditReport, ContentShareLedger, CreatorShareLedger, ShareLedger};
pub use market::{ContentMarket, CreatorMarket, Market};
pub use trade::{PendingTrade, TradeReceipt};
