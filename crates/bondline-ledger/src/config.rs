// crates/bondline-ledger/src/config.rs

use serde::{Deserialize, Serialize};

use bondline_core::AccountId;
use bondline_curve::FeeSchedule;

/// Owner-controlled parameters of a share ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub fees: FeeSchedule,
    /// Recipient of the protocol fee.
    pub fee_destination: AccountId,
    /// The only account allowed to trade. `None` rejects every trade.
    pub authorized_caller: Option<AccountId>,
    /// When set, a subject owner cannot sell the final outstanding quantity.
    pub last_share_protected: bool,
    pub owner: AccountId,
}

impl FeeConfig {
    /// Zero fees, fees routed to the owner, no authorized caller yet.
    pub fn new(owner: AccountId, last_share_protected: bool) -> Self {
        Self {
            fees: FeeSchedule::default(),
            fee_destination: owner,
            authorized_caller: None,
            last_share_protected,
            owner,
        }
    }

    pub fn is_authorized(&self, caller: &AccountId) -> bool {
        self.authorized_caller.as_ref() == Some(caller)
    }
}
