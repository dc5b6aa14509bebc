// crates/bondline-core/src/bank.rs
//
// Native value balances of the host environment.
//
// Ledgers never move value inline. A trade first finishes its share
// bookkeeping, then hands the bank a `Settlement`: an ordered list of
// transfers. The bank replays the list against a scratch copy of the touched
// balances and only writes back if every transfer is covered, so a settlement
// either lands completely or not at all.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::account::AccountId;
use crate::error::BondlineError;
use crate::units::Wei;

/// A single movement of native value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Wei,
}

/// An ordered batch of transfers applied atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    transfers: Vec<Transfer>,
}

impl Settlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transfer. Zero-amount and self transfers are dropped.
    pub fn push(&mut self, from: AccountId, to: AccountId, amount: Wei) {
        if amount == 0 || from == to {
            return;
        }
        self.transfers.push(Transfer { from, to, amount });
    }

    /// Append every transfer of `other`, preserving order.
    pub fn extend(&mut self, other: &Settlement) {
        self.transfers.extend(other.transfers.iter().copied());
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Total value this settlement delivers to `account`.
    pub fn received_by(&self, account: &AccountId) -> Wei {
        self.transfers
            .iter()
            .filter(|t| t.to == *account)
            .map(|t| t.amount)
            .sum()
    }

    /// Total value this settlement takes from `account`.
    pub fn sent_by(&self, account: &AccountId) -> Wei {
        self.transfers
            .iter()
            .filter(|t| t.from == *account)
            .map(|t| t.amount)
            .sum()
    }
}

/// Native balances of every account known to the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bank {
    balances: HashMap<AccountId, Wei>,
}

impl Bank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &AccountId) -> Wei {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Credit new value to an account (genesis funding, faucets, tests).
    pub fn mint(&mut self, account: AccountId, amount: Wei) -> Result<(), BondlineError> {
        let current = self.balance_of(&account);
        let updated = current.checked_add(amount).ok_or_else(|| {
            BondlineError::InvalidAmount(format!("balance overflow for {}", account))
        })?;
        self.balances.insert(account, updated);
        Ok(())
    }

    /// Sum of all balances.
    pub fn total_value(&self) -> Wei {
        self.balances.values().sum()
    }

    /// Validate a settlement without applying it.
    pub fn check(&self, settlement: &Settlement) -> Result<(), BondlineError> {
        self.simulate(settlement).map(|_| ())
    }

    /// Apply a settlement atomically.
    pub fn apply(&mut self, settlement: &Settlement) -> Result<(), BondlineError> {
        let touched = self.simulate(settlement)?;
        for (account, balance) in touched {
            self.balances.insert(account, balance);
        }
        Ok(())
    }

    fn simulate(&self, settlement: &Settlement) -> Result<HashMap<AccountId, Wei>, BondlineError> {
        let mut scratch: HashMap<AccountId, Wei> = HashMap::new();
        for transfer in settlement.transfers() {
            let available = *scratch
                .entry(transfer.from)
                .or_insert_with(|| self.balance_of(&transfer.from));
            let debited = available.checked_sub(transfer.amount).ok_or(
                BondlineError::InsufficientBalance {
                    account: transfer.from,
                    required: transfer.amount,
                    available,
                },
            )?;
            scratch.insert(transfer.from, debited);

            let credited = scratch
                .entry(transfer.to)
                .or_insert_with(|| self.balance_of(&transfer.to));
            *credited = credited.checked_add(transfer.amount).ok_or_else(|| {
                BondlineError::InvalidAmount(format!("balance overflow for {}", transfer.to))
            })?;
        }
        Ok(scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::from_label("alice")
    }

    fn bob() -> AccountId {
        AccountId::from_label("bob")
    }

    fn carol() -> AccountId {
        AccountId::from_label("carol")
    }

    #[test]
    fn test_mint_and_balance() {
        let mut bank = Bank::new();
        bank.mint(alice(), 100).unwrap();
        bank.mint(alice(), 50).unwrap();
        assert_eq!(bank.balance_of(&alice()), 150);
        assert_eq!(bank.balance_of(&bob()), 0);
    }

    #[test]
    fn test_settlement_skips_zero_and_self_transfers() {
        let mut settlement = Settlement::new();
        settlement.push(alice(), bob(), 0);
        settlement.push(alice(), alice(), 10);
        assert!(settlement.is_empty());
    }

    #[test]
    fn test_apply_chained_transfers() {
        // bob has nothing up front but forwards what alice sends him.
        let mut bank = Bank::new();
        bank.mint(alice(), 100).unwrap();

        let mut settlement = Settlement::new();
        settlement.push(alice(), bob(), 60);
        settlement.push(bob(), carol(), 45);
        bank.apply(&settlement).unwrap();

        assert_eq!(bank.balance_of(&alice()), 40);
        assert_eq!(bank.balance_of(&bob()), 15);
        assert_eq!(bank.balance_of(&carol()), 45);
        assert_eq!(bank.total_value(), 100);
    }

    #[test]
    fn test_failed_settlement_changes_nothing() {
        let mut bank = Bank::new();
        bank.mint(alice(), 100).unwrap();

        let mut settlement = Settlement::new();
        settlement.push(alice(), bob(), 60);
        settlement.push(bob(), carol(), 61);

        let err = bank.apply(&settlement).unwrap_err();
        assert_eq!(
            err,
            BondlineError::InsufficientBalance {
                account: bob(),
                required: 61,
                available: 60,
            }
        );
        assert_eq!(bank.balance_of(&alice()), 100);
        assert_eq!(bank.balance_of(&bob()), 0);
        assert_eq!(bank.balance_of(&carol()), 0);
    }

    #[test]
    fn test_received_and_sent_totals() {
        let mut settlement = Settlement::new();
        settlement.push(alice(), bob(), 7);
        settlement.push(alice(), carol(), 3);
        settlement.push(carol(), bob(), 1);
        assert_eq!(settlement.sent_by(&alice()), 10);
        assert_eq!(settlement.received_by(&bob()), 8);
    }
}
