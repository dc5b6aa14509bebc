// crates/bondline-ledger/src/ledger.rs
//
// Generic share ledger: balances, supply, and collateral for one market.
//
// Trades run in two phases. `prepare_buy` / `prepare_sell` validate against
// the current state and price the trade without mutating anything;
// `commit` applies the bookkeeping. The one-shot `buy_shares` / `sell_shares`
// wrap both phases around a bank check so the whole trade lands or nothing
// does. Every mutation bumps `version`, which invalidates outstanding
// prepared trades.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use bondline_core::{AccountId, Bank, BondlineError, Governable, GovernedCall, Settlement, Wei};
use bondline_curve::{BondingCurve, CubicCurve, FeeBreakdown, TradeSide};

use crate::config::FeeConfig;
use crate::market::{ContentMarket, CreatorMarket, Market};
use crate::trade::{PendingTrade, TradeReceipt};

pub type ContentShareLedger = ShareLedger<ContentMarket>;
pub type CreatorShareLedger = ShareLedger<CreatorMarket>;

/// Result of a ledger self-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub ledger: AccountId,
    pub market: &'static str,
    pub subjects: usize,
    pub total_supply: u128,
    pub collateral: Wei,
    pub violations: Vec<String>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ShareLedger<M: Market> {
    address: AccountId,
    curve: M::Curve,
    config: FeeConfig,
    supply: HashMap<M::Subject, u128>,
    balances: HashMap<M::Subject, BTreeMap<AccountId, u128>>,
    /// Raw curve value paid in per subject.
    reserves: HashMap<M::Subject, Wei>,
    collateral: Wei,
    version: u64,
}

impl<M: Market> ShareLedger<M> {
    pub fn new(address: AccountId, owner: AccountId, curve: M::Curve, last_share_protected: bool) -> Self {
        Self {
            address,
            curve,
            config: FeeConfig::new(owner, last_share_protected),
            supply: HashMap::new(),
            balances: HashMap::new(),
            reserves: HashMap::new(),
            collateral: 0,
            version: 0,
        }
    }

    pub fn address(&self) -> AccountId {
        self.address
    }

    pub fn owner(&self) -> AccountId {
        self.config.owner
    }

    pub fn config(&self) -> &FeeConfig {
        &self.config
    }

    pub fn curve(&self) -> &M::Curve {
        &self.curve
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Raw curve value retained against outstanding shares.
    pub fn collateral(&self) -> Wei {
        self.collateral
    }

    /// Part of the collateral backing `subject`.
    pub fn reserve(&self, subject: &M::Subject) -> Wei {
        self.reserves.get(subject).copied().unwrap_or(0)
    }

    pub fn shares_balance(&self, subject: &M::Subject, holder: &AccountId) -> u128 {
        self.balances
            .get(subject)
            .and_then(|holders| holders.get(holder))
            .copied()
            .unwrap_or(0)
    }

    pub fn shares_supply(&self, subject: &M::Subject) -> u128 {
        self.supply.get(subject).copied().unwrap_or(0)
    }

    /// Subjects with non-zero supply, in order.
    pub fn subjects(&self) -> Vec<&M::Subject> {
        let mut subjects: Vec<&M::Subject> = self
            .supply
            .iter()
            .filter(|(_, supply)| **supply > 0)
            .map(|(subject, _)| subject)
            .collect();
        subjects.sort();
        subjects
    }

    /// Non-zero holders of `subject`, ordered by account.
    pub fn holders(&self, subject: &M::Subject) -> Vec<(AccountId, u128)> {
        self.balances
            .get(subject)
            .map(|holders| holders.iter().map(|(a, b)| (*a, *b)).collect())
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------
    // Pricing
    // ---------------------------------------------------------------

    /// Raw cost of moving supply from `supply` to `supply + amount`.
    pub fn get_price(&self, supply: u128, amount: u128) -> Result<Wei, BondlineError> {
        self.curve.cost(supply, amount)
    }

    pub fn get_buy_price(&self, subject: &M::Subject, amount: u128) -> Result<Wei, BondlineError> {
        self.curve.cost(self.shares_supply(subject), amount)
    }

    pub fn get_sell_price(&self, subject: &M::Subject, amount: u128) -> Result<Wei, BondlineError> {
        self.curve.proceeds(self.shares_supply(subject), amount)
    }

    pub fn get_buy_price_after_fee(&self, subject: &M::Subject, amount: u128) -> Result<Wei, BondlineError> {
        Ok(self.quote_buy(subject, amount)?.total)
    }

    pub fn get_sell_price_after_fee(&self, subject: &M::Subject, amount: u128) -> Result<Wei, BondlineError> {
        Ok(self.quote_sell(subject, amount)?.total)
    }

    pub fn quote_buy(&self, subject: &M::Subject, amount: u128) -> Result<FeeBreakdown, BondlineError> {
        let raw = self.get_buy_price(subject, amount)?;
        self.config.fees.apply(raw, TradeSide::Buy)
    }

    /// Sale proceeds never exceed the reserve of `subject`; floor rounding of
    /// split purchases can leave the curve value a wei above it.
    pub fn quote_sell(&self, subject: &M::Subject, amount: u128) -> Result<FeeBreakdown, BondlineError> {
        let raw = self.get_sell_price(subject, amount)?.min(self.reserve(subject));
        self.config.fees.apply(raw, TradeSide::Sell)
    }

    // ---------------------------------------------------------------
    // Trading
    // ---------------------------------------------------------------

    /// Validate and price a buy of `amount` for `buyer`, paid by `payer`.
    ///
    /// # Errors
    /// `Unauthorized` unless `caller` is the authorized caller,
    /// `InvalidCurveInput` for a zero amount, `InsufficientPayment` if `paid`
    /// is below the after-fee price.
    pub fn prepare_buy(
        &self,
        caller: AccountId,
        subject: &M::Subject,
        buyer: AccountId,
        payer: AccountId,
        amount: u128,
        paid: Wei,
    ) -> Result<PendingTrade<M::Subject>, BondlineError> {
        self.ensure_authorized(&caller)?;
        if amount == 0 {
            return Err(BondlineError::InvalidCurveInput(
                "amount must be greater than zero".to_string(),
            ));
        }
        let supply_before = self.shares_supply(subject);
        let price = self.quote_buy(subject, amount)?;
        if paid < price.total {
            return Err(BondlineError::InsufficientPayment {
                required: price.total,
                paid,
            });
        }

        let mut settlement = Settlement::new();
        settlement.push(payer, self.address, paid);
        self.push_fees(&mut settlement, subject, &price);
        settlement.push(self.address, payer, paid - price.total);

        Ok(PendingTrade {
            ledger: self.address,
            version: self.version,
            subject: subject.clone(),
            trader: buyer,
            amount,
            price,
            supply_before,
            settlement,
        })
    }

    /// Validate and price a sale of `amount` held by `seller`.
    ///
    /// Checks run in order: caller, amount, supply, balance, last share.
    pub fn prepare_sell(
        &self,
        caller: AccountId,
        subject: &M::Subject,
        seller: AccountId,
        amount: u128,
    ) -> Result<PendingTrade<M::Subject>, BondlineError> {
        self.prepare_exit(caller, subject, seller, amount, true)
    }

    /// Validate and price the burn of `amount` held by `holder`, driven by a
    /// trade in a coupled market.
    ///
    /// Same checks and settlement as `prepare_sell` minus the last-share rule:
    /// the holder is not choosing to exit, so the owner's final unit may go.
    pub fn prepare_burn(
        &self,
        caller: AccountId,
        subject: &M::Subject,
        holder: AccountId,
        amount: u128,
    ) -> Result<PendingTrade<M::Subject>, BondlineError> {
        self.prepare_exit(caller, subject, holder, amount, false)
    }

    fn prepare_exit(
        &self,
        caller: AccountId,
        subject: &M::Subject,
        seller: AccountId,
        amount: u128,
        owner_keeps_last: bool,
    ) -> Result<PendingTrade<M::Subject>, BondlineError> {
        self.ensure_authorized(&caller)?;
        if amount == 0 {
            return Err(BondlineError::InvalidCurveInput(
                "amount must be greater than zero".to_string(),
            ));
        }
        let supply_before = self.shares_supply(subject);
        if amount > supply_before {
            return Err(BondlineError::SupplyExceeded {
                requested: amount,
                supply: supply_before,
            });
        }
        let held = self.shares_balance(subject, &seller);
        if amount > held {
            return Err(BondlineError::InsufficientShares {
                requested: amount,
                held,
            });
        }
        if owner_keeps_last
            && self.config.last_share_protected
            && amount == supply_before
            && seller == M::subject_owner(subject)
        {
            return Err(BondlineError::AuthorCannotSellLast);
        }

        let price = self.quote_sell(subject, amount)?;
        let mut settlement = Settlement::new();
        self.push_fees(&mut settlement, subject, &price);
        settlement.push(self.address, seller, price.total);

        Ok(PendingTrade {
            ledger: self.address,
            version: self.version,
            subject: subject.clone(),
            trader: seller,
            amount,
            price,
            supply_before,
            settlement,
        })
    }

    /// Apply the bookkeeping of a prepared trade.
    ///
    /// The caller is responsible for applying `pending.settlement()` to the
    /// bank afterwards; `buy_shares` / `sell_shares` do both.
    pub fn commit(
        &mut self,
        pending: PendingTrade<M::Subject>,
    ) -> Result<TradeReceipt<M::Subject>, BondlineError> {
        if pending.ledger != self.address {
            return Err(BondlineError::LedgerMismatch {
                expected: self.address,
                found: pending.ledger,
            });
        }
        if pending.version != self.version {
            return Err(BondlineError::StaleTrade {
                prepared: pending.version,
                current: self.version,
            });
        }

        let overflow = || BondlineError::InvalidCurveInput("ledger bookkeeping overflow".to_string());
        let held = self.shares_balance(&pending.subject, &pending.trader);
        let supply = self.shares_supply(&pending.subject);
        let reserve = self.reserve(&pending.subject);
        let (balance_after, supply_after, reserve_after, collateral_after) = match pending.side() {
            TradeSide::Buy => (
                held.checked_add(pending.amount).ok_or_else(overflow)?,
                supply.checked_add(pending.amount).ok_or_else(overflow)?,
                reserve.checked_add(pending.price.raw).ok_or_else(overflow)?,
                self.collateral.checked_add(pending.price.raw).ok_or_else(overflow)?,
            ),
            TradeSide::Sell => (
                held.checked_sub(pending.amount).ok_or_else(overflow)?,
                supply.checked_sub(pending.amount).ok_or_else(overflow)?,
                reserve.checked_sub(pending.price.raw).ok_or_else(overflow)?,
                self.collateral.checked_sub(pending.price.raw).ok_or_else(overflow)?,
            ),
        };

        let holders = self.balances.entry(pending.subject.clone()).or_default();
        if balance_after == 0 {
            holders.remove(&pending.trader);
        } else {
            holders.insert(pending.trader, balance_after);
        }
        self.supply.insert(pending.subject.clone(), supply_after);
        if reserve_after == 0 {
            self.reserves.remove(&pending.subject);
        } else {
            self.reserves.insert(pending.subject.clone(), reserve_after);
        }
        self.collateral = collateral_after;
        self.version += 1;

        tracing::info!(
            market = M::NAME,
            side = %pending.side(),
            subject = %pending.subject,
            trader = %pending.trader.short(),
            amount = pending.amount,
            raw = pending.price.raw,
            total = pending.price.total,
            supply = supply_after,
            "Trade"
        );

        Ok(TradeReceipt {
            ledger: self.address,
            trader: pending.trader,
            subject: pending.subject,
            side: pending.price.side,
            amount: pending.amount,
            price: pending.price,
            supply_after,
            settlement: pending.settlement,
        })
    }

    /// Buy `amount` of `subject` for `buyer`, paid by `payer`, and settle.
    #[allow(clippy::too_many_arguments)]
    pub fn buy_shares(
        &mut self,
        bank: &mut Bank,
        caller: AccountId,
        subject: &M::Subject,
        buyer: AccountId,
        payer: AccountId,
        amount: u128,
        paid: Wei,
    ) -> Result<TradeReceipt<M::Subject>, BondlineError> {
        let pending = self.prepare_buy(caller, subject, buyer, payer, amount, paid)?;
        self.settle(bank, pending)
    }

    /// Sell `amount` of `subject` held by `seller` and settle.
    pub fn sell_shares(
        &mut self,
        bank: &mut Bank,
        caller: AccountId,
        subject: &M::Subject,
        seller: AccountId,
        amount: u128,
    ) -> Result<TradeReceipt<M::Subject>, BondlineError> {
        let pending = self.prepare_sell(caller, subject, seller, amount)?;
        self.settle(bank, pending)
    }

    fn settle(
        &mut self,
        bank: &mut Bank,
        pending: PendingTrade<M::Subject>,
    ) -> Result<TradeReceipt<M::Subject>, BondlineError> {
        bank.check(&pending.settlement)?;
        let receipt = self.commit(pending)?;
        bank.apply(&receipt.settlement)?;
        tracing::debug!(
            "Settled {} transfers for {} ledger",
            receipt.settlement.transfers().len(),
            M::NAME
        );
        Ok(receipt)
    }

    fn push_fees(&self, settlement: &mut Settlement, subject: &M::Subject, price: &FeeBreakdown) {
        settlement.push(self.address, self.config.fee_destination, price.protocol_fee);
        settlement.push(self.address, M::subject_owner(subject), price.subject_fee);
    }

    // ---------------------------------------------------------------
    // Owner setters
    // ---------------------------------------------------------------

    pub fn set_protocol_fee_percent(&mut self, caller: AccountId, bps: u32) -> Result<(), BondlineError> {
        self.ensure_owner(&caller, "set_protocol_fee_percent")?;
        self.config.fees = self.config.fees.with_protocol_bps(bps)?;
        self.touch("protocol fee", format!("{} bps", bps));
        Ok(())
    }

    pub fn set_subject_fee_percent(&mut self, caller: AccountId, bps: u32) -> Result<(), BondlineError> {
        self.ensure_owner(&caller, "set_subject_fee_percent")?;
        self.config.fees = self.config.fees.with_subject_bps(bps)?;
        self.touch("subject fee", format!("{} bps", bps));
        Ok(())
    }

    pub fn set_fee_destination(&mut self, caller: AccountId, destination: AccountId) -> Result<(), BondlineError> {
        self.ensure_owner(&caller, "set_fee_destination")?;
        self.config.fee_destination = destination;
        self.touch("fee destination", destination.to_string());
        Ok(())
    }

    pub fn set_authorized_caller(&mut self, caller: AccountId, authorized: AccountId) -> Result<(), BondlineError> {
        self.ensure_owner(&caller, "set_authorized_caller")?;
        self.config.authorized_caller = Some(authorized);
        self.touch("authorized caller", authorized.to_string());
        Ok(())
    }

    pub fn set_last_share_protected(&mut self, caller: AccountId, protected: bool) -> Result<(), BondlineError> {
        self.ensure_owner(&caller, "set_last_share_protected")?;
        self.config.last_share_protected = protected;
        self.touch("last share protection", protected.to_string());
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: AccountId, new_owner: AccountId) -> Result<(), BondlineError> {
        self.ensure_owner(&caller, "transfer_ownership")?;
        self.config.owner = new_owner;
        self.touch("owner", new_owner.to_string());
        Ok(())
    }

    fn ensure_owner(&self, caller: &AccountId, setter: &str) -> Result<(), BondlineError> {
        if *caller != self.config.owner {
            return Err(BondlineError::Unauthorized(format!(
                "{} on {} ledger requires owner {}, caller was {}",
                setter,
                M::NAME,
                self.config.owner,
                caller
            )));
        }
        Ok(())
    }

    fn ensure_authorized(&self, caller: &AccountId) -> Result<(), BondlineError> {
        if !self.config.is_authorized(caller) {
            return Err(BondlineError::Unauthorized(format!(
                "{} is not the authorized caller of the {} ledger",
                caller,
                M::NAME
            )));
        }
        Ok(())
    }

    fn touch(&mut self, field: &str, value: String) {
        self.version += 1;
        tracing::info!("{} ledger {} set to {}", M::NAME, field, value);
    }

    // ---------------------------------------------------------------
    // Audit
    // ---------------------------------------------------------------

    /// Check that every subject's supply equals the sum of its balances and
    /// that the subject reserves add up to the collateral.
    pub fn audit(&self) -> AuditReport {
        let mut violations = Vec::new();
        let mut total_supply: u128 = 0;
        for (subject, supply) in &self.supply {
            let held: u128 = self
                .balances
                .get(subject)
                .map(|holders| holders.values().sum())
                .unwrap_or(0);
            if held != *supply {
                violations.push(format!(
                    "{}: supply {} but balances sum to {}",
                    subject, supply, held
                ));
            }
            total_supply = total_supply.saturating_add(*supply);
        }
        for subject in self.balances.keys() {
            if !self.supply.contains_key(subject) {
                violations.push(format!("{}: balances recorded without supply", subject));
            }
        }
        let reserved = self
            .reserves
            .values()
            .fold(0u128, |sum, reserve| sum.saturating_add(*reserve));
        if reserved != self.collateral {
            violations.push(format!(
                "reserves sum to {} wei but collateral is {} wei",
                reserved, self.collateral
            ));
        }
        violations.sort();
        AuditReport {
            ledger: self.address,
            market: M::NAME,
            subjects: self.subjects().len(),
            total_supply,
            collateral: self.collateral,
            violations,
        }
    }
}

impl ShareLedger<CreatorMarket> {
    pub fn with_default_curve(address: AccountId, owner: AccountId, last_share_protected: bool) -> Self {
        Self::new(address, owner, CubicCurve::default(), last_share_protected)
    }

    /// Quantity of creator equity that `value` wei buys at the current supply
    /// before fees.
    pub fn amount_for_value(&self, subject: &AccountId, value: Wei) -> Result<u128, BondlineError> {
        self.curve.amount_for_value(self.shares_supply(subject), value)
    }
}

impl<M: Market> Governable for ShareLedger<M> {
    fn address(&self) -> AccountId {
        self.address
    }

    fn apply_governed(&mut self, caller: AccountId, call: &GovernedCall) -> Result<(), BondlineError> {
        match call {
            GovernedCall::SetProtocolFeePercent(bps) => {
                self.set_protocol_fee_percent(caller, u32::from(*bps))
            }
            GovernedCall::SetSubjectFeePercent(bps) => {
                self.set_subject_fee_percent(caller, u32::from(*bps))
            }
            GovernedCall::SetFeeDestination(account) => self.set_fee_destination(caller, *account),
            GovernedCall::SetAuthorizedCaller(account) => self.set_authorized_caller(caller, *account),
            GovernedCall::SetLastShareProtected(flag) => self.set_last_share_protected(caller, *flag),
            GovernedCall::TransferOwnership(account) => self.transfer_ownership(caller, *account),
            GovernedCall::SetPaused(_) => Err(BondlineError::UnsupportedSetter {
                target: self.address,
                setter: call.name().to_string(),
            }),
        }
    }
}
