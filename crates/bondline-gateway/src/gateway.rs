// crates/bondline-gateway/src/gateway.rs
//
// Trading gateway: the single entry point that buys or sells content shares
// and, in the same atomic step, mints or burns the matching creator equity.
//
// Buy:
//   1. Quote the content leg; convert `equity_conversion_bps` of its raw cost
//      into a creator-equity amount at the creator's current supply.
//   2. Quote the equity leg; grand total = both after-fee prices.
//   3. Prepare both ledger legs with the gateway as caller and payer, check
//      the combined settlement, commit both, then settle once.
//
// Sell mirrors it: content proceeds go to the seller; the equity holder named
// by `EquityRecipient` sells the proportional slice of its equity.
//
// Quotes and trades share the same planning code, so a quote always equals
// what the trade charges under unchanged state.

use serde::Serialize;

use bondline_core::{
    AccountId, Bank, BondlineError, ContentKey, ContentSubject, Governable, GovernedCall,
    Settlement, Wei, BPS_DENOMINATOR,
};
use bondline_curve::{mul_div, FeeBreakdown, TradeSide};
use bondline_ledger::{ContentShareLedger, CreatorShareLedger, PendingTrade, TradeReceipt};

use crate::config::{EquityRecipient, GatewayConfig};

/// Price breakdown of a gateway trade, in the order
/// `(contentBeforeFee, contentAfterFee, creatorEquityAmount,
/// creatorFeeBefore, creatorFeeAfter, grandTotal)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriceDetails {
    pub content_before_fee: Wei,
    pub content_after_fee: Wei,
    pub creator_equity_amount: u128,
    pub creator_fee_before: Wei,
    pub creator_fee_after: Wei,
    pub grand_total: Wei,
}

impl PriceDetails {
    pub fn as_tuple(&self) -> (Wei, Wei, u128, Wei, Wei, Wei) {
        (
            self.content_before_fee,
            self.content_after_fee,
            self.creator_equity_amount,
            self.creator_fee_before,
            self.creator_fee_after,
            self.grand_total,
        )
    }

    fn from_legs(content: &FeeBreakdown, equity_amount: u128, equity: &FeeBreakdown) -> Result<Self, BondlineError> {
        let grand_total = content
            .total
            .checked_add(equity.total)
            .ok_or_else(|| BondlineError::InvalidCurveInput("grand total overflows u128".to_string()))?;
        Ok(Self {
            content_before_fee: content.raw,
            content_after_fee: content.total,
            creator_equity_amount: equity_amount,
            creator_fee_before: equity.raw,
            creator_fee_after: equity.total,
            grand_total,
        })
    }
}

/// Outcome of a gateway trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayReceipt {
    pub side: TradeSide,
    pub trader: AccountId,
    pub subject: ContentSubject,
    pub amount: u128,
    pub details: PriceDetails,
    pub equity_holder: AccountId,
    pub content: TradeReceipt<ContentSubject>,
    pub equity: Option<TradeReceipt<AccountId>>,
    /// Every transfer the trade made, in order.
    pub settlement: Settlement,
}

/// Priced legs of a gateway trade before anything is committed.
struct TradePlan {
    details: PriceDetails,
    content: FeeBreakdown,
    equity_holder: AccountId,
    equity_amount: u128,
}

#[derive(Debug, Clone)]
pub struct TradingGateway {
    address: AccountId,
    config: GatewayConfig,
}

impl TradingGateway {
    /// # Errors
    /// `Config` if the equity conversion exceeds 10000 bps.
    pub fn new(address: AccountId, config: GatewayConfig) -> Result<Self, BondlineError> {
        if config.equity_conversion_bps > BPS_DENOMINATOR {
            return Err(BondlineError::Config(format!(
                "equity conversion {} bps exceeds {}",
                config.equity_conversion_bps, BPS_DENOMINATOR
            )));
        }
        Ok(Self { address, config })
    }

    pub fn address(&self) -> AccountId {
        self.address
    }

    pub fn owner(&self) -> AccountId {
        self.config.owner
    }

    pub fn is_paused(&self) -> bool {
        self.config.paused
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Quotes
    // ---------------------------------------------------------------

    pub fn get_total_buy_price_details(
        &self,
        content: &ContentShareLedger,
        creator_ledger: &CreatorShareLedger,
        buyer: AccountId,
        creator: AccountId,
        key: &ContentKey,
        amount: u128,
    ) -> Result<PriceDetails, BondlineError> {
        self.ensure_ledgers(content, creator_ledger)?;
        let subject = ContentSubject {
            creator,
            key: key.clone(),
        };
        Ok(self.plan_buy(content, creator_ledger, &subject, buyer, amount)?.details)
    }

    pub fn get_total_sell_price_details(
        &self,
        content: &ContentShareLedger,
        creator_ledger: &CreatorShareLedger,
        seller: AccountId,
        creator: AccountId,
        key: &ContentKey,
        amount: u128,
    ) -> Result<PriceDetails, BondlineError> {
        self.ensure_ledgers(content, creator_ledger)?;
        let subject = ContentSubject {
            creator,
            key: key.clone(),
        };
        Ok(self.plan_sell(content, creator_ledger, &subject, seller, amount)?.details)
    }

    fn plan_buy(
        &self,
        content: &ContentShareLedger,
        creator_ledger: &CreatorShareLedger,
        subject: &ContentSubject,
        buyer: AccountId,
        amount: u128,
    ) -> Result<TradePlan, BondlineError> {
        if amount == 0 {
            return Err(BondlineError::InvalidCurveInput(
                "amount must be greater than zero".to_string(),
            ));
        }
        let content_price = content.quote_buy(subject, amount)?;
        let equity_value = mul_div(
            content_price.raw,
            u128::from(self.config.equity_conversion_bps),
            u128::from(BPS_DENOMINATOR),
        )?;
        let equity_amount = creator_ledger.amount_for_value(&subject.creator, equity_value)?;
        let equity_price = if equity_amount == 0 {
            FeeBreakdown::zero(TradeSide::Buy)
        } else {
            creator_ledger.quote_buy(&subject.creator, equity_amount)?
        };
        let equity_holder = match self.config.equity_recipient {
            EquityRecipient::FeeDestination => creator_ledger.config().fee_destination,
            EquityRecipient::Buyer => buyer,
        };
        Ok(TradePlan {
            details: PriceDetails::from_legs(&content_price, equity_amount, &equity_price)?,
            content: content_price,
            equity_holder,
            equity_amount,
        })
    }

    fn plan_sell(
        &self,
        content: &ContentShareLedger,
        creator_ledger: &CreatorShareLedger,
        subject: &ContentSubject,
        seller: AccountId,
        amount: u128,
    ) -> Result<TradePlan, BondlineError> {
        if amount == 0 {
            return Err(BondlineError::InvalidCurveInput(
                "amount must be greater than zero".to_string(),
            ));
        }
        let held = content.shares_balance(subject, &seller);
        if amount > held {
            return Err(BondlineError::InsufficientShares {
                requested: amount,
                held,
            });
        }
        let content_price = content.quote_sell(subject, amount)?;

        // Burn the slice of equity that the sold content shares stand for.
        let (equity_holder, base) = match self.config.equity_recipient {
            EquityRecipient::FeeDestination => (
                creator_ledger.config().fee_destination,
                content.shares_supply(subject),
            ),
            EquityRecipient::Buyer => (seller, held),
        };
        let holding = creator_ledger.shares_balance(&subject.creator, &equity_holder);
        let equity_amount = if base == 0 {
            0
        } else {
            mul_div(holding, amount, base)?
        };
        let equity_price = if equity_amount == 0 {
            FeeBreakdown::zero(TradeSide::Sell)
        } else {
            creator_ledger.quote_sell(&subject.creator, equity_amount)?
        };
        Ok(TradePlan {
            details: PriceDetails::from_legs(&content_price, equity_amount, &equity_price)?,
            content: content_price,
            equity_holder,
            equity_amount,
        })
    }

    // ---------------------------------------------------------------
    // Trading
    // ---------------------------------------------------------------

    /// Buy `amount` content shares of `(creator, key)` for `caller`, minting
    /// the matching creator equity, paid with `paid` wei from `caller`.
    #[allow(clippy::too_many_arguments)]
    pub fn buy_shares(
        &mut self,
        content: &mut ContentShareLedger,
        creator_ledger: &mut CreatorShareLedger,
        bank: &mut Bank,
        caller: AccountId,
        creator: AccountId,
        key: &ContentKey,
        amount: u128,
        paid: Wei,
    ) -> Result<GatewayReceipt, BondlineError> {
        self.ensure_open()?;
        self.ensure_ledgers(content, creator_ledger)?;
        let subject = ContentSubject {
            creator,
            key: key.clone(),
        };
        let plan = self.plan_buy(content, creator_ledger, &subject, caller, amount)?;
        let details = plan.details;
        if paid < details.grand_total {
            return Err(BondlineError::NotEnoughFunds {
                required: details.grand_total,
                paid,
            });
        }

        let content_leg = content.prepare_buy(
            self.address,
            &subject,
            caller,
            self.address,
            amount,
            plan.content.total,
        )?;
        let equity_leg = if plan.equity_amount == 0 {
            None
        } else {
            Some(creator_ledger.prepare_buy(
                self.address,
                &creator,
                plan.equity_holder,
                self.address,
                plan.equity_amount,
                details.creator_fee_after,
            )?)
        };

        let mut settlement = Settlement::new();
        settlement.push(caller, self.address, paid);
        settlement.extend(content_leg.settlement());
        if let Some(leg) = &equity_leg {
            settlement.extend(leg.settlement());
        }
        settlement.push(self.address, caller, paid - details.grand_total);

        let receipt = self.commit_legs(
            content,
            creator_ledger,
            bank,
            content_leg,
            equity_leg,
            settlement,
        )?;
        tracing::info!(
            "Gateway buy: {} x{} by {} for {} wei ({} equity to {})",
            subject,
            amount,
            caller.short(),
            details.grand_total,
            plan.equity_amount,
            plan.equity_holder.short()
        );
        Ok(GatewayReceipt {
            side: TradeSide::Buy,
            trader: caller,
            subject,
            amount,
            details,
            equity_holder: plan.equity_holder,
            content: receipt.content,
            equity: receipt.equity,
            settlement: receipt.settlement,
        })
    }

    /// Sell `amount` content shares of `(creator, key)` held by `caller`,
    /// burning the proportional creator equity.
    #[allow(clippy::too_many_arguments)]
    pub fn sell_shares(
        &mut self,
        content: &mut ContentShareLedger,
        creator_ledger: &mut CreatorShareLedger,
        bank: &mut Bank,
        caller: AccountId,
        creator: AccountId,
        key: &ContentKey,
        amount: u128,
    ) -> Result<GatewayReceipt, BondlineError> {
        self.ensure_open()?;
        self.ensure_ledgers(content, creator_ledger)?;
        let subject = ContentSubject {
            creator,
            key: key.clone(),
        };
        let plan = self.plan_sell(content, creator_ledger, &subject, caller, amount)?;
        let details = plan.details;

        let content_leg = content.prepare_sell(self.address, &subject, caller, amount)?;
        let equity_leg = if plan.equity_amount == 0 {
            None
        } else {
            Some(creator_ledger.prepare_burn(
                self.address,
                &creator,
                plan.equity_holder,
                plan.equity_amount,
            )?)
        };

        let mut settlement = Settlement::new();
        settlement.extend(content_leg.settlement());
        if let Some(leg) = &equity_leg {
            settlement.extend(leg.settlement());
        }

        let receipt = self.commit_legs(
            content,
            creator_ledger,
            bank,
            content_leg,
            equity_leg,
            settlement,
        )?;
        tracing::info!(
            "Gateway sell: {} x{} by {} for {} wei ({} equity from {})",
            subject,
            amount,
            caller.short(),
            details.grand_total,
            plan.equity_amount,
            plan.equity_holder.short()
        );
        Ok(GatewayReceipt {
            side: TradeSide::Sell,
            trader: caller,
            subject,
            amount,
            details,
            equity_holder: plan.equity_holder,
            content: receipt.content,
            equity: receipt.equity,
            settlement: receipt.settlement,
        })
    }

    /// Check the combined settlement, commit both legs, then settle.
    fn commit_legs(
        &self,
        content: &mut ContentShareLedger,
        creator_ledger: &mut CreatorShareLedger,
        bank: &mut Bank,
        content_leg: PendingTrade<ContentSubject>,
        equity_leg: Option<PendingTrade<AccountId>>,
        settlement: Settlement,
    ) -> Result<CommittedLegs, BondlineError> {
        bank.check(&settlement)?;
        let content_receipt = content.commit(content_leg)?;
        let equity_receipt = equity_leg.map(|leg| creator_ledger.commit(leg)).transpose()?;
        bank.apply(&settlement)?;
        tracing::debug!("Gateway settled {} transfers", settlement.transfers().len());
        Ok(CommittedLegs {
            content: content_receipt,
            equity: equity_receipt,
            settlement,
        })
    }

    // ---------------------------------------------------------------
    // Owner setters
    // ---------------------------------------------------------------

    pub fn set_paused(&mut self, caller: AccountId, paused: bool) -> Result<(), BondlineError> {
        self.ensure_owner(&caller, "set_paused")?;
        self.config.paused = paused;
        tracing::info!("Gateway {}", if paused { "paused" } else { "unpaused" });
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: AccountId, new_owner: AccountId) -> Result<(), BondlineError> {
        self.ensure_owner(&caller, "transfer_ownership")?;
        self.config.owner = new_owner;
        tracing::info!("Gateway owner set to {}", new_owner);
        Ok(())
    }

    fn ensure_owner(&self, caller: &AccountId, setter: &str) -> Result<(), BondlineError> {
        if *caller != self.config.owner {
            return Err(BondlineError::Unauthorized(format!(
                "{} on gateway requires owner {}, caller was {}",
                setter, self.config.owner, caller
            )));
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), BondlineError> {
        if self.config.paused {
            return Err(BondlineError::TradingPaused);
        }
        Ok(())
    }

    fn ensure_ledgers(
        &self,
        content: &ContentShareLedger,
        creator_ledger: &CreatorShareLedger,
    ) -> Result<(), BondlineError> {
        if content.address() != self.config.content_ledger {
            return Err(BondlineError::LedgerMismatch {
                expected: self.config.content_ledger,
                found: content.address(),
            });
        }
        if creator_ledger.address() != self.config.creator_ledger {
            return Err(BondlineError::LedgerMismatch {
                expected: self.config.creator_ledger,
                found: creator_ledger.address(),
            });
        }
        Ok(())
    }
}

struct CommittedLegs {
    content: TradeReceipt<ContentSubject>,
    equity: Option<TradeReceipt<AccountId>>,
    settlement: Settlement,
}

impl Governable for TradingGateway {
    fn address(&self) -> AccountId {
        self.address
    }

    fn apply_governed(&mut self, caller: AccountId, call: &GovernedCall) -> Result<(), BondlineError> {
        match call {
            GovernedCall::SetPaused(paused) => self.set_paused(caller, *paused),
            GovernedCall::TransferOwnership(account) => self.transfer_ownership(caller, *account),
            _ => Err(BondlineError::UnsupportedSetter {
                target: self.address,
                setter: call.name().to_string(),
            }),
        }
    }
}
