// crates/bondline-protocol/src/protocol.rs
//
// Protocol: one deployed Bondline instance together with its host environment.
//
// Owns the native-value bank, the ledger clock, both share ledgers, the
// trading gateway and the timelock governor. Every method is one atomic step
// taken under `&mut self`.

use serde::Serialize;

use bondline_core::{
    AccountId, Bank, BondlineError, ContentKey, Governable, GovernedCall, LedgerClock, Wei,
};
use bondline_curve::{CubicCurve, QuadraticCurve};
use bondline_gateway::{GatewayConfig, GatewayReceipt, PriceDetails, TradingGateway};
use bondline_governor::{Action, GovernedTargets, OperationState, RoleSet, TimelockGovernor};
use bondline_ledger::{AuditReport, ContentShareLedger, CreatorShareLedger, Market, ShareLedger};

use crate::config::ProtocolConfig;

#[derive(Debug, Clone)]
pub struct Protocol {
    pub bank: Bank,
    pub clock: LedgerClock,
    pub content: ContentShareLedger,
    pub creator: CreatorShareLedger,
    pub gateway: TradingGateway,
    pub governor: TimelockGovernor,
    /// Total native value ever minted through `fund`.
    minted: Wei,
}

/// Mutable view of the governed instances handed to the governor.
pub struct Targets<'a> {
    pub content: &'a mut ContentShareLedger,
    pub creator: &'a mut CreatorShareLedger,
    pub gateway: &'a mut TradingGateway,
}

impl GovernedTargets for Targets<'_> {
    fn resolve(&mut self, target: AccountId) -> Option<&mut dyn Governable> {
        if target == self.content.address() {
            Some(&mut *self.content)
        } else if target == self.creator.address() {
            Some(&mut *self.creator)
        } else if target == self.gateway.address() {
            Some(&mut *self.gateway)
        } else {
            None
        }
    }
}

/// Conservation check over the whole deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolAudit {
    pub ledgers: Vec<AuditReport>,
    pub minted: Wei,
    pub bank_total: Wei,
    pub violations: Vec<String>,
}

impl ProtocolAudit {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

impl Protocol {
    /// Deploy both ledgers, the gateway and the governor from `config`.
    ///
    /// The gateway becomes the authorized caller of both ledgers. With
    /// `governance.transfer_ownership` set, the governor ends up owning all
    /// three instances.
    pub fn deploy(config: &ProtocolConfig) -> Result<Self, BondlineError> {
        let owner = config.owner;
        let addresses = &config.addresses;

        let content_curve = QuadraticCurve::new(u128::from(config.content_curve_k))?;
        let creator_curve = CubicCurve::new(u128::from(config.creator_curve_k))?;
        let mut content = ContentShareLedger::new(
            addresses.content_ledger,
            owner,
            content_curve,
            config.last_share_protected,
        );
        let mut creator = CreatorShareLedger::new(
            addresses.creator_ledger,
            owner,
            creator_curve,
            config.last_share_protected,
        );
        configure_ledger(&mut content, config)?;
        configure_ledger(&mut creator, config)?;

        let mut gateway_config = GatewayConfig::new(owner, content.address(), creator.address());
        gateway_config.equity_conversion_bps = config.equity_conversion_bps;
        gateway_config.equity_recipient = config.equity_recipient;
        let mut gateway = TradingGateway::new(addresses.gateway, gateway_config)?;
        if !config.start_paused {
            gateway.set_paused(owner, false)?;
        }

        let governance = &config.governance;
        let roles = RoleSet::new(
            governance.proposers.iter().copied(),
            governance.executors.iter().copied(),
            governance.cancellers.iter().copied(),
        );
        let governor = TimelockGovernor::new(
            addresses.governor,
            governance.min_delay_secs,
            roles,
            config.admin(),
        );
        if governance.transfer_ownership {
            content.transfer_ownership(owner, governor.address())?;
            creator.transfer_ownership(owner, governor.address())?;
            gateway.transfer_ownership(owner, governor.address())?;
        }

        tracing::info!(
            "Deployed Bondline: content ledger {}, creator ledger {}, gateway {}, governor {}",
            content.address().short(),
            creator.address().short(),
            gateway.address().short(),
            governor.address().short()
        );

        Ok(Self {
            bank: Bank::new(),
            clock: LedgerClock::default(),
            content,
            creator,
            gateway,
            governor,
            minted: 0,
        })
    }

    /// Credit native value to an account.
    pub fn fund(&mut self, account: AccountId, amount: Wei) -> Result<(), BondlineError> {
        let minted = self
            .minted
            .checked_add(amount)
            .ok_or_else(|| BondlineError::InvalidAmount("total minted overflows".to_string()))?;
        self.bank.mint(account, amount)?;
        self.minted = minted;
        tracing::debug!("Funded {} with {} wei", account.short(), amount);
        Ok(())
    }

    pub fn advance_time(&mut self, seconds: u64) -> u64 {
        self.clock.advance(seconds)
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn buy(
        &mut self,
        caller: AccountId,
        creator: AccountId,
        key: &ContentKey,
        amount: u128,
        paid: Wei,
    ) -> Result<GatewayReceipt, BondlineError> {
        self.gateway.buy_shares(
            &mut self.content,
            &mut self.creator,
            &mut self.bank,
            caller,
            creator,
            key,
            amount,
            paid,
        )
    }

    pub fn sell(
        &mut self,
        caller: AccountId,
        creator: AccountId,
        key: &ContentKey,
        amount: u128,
    ) -> Result<GatewayReceipt, BondlineError> {
        self.gateway.sell_shares(
            &mut self.content,
            &mut self.creator,
            &mut self.bank,
            caller,
            creator,
            key,
            amount,
        )
    }

    pub fn quote_buy(
        &self,
        buyer: AccountId,
        creator: AccountId,
        key: &ContentKey,
        amount: u128,
    ) -> Result<PriceDetails, BondlineError> {
        let details = self
            .gateway
            .get_total_buy_price_details(&self.content, &self.creator, buyer, creator, key, amount)?;
        tracing::debug!("Buy quote for {}:{} x{}: {:?}", creator.short(), key, amount, details);
        Ok(details)
    }

    pub fn quote_sell(
        &self,
        seller: AccountId,
        creator: AccountId,
        key: &ContentKey,
        amount: u128,
    ) -> Result<PriceDetails, BondlineError> {
        let details = self
            .gateway
            .get_total_sell_price_details(&self.content, &self.creator, seller, creator, key, amount)?;
        tracing::debug!("Sell quote for {}:{} x{}: {:?}", creator.short(), key, amount, details);
        Ok(details)
    }

    /// Submit a timelock action at the current ledger time.
    pub fn govern(
        &mut self,
        caller: AccountId,
        target: AccountId,
        call: GovernedCall,
        action: Action,
        salt: [u8; 32],
    ) -> Result<OperationState, BondlineError> {
        let now = self.clock.now();
        let mut targets = Targets {
            content: &mut self.content,
            creator: &mut self.creator,
            gateway: &mut self.gateway,
        };
        self.governor
            .submit(&mut targets, caller, now, target, call, action, salt)
    }

    /// Pause or unpause the gateway directly as its owner.
    pub fn set_paused(&mut self, caller: AccountId, paused: bool) -> Result<(), BondlineError> {
        self.gateway.set_paused(caller, paused)
    }

    /// Check supply and value conservation across the deployment.
    pub fn audit(&self) -> ProtocolAudit {
        let ledgers = vec![self.content.audit(), self.creator.audit()];
        let mut violations: Vec<String> = ledgers
            .iter()
            .flat_map(|report| {
                report
                    .violations
                    .iter()
                    .map(move |v| format!("{} ledger: {}", report.market, v))
            })
            .collect();

        collateral_matches_bank(&self.content, &self.bank, &mut violations);
        collateral_matches_bank(&self.creator, &self.bank, &mut violations);

        let gateway_balance = self.bank.balance_of(&self.gateway.address());
        if gateway_balance != 0 {
            violations.push(format!("gateway holds {} wei between trades", gateway_balance));
        }
        let bank_total = self.bank.total_value();
        if bank_total != self.minted {
            violations.push(format!(
                "bank holds {} wei but {} wei were minted",
                bank_total, self.minted
            ));
        }

        if !violations.is_empty() {
            tracing::warn!("Audit found {} violations", violations.len());
        }
        ProtocolAudit {
            ledgers,
            minted: self.minted,
            bank_total,
            violations,
        }
    }
}

fn configure_ledger<M: Market>(ledger: &mut ShareLedger<M>, config: &ProtocolConfig) -> Result<(), BondlineError> {
    let owner = config.owner;
    ledger.set_protocol_fee_percent(owner, config.protocol_fee_bps)?;
    ledger.set_subject_fee_percent(owner, config.subject_fee_bps)?;
    ledger.set_fee_destination(owner, config.fee_destination())?;
    ledger.set_authorized_caller(owner, config.addresses.gateway)?;
    Ok(())
}

fn collateral_matches_bank<M: Market>(ledger: &ShareLedger<M>, bank: &Bank, violations: &mut Vec<String>) {
    let held = bank.balance_of(&ledger.address());
    if held != ledger.collateral() {
        violations.push(format!(
            "{} ledger collateral {} wei but bank balance {} wei",
            M::NAME,
            ledger.collateral(),
            held
        ));
    }
}
