// crates/bondline-cli/src/commands/replay.rs
//
// `bondline replay SCENARIO.toml`: deploy a protocol and replay a scripted
// sequence of funding, trades, clock moves and governance actions.
//
// A failing step is reported and reverted like any rejected call; the replay
// continues with the next step. The final audit must come out clean.

use std::collections::BTreeMap;
use std::fs;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use bondline_core::{format_amount, parse_amount, AccountId, BondlineError, ContentKey, GovernedCall, LedgerClock, Wei};
use bondline_governor::{Action, ZERO_SALT};
use bondline_protocol::{Protocol, ProtocolAudit, ProtocolConfig};

use crate::output::{format_json, format_table, OutputFormat};

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Scenario file to replay.
    pub scenario: String,

    /// Exit with an error if any step is rejected.
    #[arg(long)]
    pub strict: bool,
}

// ---------------------------------------------------------------------------
// Scenario file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// RFC 3339 start time of the ledger clock.
    #[serde(default)]
    pub start: Option<String>,
    /// Deployment settings; replaces the --config file when present.
    #[serde(default)]
    pub config: Option<ProtocolConfig>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A native amount or share quantity: TOML integer, or a string accepted by
/// `parse_amount` (`"31250000000000"`, `"0.5 ether"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(u64),
    Text(String),
}

impl Quantity {
    pub fn value(&self) -> Result<u128, BondlineError> {
        match self {
            Quantity::Number(n) => Ok(u128::from(*n)),
            Quantity::Text(s) => parse_amount(s),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Fund {
        account: String,
        amount: Quantity,
    },
    Buy {
        trader: String,
        creator: String,
        content: String,
        qty: Quantity,
        /// Value sent with the buy. Defaults to the quoted grand total.
        #[serde(default)]
        paid: Option<Quantity>,
    },
    Sell {
        trader: String,
        creator: String,
        content: String,
        qty: Quantity,
    },
    Advance {
        seconds: u64,
    },
    Pause {
        caller: String,
        paused: bool,
    },
    Govern {
        caller: String,
        target: String,
        action: Action,
        call: GovernedCall,
        /// 32-byte hex salt. Defaults to zero.
        #[serde(default)]
        salt: Option<String>,
    },
}

impl Step {
    fn describe(&self) -> String {
        match self {
            Step::Fund { account, .. } => format!("fund {}", account),
            Step::Buy {
                trader,
                creator,
                content,
                ..
            } => format!("{} buys {}:{}", trader, creator, content),
            Step::Sell {
                trader,
                creator,
                content,
                ..
            } => format!("{} sells {}:{}", trader, creator, content),
            Step::Advance { seconds } => format!("advance {}s", seconds),
            Step::Pause { caller, paused } => format!("{} sets paused={}", caller, paused),
            Step::Govern {
                caller,
                target,
                action,
                call,
                ..
            } => format!("{} {} {} on {}", caller, action, call, target),
        }
    }
}

pub fn load_scenario(path: &str) -> Result<Scenario, BondlineError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| BondlineError::Config(format!("cannot read {}: {}", path, e)))?;
    toml::from_str(&contents).map_err(|e| BondlineError::Config(e.to_string()))
}

// ---------------------------------------------------------------------------
// Address book
// ---------------------------------------------------------------------------

/// Labels for every account a scenario touches, for display.
#[derive(Debug, Default)]
pub struct AddressBook {
    names: BTreeMap<AccountId, String>,
}

impl AddressBook {
    fn for_protocol(config: &ProtocolConfig) -> Self {
        let mut book = Self::default();
        let addresses = &config.addresses;
        book.names.insert(addresses.content_ledger, "content-ledger".to_string());
        book.names.insert(addresses.creator_ledger, "creator-ledger".to_string());
        book.names.insert(addresses.gateway, "gateway".to_string());
        book.names.insert(addresses.governor, "timelock".to_string());
        book.names.entry(config.owner).or_insert_with(|| "owner".to_string());
        book.names
            .entry(config.fee_destination())
            .or_insert_with(|| "fee-destination".to_string());
        book
    }

    /// Resolve `name` and remember it.
    pub fn resolve(&mut self, name: &str) -> Result<AccountId, BondlineError> {
        let account = AccountId::parse(name)?;
        self.names.insert(account, name.trim().to_string());
        Ok(account)
    }

    pub fn name(&self, account: &AccountId) -> String {
        self.names
            .get(account)
            .cloned()
            .unwrap_or_else(|| account.short())
    }

    fn accounts(&self) -> impl Iterator<Item = (&AccountId, &String)> {
        self.names.iter()
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct StepOutcome {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Step")]
    pub step: String,
    #[tabled(rename = "OK")]
    pub ok: bool,
    #[tabled(rename = "Outcome")]
    pub outcome: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct BalanceRow {
    #[tabled(rename = "Account")]
    pub name: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Balance")]
    pub balance: String,
    #[tabled(rename = "Wei")]
    pub wei: Wei,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct HoldingRow {
    #[tabled(rename = "Market")]
    pub market: &'static str,
    #[tabled(rename = "Subject")]
    pub subject: String,
    #[tabled(rename = "Holder")]
    pub holder: String,
    #[tabled(rename = "Shares")]
    pub shares: u128,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub outcomes: Vec<StepOutcome>,
    pub balances: Vec<BalanceRow>,
    pub holdings: Vec<HoldingRow>,
    pub audit: ProtocolAudit,
}

/// A protocol after a scenario ran against it.
pub struct Replay {
    pub protocol: Protocol,
    pub book: AddressBook,
    pub outcomes: Vec<StepOutcome>,
    dated: bool,
}

impl Replay {
    /// Deploy from the scenario's config (or `fallback`) and run every step.
    pub fn play(scenario: &Scenario, fallback: &ProtocolConfig) -> Result<Self, BondlineError> {
        let config = scenario.config.clone().unwrap_or_else(|| fallback.clone());
        let mut protocol = Protocol::deploy(&config)?;
        if let Some(start) = &scenario.start {
            let start = DateTime::parse_from_rfc3339(start)
                .map_err(|e| BondlineError::Config(format!("start {}: {}", start, e)))?;
            let seconds = u64::try_from(start.timestamp())
                .map_err(|_| BondlineError::Config("start precedes the epoch".to_string()))?;
            protocol.clock = LedgerClock::starting_at(seconds);
        }

        let mut replay = Self {
            protocol,
            book: AddressBook::for_protocol(&config),
            outcomes: Vec::with_capacity(scenario.steps.len()),
            dated: scenario.start.is_some(),
        };
        for (i, step) in scenario.steps.iter().enumerate() {
            let result = replay.apply(step);
            let (ok, outcome) = match result {
                Ok(summary) => (true, summary),
                Err(e) => {
                    tracing::warn!("Step {} ({}) rejected: {}", i + 1, step.describe(), e);
                    (false, e.to_string())
                }
            };
            let time = replay.time_label();
            replay.outcomes.push(StepOutcome {
                index: i + 1,
                time,
                step: step.describe(),
                ok,
                outcome,
            });
        }
        Ok(replay)
    }

    fn apply(&mut self, step: &Step) -> Result<String, BondlineError> {
        match step {
            Step::Fund { account, amount } => {
                let account = self.book.resolve(account)?;
                let amount = amount.value()?;
                self.protocol.fund(account, amount)?;
                Ok(format!("+{}", format_amount(amount)))
            }
            Step::Buy {
                trader,
                creator,
                content,
                qty,
                paid,
            } => {
                let trader = self.book.resolve(trader)?;
                let creator = self.book.resolve(creator)?;
                let key = ContentKey::new(content.as_str());
                let qty = qty.value()?;
                let paid = match paid {
                    Some(paid) => paid.value()?,
                    None => self.protocol.quote_buy(trader, creator, &key, qty)?.grand_total,
                };
                let receipt = self.protocol.buy(trader, creator, &key, qty, paid)?;
                Ok(format!(
                    "{} shares for {} wei, {} equity to {}",
                    qty,
                    receipt.details.grand_total,
                    receipt.details.creator_equity_amount,
                    self.book.name(&receipt.equity_holder)
                ))
            }
            Step::Sell {
                trader,
                creator,
                content,
                qty,
            } => {
                let trader = self.book.resolve(trader)?;
                let creator = self.book.resolve(creator)?;
                let key = ContentKey::new(content.as_str());
                let qty = qty.value()?;
                let receipt = self.protocol.sell(trader, creator, &key, qty)?;
                Ok(format!(
                    "{} shares for {} wei, {} equity burned from {}",
                    qty,
                    receipt.details.grand_total,
                    receipt.details.creator_equity_amount,
                    self.book.name(&receipt.equity_holder)
                ))
            }
            Step::Advance { seconds } => {
                let now = self.protocol.advance_time(*seconds);
                Ok(format!("clock at {}", now))
            }
            Step::Pause { caller, paused } => {
                let caller = self.book.resolve(caller)?;
                self.protocol.set_paused(caller, *paused)?;
                let state = if *paused { "paused" } else { "unpaused" };
                Ok(state.to_string())
            }
            Step::Govern {
                caller,
                target,
                action,
                call,
                salt,
            } => {
                let caller = self.book.resolve(caller)?;
                let target = self.book.resolve(target)?;
                let salt = match salt {
                    Some(hex) => parse_salt(hex)?,
                    None => ZERO_SALT,
                };
                let state = self
                    .protocol
                    .govern(caller, target, call.clone(), *action, salt)?;
                Ok(state.to_string())
            }
        }
    }

    fn time_label(&self) -> String {
        let now = self.protocol.now();
        if !self.dated {
            return format!("t+{}s", now);
        }
        i64::try_from(now)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| now.to_string())
    }

    pub fn balances(&self) -> Vec<BalanceRow> {
        self.book
            .accounts()
            .map(|(account, name)| {
                let wei = self.protocol.bank.balance_of(account);
                BalanceRow {
                    name: name.clone(),
                    address: account.short(),
                    balance: format_amount(wei),
                    wei,
                }
            })
            .collect()
    }

    pub fn holdings(&self) -> Vec<HoldingRow> {
        let mut rows = Vec::new();
        for subject in self.protocol.content.subjects() {
            for (holder, shares) in self.protocol.content.holders(subject) {
                rows.push(HoldingRow {
                    market: "content",
                    subject: format!("{}:{}", self.book.name(&subject.creator), subject.key),
                    holder: self.book.name(&holder),
                    shares,
                });
            }
        }
        for subject in self.protocol.creator.subjects() {
            for (holder, shares) in self.protocol.creator.holders(subject) {
                rows.push(HoldingRow {
                    market: "creator",
                    subject: self.book.name(subject),
                    holder: self.book.name(&holder),
                    shares,
                });
            }
        }
        rows
    }

    pub fn report(&self) -> ReplayReport {
        ReplayReport {
            outcomes: self.outcomes.clone(),
            balances: self.balances(),
            holdings: self.holdings(),
            audit: self.protocol.audit(),
        }
    }
}

fn parse_salt(s: &str) -> Result<[u8; 32], BondlineError> {
    let digits = s.trim().trim_start_matches("0x");
    let raw = hex::decode(digits).map_err(|e| BondlineError::Config(format!("salt {}: {}", s, e)))?;
    raw.try_into()
        .map_err(|_| BondlineError::Config(format!("salt {} is not 32 bytes", s)))
}

/// Run the replay command.
pub async fn run(
    args: &ReplayArgs,
    config: &ProtocolConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = load_scenario(&args.scenario)?;
    tracing::info!("Replaying {} steps from {}", scenario.steps.len(), args.scenario);
    let replay = Replay::play(&scenario, config)?;
    let report = replay.report();

    match format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            println!("{}", format_table(&report.outcomes));
            println!();
            println!("{}", format_table(&report.balances));
            if !report.holdings.is_empty() {
                println!();
                println!("{}", format_table(&report.holdings));
            }
            println!();
            if report.audit.is_clean() {
                println!("Audit: clean ({} wei minted)", report.audit.minted);
            } else {
                for violation in &report.audit.violations {
                    println!("Audit violation: {}", violation);
                }
            }
        }
    }

    if !report.audit.is_clean() {
        return Err("audit found violations".into());
    }
    let rejected = report.outcomes.iter().filter(|o| !o.ok).count();
    if args.strict && rejected > 0 {
        return Err(format!("{} steps were rejected", rejected).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondline_core::ContentSubject;

    const TRADING: &str = include_str!("../../scenarios/trading.toml");
    const GOVERNANCE: &str = include_str!("../../scenarios/governance.toml");

    #[test]
    fn test_trading_scenario_settles_both_buyers() {
        let scenario: Scenario = toml::from_str(TRADING).unwrap();
        let replay = Replay::play(&scenario, &ProtocolConfig::default()).unwrap();
        assert!(replay.outcomes.iter().all(|o| o.ok), "{:?}", replay.outcomes);

        let protocol = &replay.protocol;
        let treasury = AccountId::from_label("addr1");
        let creator = AccountId::from_label("addr2");
        let fan = AccountId::from_label("addr3");
        let ether = 1_000_000_000_000_000_000u128;
        assert_eq!(protocol.bank.balance_of(&treasury), ether + 2 * 15_624_999_999_998);
        assert_eq!(protocol.bank.balance_of(&creator), ether + 18_750_000_000_000);
        assert_eq!(protocol.bank.balance_of(&fan), ether - 49_999_999_999_996);
        assert_eq!(
            protocol.content.shares_supply(&ContentSubject::new(creator, "subject1")),
            0
        );
        assert!(replay.report().audit.is_clean());
    }

    #[test]
    fn test_governance_scenario_runs_on_the_dated_clock() {
        let scenario: Scenario = toml::from_str(GOVERNANCE).unwrap();
        let replay = Replay::play(&scenario, &ProtocolConfig::default()).unwrap();

        // The early execute is rejected, the later ones go through.
        let oks: Vec<bool> = replay.outcomes.iter().map(|o| o.ok).collect();
        assert_eq!(oks, vec![true, true, true, false, true, true, true, true]);
        assert_eq!(replay.protocol.content.config().fees.protocol_bps(), 250);
        assert_eq!(replay.protocol.creator.config().fees.protocol_bps(), 500);
        assert!(!replay.protocol.gateway.is_paused());
        assert!(replay.outcomes[0].time.starts_with("2025-01-01"));
        assert!(replay.outcomes[4].time.starts_with("2025-01-03"));
        assert!(replay.outcomes[7].outcome.contains("shares for"));
    }

    #[test]
    fn test_rejected_steps_do_not_stop_the_replay() {
        let scenario: Scenario = toml::from_str(
            r#"
            [config]
            start_paused = false

            [[steps]]
            op = "sell"
            trader = "alice"
            creator = "bob"
            content = "post"
            qty = 1

            [[steps]]
            op = "fund"
            account = "alice"
            amount = "1 ether"

            [[steps]]
            op = "buy"
            trader = "alice"
            creator = "bob"
            content = "post"
            qty = 2
            "#,
        )
        .unwrap();
        let replay = Replay::play(&scenario, &ProtocolConfig::default()).unwrap();
        assert!(!replay.outcomes[0].ok);
        assert!(replay.outcomes[0].outcome.contains("Insufficient shares"));
        assert!(replay.outcomes[2].ok);
        assert_eq!(replay.outcomes[0].time, "t+0s");

        let alice = replay
            .balances()
            .into_iter()
            .find(|row| row.name == "alice")
            .unwrap();
        assert!(alice.wei < 1_000_000_000_000_000_000);
        assert!(replay
            .holdings()
            .iter()
            .any(|row| row.market == "content" && row.holder == "alice" && row.shares == 2));
    }

    #[test]
    fn test_parse_salt() {
        assert_eq!(parse_salt(&"00".repeat(32)).unwrap(), ZERO_SALT);
        assert_eq!(parse_salt(&format!("0x{}", "07".repeat(32))).unwrap(), [7u8; 32]);
        assert!(parse_salt("0x07").is_err());
    }
}
