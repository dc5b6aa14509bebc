// crates/bondline-cli/src/commands/quote.rs
//
// `bondline quote {buy, sell}`: gateway price details for a content trade,
// against a fresh deployment or the state left by a replayed scenario.

use clap::{Args, Subcommand};

use bondline_core::{format_amount, AccountId, ContentKey};
use bondline_gateway::PriceDetails;
use bondline_protocol::{Protocol, ProtocolConfig};

use super::replay::{load_scenario, Replay};
use super::{account_arg, amount_arg};
use crate::output::{emit, FieldRow, OutputFormat};

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Creator that owns the content.
    #[arg(long, value_parser = account_arg)]
    pub creator: AccountId,
    /// Content key within the creator's namespace.
    #[arg(long)]
    pub content: String,
    /// Number of content shares.
    #[arg(long, value_parser = amount_arg)]
    pub qty: u128,
    /// Replay this scenario first and quote against the resulting state.
    #[arg(long)]
    pub scenario: Option<String>,
}

/// Quote subcommands.
#[derive(Debug, Subcommand)]
pub enum QuoteCmd {
    /// Price a buy through the gateway.
    Buy {
        #[command(flatten)]
        args: QuoteArgs,
        /// Buyer account. Defaults to the creator.
        #[arg(long, value_parser = account_arg)]
        buyer: Option<AccountId>,
    },
    /// Price a sell through the gateway.
    Sell {
        #[command(flatten)]
        args: QuoteArgs,
        /// Seller account. Defaults to the creator.
        #[arg(long, value_parser = account_arg)]
        seller: Option<AccountId>,
    },
}

/// Run the quote subcommand.
pub async fn run(
    cmd: &QuoteCmd,
    config: &ProtocolConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (args, side) = match cmd {
        QuoteCmd::Buy { args, .. } => (args, "buy"),
        QuoteCmd::Sell { args, .. } => (args, "sell"),
    };
    let protocol = prepare(args, config)?;
    let key = ContentKey::new(args.content.as_str());

    let details = match cmd {
        QuoteCmd::Buy { buyer, .. } => {
            let buyer = buyer.unwrap_or(args.creator);
            protocol.quote_buy(buyer, args.creator, &key, args.qty)?
        }
        QuoteCmd::Sell { seller, .. } => {
            let seller = seller.unwrap_or(args.creator);
            protocol.quote_sell(seller, args.creator, &key, args.qty)?
        }
    };

    emit(format, &detail_rows(side, &details), &details);
    Ok(())
}

fn prepare(args: &QuoteArgs, config: &ProtocolConfig) -> Result<Protocol, Box<dyn std::error::Error>> {
    match &args.scenario {
        Some(path) => {
            let scenario = load_scenario(path)?;
            Ok(Replay::play(&scenario, config)?.protocol)
        }
        None => Ok(Protocol::deploy(config)?),
    }
}

fn detail_rows(side: &str, details: &PriceDetails) -> Vec<FieldRow> {
    vec![
        FieldRow::new("side", side),
        FieldRow::new("content before fee", details.content_before_fee),
        FieldRow::new("content after fee", details.content_after_fee),
        FieldRow::new("creator equity amount", details.creator_equity_amount),
        FieldRow::new("creator fee before", details.creator_fee_before),
        FieldRow::new("creator fee after", details.creator_fee_after),
        FieldRow::new("grand total", details.grand_total),
        FieldRow::new("grand total (whole units)", format_amount(details.grand_total)),
    ]
}
