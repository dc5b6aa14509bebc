// crates/bondline-cli/src/commands/curve.rs
//
// `bondline curve {price, amount}`: raw bonding-curve math against the
// configured curve constants and fees.

use clap::{Subcommand, ValueEnum};
use serde::Serialize;

use bondline_core::{format_amount, Wei};
use bondline_curve::{BondingCurve, CubicCurve, FeeSchedule, QuadraticCurve, TradeSide};
use bondline_protocol::ProtocolConfig;

use super::amount_arg;
use crate::output::{emit, FieldRow, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarketKind {
    /// Quadratic market of whole content shares.
    Content,
    /// Cubic market of fixed-point creator equity.
    Creator,
}

/// Curve subcommands.
#[derive(Debug, Subcommand)]
pub enum CurveCmd {
    /// Price `amount` units starting at `supply`, with fees from the config.
    Price {
        #[arg(long, value_enum)]
        market: MarketKind,
        /// Outstanding supply before the trade.
        #[arg(long, value_parser = amount_arg)]
        supply: u128,
        /// Units to price. Creator equity accepts `"<decimal> ether"`.
        #[arg(long, value_parser = amount_arg)]
        amount: u128,
    },
    /// Creator equity bought by `value` wei starting at `supply`.
    Amount {
        #[arg(long, value_parser = amount_arg)]
        supply: u128,
        #[arg(long, value_parser = amount_arg)]
        value: Wei,
    },
}

#[derive(Debug, Serialize)]
struct PriceReport {
    market: &'static str,
    k: u64,
    supply: u128,
    amount: u128,
    raw: Wei,
    buy_total: Wei,
    sell_total: Wei,
}

#[derive(Debug, Serialize)]
struct AmountReport {
    k: u64,
    supply: u128,
    value: Wei,
    amount: u128,
}

/// Run the curve subcommand.
pub async fn run(
    cmd: &CurveCmd,
    config: &ProtocolConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        CurveCmd::Price {
            market,
            supply,
            amount,
        } => price(config, *market, *supply, *amount, format),
        CurveCmd::Amount { supply, value } => equity_amount(config, *supply, *value, format),
    }
}

fn price(
    config: &ProtocolConfig,
    market: MarketKind,
    supply: u128,
    amount: u128,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (name, k, raw) = match market {
        MarketKind::Content => {
            let k = config.content_curve_k;
            let curve = QuadraticCurve::new(u128::from(k))?;
            ("content", k, curve.cost(supply, amount)?)
        }
        MarketKind::Creator => {
            let k = config.creator_curve_k;
            let curve = CubicCurve::new(u128::from(k))?;
            ("creator", k, curve.cost(supply, amount)?)
        }
    };
    let fees = FeeSchedule::new(config.protocol_fee_bps, config.subject_fee_bps)?;
    let report = PriceReport {
        market: name,
        k,
        supply,
        amount,
        raw,
        buy_total: fees.apply(raw, TradeSide::Buy)?.total,
        sell_total: fees.apply(raw, TradeSide::Sell)?.total,
    };

    let rows = vec![
        FieldRow::new("market", report.market),
        FieldRow::new("k", report.k),
        FieldRow::new("supply", report.supply),
        FieldRow::new("amount", report.amount),
        FieldRow::new("raw (wei)", report.raw),
        FieldRow::new("buy total (wei)", report.buy_total),
        FieldRow::new("sell total (wei)", report.sell_total),
        FieldRow::new("buy total", format_amount(report.buy_total)),
    ];
    emit(format, &rows, &report);
    Ok(())
}

fn equity_amount(
    config: &ProtocolConfig,
    supply: u128,
    value: Wei,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let curve = CubicCurve::new(u128::from(config.creator_curve_k))?;
    let report = AmountReport {
        k: config.creator_curve_k,
        supply,
        value,
        amount: curve.amount_for_value(supply, value)?,
    };
    let rows = vec![
        FieldRow::new("k", report.k),
        FieldRow::new("supply", report.supply),
        FieldRow::new("value (wei)", report.value),
        FieldRow::new("equity amount", report.amount),
        FieldRow::new("equity (shares)", format_amount(report.amount)),
    ];
    emit(format, &rows, &report);
    Ok(())
}
