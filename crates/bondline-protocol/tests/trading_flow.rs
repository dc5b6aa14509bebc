// crates/bondline-protocol/tests/trading_flow.rs
//
// End-to-end trading through a deployed protocol: gateway buys and sells,
// both ledgers, fee routing, and conservation of value.

use bondline_core::{AccountId, BondlineError, ContentKey, ContentSubject, SHARE_UNIT};
use bondline_gateway::EquityRecipient;
use bondline_protocol::{Protocol, ProtocolConfig};

const ETHER: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn treasury() -> AccountId {
    AccountId::from_label("addr1")
}

fn creator() -> AccountId {
    AccountId::from_label("addr2")
}

fn fan() -> AccountId {
    AccountId::from_label("addr3")
}

fn key() -> ContentKey {
    ContentKey::new("subject1")
}

fn subject() -> ContentSubject {
    ContentSubject::new(creator(), "subject1")
}

/// 5% + 5% fees on both ledgers, trading open, everyone funded with 1 ether.
fn deploy(conversion_bps: u32, recipient: EquityRecipient) -> Protocol {
    let config = ProtocolConfig {
        owner: AccountId::from_label("owner"),
        fee_destination: Some(treasury()),
        protocol_fee_bps: 500,
        subject_fee_bps: 500,
        equity_conversion_bps: conversion_bps,
        equity_recipient: recipient,
        last_share_protected: false,
        start_paused: false,
        ..ProtocolConfig::default()
    };
    let mut protocol = Protocol::deploy(&config).unwrap();
    for account in [treasury(), creator(), fan()] {
        protocol.fund(account, ETHER).unwrap();
    }
    protocol
}

// ===========================================================================
// Full conversion, equity held by buyers
// ===========================================================================

#[test]
fn test_full_conversion_buy_sell_cycle() {
    let mut protocol = deploy(10_000, EquityRecipient::Buyer);

    let first = protocol.quote_buy(creator(), creator(), &key(), 1).unwrap();
    assert_eq!(first.grand_total, 68_749_999_999_997);
    protocol.buy(creator(), creator(), &key(), 1, first.grand_total).unwrap();
    protocol.buy(fan(), creator(), &key(), 1, 274_999_999_999_997).unwrap();

    assert_eq!(protocol.content.shares_balance(&subject(), &creator()), 1);
    assert_eq!(protocol.content.shares_balance(&subject(), &fan()), 1);
    assert_eq!(protocol.content.shares_supply(&subject()), 2);
    assert_eq!(
        protocol.creator.shares_balance(&creator(), &creator()),
        1_442_249_570_307_408_382
    );
    assert_eq!(
        protocol.creator.shares_balance(&creator(), &fan()),
        1_023_962_504_023_061_719
    );
    assert_eq!(protocol.creator.shares_supply(&creator()), 2_466_212_074_330_470_101);

    let content_ledger = protocol.content.address();
    let creator_ledger = protocol.creator.address();
    assert_eq!(
        protocol.bank.balance_of(&content_ledger),
        ETHER / 32_000 + 4 * ETHER / 32_000
    );
    assert_eq!(protocol.bank.balance_of(&creator_ledger), 156_249_999_999_998);
    assert_eq!(protocol.bank.balance_of(&treasury()), ETHER + 15_624_999_999_998);
    assert_eq!(
        protocol.bank.balance_of(&creator()),
        ETHER - first.grand_total + 15_624_999_999_998
    );

    protocol.sell(fan(), creator(), &key(), 1).unwrap();
    protocol.sell(creator(), creator(), &key(), 1).unwrap();

    assert_eq!(protocol.content.shares_supply(&subject()), 0);
    assert_eq!(protocol.creator.shares_supply(&creator()), 0);
    assert_eq!(protocol.bank.balance_of(&content_ledger), 0);
    assert_eq!(protocol.bank.balance_of(&creator_ledger), 0);
    assert_eq!(protocol.bank.balance_of(&treasury()), ETHER + 2 * 15_624_999_999_998);
    assert_eq!(protocol.bank.balance_of(&creator()), ETHER + 18_750_000_000_000);
    assert_eq!(protocol.bank.balance_of(&fan()), ETHER - 49_999_999_999_996);
    assert!(protocol.audit().is_clean());
}

#[test]
fn test_full_conversion_sell_details() {
    let mut protocol = deploy(10_000, EquityRecipient::Buyer);
    let first = protocol.quote_buy(creator(), creator(), &key(), 1).unwrap();
    protocol.buy(creator(), creator(), &key(), 1, first.grand_total).unwrap();

    let details = protocol.quote_sell(creator(), creator(), &key(), 1).unwrap();
    let content_raw = ETHER / 32_000;
    let equity_raw = 31_249_999_999_999;
    assert_eq!(
        details.as_tuple(),
        (
            content_raw,
            content_raw - content_raw / 10,
            1_442_249_570_307_408_382,
            equity_raw,
            equity_raw - 2 * (equity_raw * 500 / 10_000),
            content_raw - content_raw / 10 + equity_raw - 2 * (equity_raw * 500 / 10_000),
        )
    );
}

// ===========================================================================
// Default conversion, equity held by the fee destination
// ===========================================================================

#[test]
fn test_default_mode_mints_to_fee_destination() {
    let mut protocol = deploy(1_000, EquityRecipient::FeeDestination);
    let quote = protocol.quote_buy(fan(), creator(), &key(), 1).unwrap();
    assert_eq!(quote.creator_equity_amount, 669_432_950_082_169_521);
    assert_eq!(quote.creator_fee_before, 3_124_999_999_999);

    let receipt = protocol.buy(fan(), creator(), &key(), 1, quote.grand_total).unwrap();
    assert_eq!(receipt.details, quote);
    assert_eq!(receipt.equity_holder, treasury());
    assert_eq!(
        protocol.creator.shares_balance(&creator(), &treasury()),
        669_432_950_082_169_521
    );
    assert_eq!(protocol.creator.shares_balance(&creator(), &fan()), 0);
    assert!(protocol.audit().is_clean());
}

#[test]
fn test_default_mode_burns_proportionally() {
    let mut protocol = deploy(1_000, EquityRecipient::FeeDestination);
    let quote = protocol.quote_buy(fan(), creator(), &key(), 10).unwrap();
    protocol.buy(fan(), creator(), &key(), 10, quote.grand_total).unwrap();
    let holding = protocol.creator.shares_balance(&creator(), &treasury());

    protocol.sell(fan(), creator(), &key(), 1).unwrap();
    assert_eq!(
        protocol.creator.shares_balance(&creator(), &treasury()),
        holding - holding / 10
    );

    protocol.sell(fan(), creator(), &key(), 9).unwrap();
    assert_eq!(protocol.creator.shares_balance(&creator(), &treasury()), 0);
    assert_eq!(protocol.creator.shares_supply(&creator()), 0);
    assert!(protocol.audit().is_clean());
}

#[test]
fn test_fan_exits_when_creator_collects_protected_equity() {
    let config = ProtocolConfig {
        owner: AccountId::from_label("owner"),
        fee_destination: Some(creator()),
        protocol_fee_bps: 500,
        subject_fee_bps: 500,
        equity_conversion_bps: 1_000,
        equity_recipient: EquityRecipient::FeeDestination,
        last_share_protected: true,
        start_paused: false,
        ..ProtocolConfig::default()
    };
    let mut protocol = Protocol::deploy(&config).unwrap();
    for account in [creator(), fan()] {
        protocol.fund(account, ETHER).unwrap();
    }

    let quote = protocol.quote_buy(fan(), creator(), &key(), 2).unwrap();
    protocol.buy(fan(), creator(), &key(), 2, quote.grand_total).unwrap();
    let equity = protocol.creator.shares_balance(&creator(), &creator());
    assert_eq!(equity, protocol.creator.shares_supply(&creator()));
    assert!(equity > 0);

    // Burning the creator's whole equity position is not the creator selling.
    protocol.sell(fan(), creator(), &key(), 2).unwrap();
    assert_eq!(protocol.content.shares_balance(&subject(), &fan()), 0);
    assert_eq!(protocol.creator.shares_supply(&creator()), 0);
    assert_eq!(protocol.bank.balance_of(&protocol.creator.address()), 0);
    assert!(protocol.audit().is_clean());

    // The creator's own last content share stays protected.
    let quote = protocol.quote_buy(creator(), creator(), &key(), 1).unwrap();
    protocol.buy(creator(), creator(), &key(), 1, quote.grand_total).unwrap();
    assert_eq!(
        protocol.sell(creator(), creator(), &key(), 1).unwrap_err(),
        BondlineError::AuthorCannotSellLast
    );
}

#[test]
fn test_round_trip_costs_only_fees() {
    let mut protocol = deploy(1_000, EquityRecipient::Buyer);
    let start = protocol.bank.balance_of(&fan());

    let bought = protocol.quote_buy(fan(), creator(), &key(), 3).unwrap();
    let receipt = protocol.buy(fan(), creator(), &key(), 3, bought.grand_total).unwrap();
    let sold = protocol.sell(fan(), creator(), &key(), 3).unwrap();

    assert_eq!(protocol.content.shares_balance(&subject(), &fan()), 0);
    assert_eq!(protocol.content.shares_supply(&subject()), 0);
    assert_eq!(protocol.creator.shares_balance(&creator(), &fan()), 0);

    // Same curve interval both ways: only the four fee charges are lost.
    assert_eq!(sold.details.content_before_fee, receipt.details.content_before_fee);
    assert_eq!(sold.details.creator_fee_before, receipt.details.creator_fee_before);
    let fees = (bought.grand_total - bought.content_before_fee - bought.creator_fee_before)
        + (sold.details.content_before_fee + sold.details.creator_fee_before
            - sold.details.grand_total);
    assert_eq!(protocol.bank.balance_of(&fan()), start - fees);
    assert!(protocol.audit().is_clean());
}

// ===========================================================================
// Failures leave nothing behind
// ===========================================================================

#[test]
fn test_rejections_are_atomic() {
    let mut protocol = deploy(1_000, EquityRecipient::FeeDestination);
    let before = protocol.bank.clone();

    assert!(matches!(
        protocol.buy(fan(), creator(), &key(), 1, 1),
        Err(BondlineError::NotEnoughFunds { .. })
    ));
    assert_eq!(
        protocol.sell(fan(), creator(), &key(), 1).unwrap_err(),
        BondlineError::InsufficientShares {
            requested: 1,
            held: 0
        }
    );

    assert!(matches!(
        protocol.quote_sell(fan(), creator(), &key(), 0),
        Err(BondlineError::InvalidCurveInput(_))
    ));
    assert!(matches!(
        protocol.sell(fan(), creator(), &key(), 0),
        Err(BondlineError::InvalidCurveInput(_))
    ));

    // Quote fits but the buyer cannot cover it.
    let pauper = AccountId::from_label("pauper");
    let quote = protocol.quote_buy(pauper, creator(), &key(), 1).unwrap();
    assert!(matches!(
        protocol.buy(pauper, creator(), &key(), 1, quote.grand_total),
        Err(BondlineError::InsufficientBalance { .. })
    ));

    assert_eq!(protocol.bank.total_value(), before.total_value());
    assert_eq!(protocol.bank.balance_of(&fan()), before.balance_of(&fan()));
    assert_eq!(protocol.content.shares_supply(&subject()), 0);
    assert_eq!(protocol.creator.shares_supply(&creator()), 0);
    assert!(protocol.audit().is_clean());
}

#[test]
fn test_paused_protocol() {
    let mut protocol = deploy(1_000, EquityRecipient::FeeDestination);
    let owner = protocol.gateway.owner();
    protocol.set_paused(owner, true).unwrap();
    assert_eq!(
        protocol.buy(fan(), creator(), &key(), 1, ETHER).unwrap_err(),
        BondlineError::TradingPaused
    );
    protocol.set_paused(owner, false).unwrap();
    protocol.buy(fan(), creator(), &key(), 1, ETHER / 10).unwrap();
}

#[test]
fn test_creator_equity_is_fixed_point() {
    let protocol = deploy(1_000, EquityRecipient::FeeDestination);
    assert_eq!(
        protocol.creator.get_price(0, SHARE_UNIT).unwrap(),
        10_416_666_666_666
    );
    assert_eq!(
        protocol.creator.get_price(SHARE_UNIT, SHARE_UNIT).unwrap(),
        72_916_666_666_666
    );
}
