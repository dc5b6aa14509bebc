use thiserror::Error;

use crate::account::AccountId;

/// Protocol-wide error types for the Bondline share protocol.
///
/// Every variant is terminal for the call that produced it: the operation
/// aborts and leaves ledger, bank, and governor state exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BondlineError {
    /// Curve input out of domain (zero quantity, overflow, zero curve constant).
    #[error("Invalid curve input: {0}")]
    InvalidCurveInput(String),

    /// A direct ledger buy was paid less than the after-fee price.
    #[error("Insufficient payment: required {required} wei, paid {paid} wei")]
    InsufficientPayment { required: u128, paid: u128 },

    /// A gateway buy was paid less than the grand total of both legs.
    #[error("Not enough funds: required {required} wei, paid {paid} wei")]
    NotEnoughFunds { required: u128, paid: u128 },

    /// The seller holds fewer shares than requested.
    #[error("Insufficient shares: requested {requested}, held {held}")]
    InsufficientShares { requested: u128, held: u128 },

    /// The sale would exceed the outstanding supply of the subject.
    #[error("Cannot sell exceeding shares supply: requested {requested}, supply {supply}")]
    SupplyExceeded { requested: u128, supply: u128 },

    /// The subject owner tried to sell the final outstanding share.
    #[error("Author cannot sell the last share")]
    AuthorCannotSellLast,

    /// Caller lacks the capability required by the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Gateway trading is paused.
    #[error("Trading is paused")]
    TradingPaused,

    /// Timelock operation is not scheduled or its delay has not elapsed.
    #[error("Operation is not ready: {0}")]
    OperationNotReady(String),

    /// Timelock operation id is already scheduled or executed.
    #[error("Operation already scheduled: {0}")]
    OperationAlreadyScheduled(String),

    /// Timelock operation cannot be cancelled because it is not pending.
    #[error("Operation cannot be cancelled: {0}")]
    OperationNotPending(String),

    /// Unknown timelock action code.
    #[error("Invalid action code: {0}")]
    InvalidAction(u8),

    /// Fee basis points out of 0..=10000 or combined above 10000.
    #[error("Fee percent out of range: protocol {protocol_bps} bps + subject {subject_bps} bps")]
    FeePercentOutOfRange { protocol_bps: u32, subject_bps: u32 },

    /// Governed call names a target address nobody answers to.
    #[error("Unknown target: {0}")]
    UnknownTarget(AccountId),

    /// The target does not expose the requested setter.
    #[error("Unsupported setter for {target}: {setter}")]
    UnsupportedSetter { target: AccountId, setter: String },

    /// Gateway was handed a ledger other than the one it was built for.
    #[error("Ledger mismatch: expected {expected}, found {found}")]
    LedgerMismatch { expected: AccountId, found: AccountId },

    /// A prepared trade no longer matches the ledger it was prepared against.
    #[error("Stale trade: prepared at ledger version {prepared}, ledger is at {current}")]
    StaleTrade { prepared: u64, current: u64 },

    /// Native value balance too low to cover a settlement transfer.
    #[error("Insufficient balance for {account}: required {required} wei, available {available} wei")]
    InsufficientBalance {
        account: AccountId,
        required: u128,
        available: u128,
    },

    /// Malformed account identifier.
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    /// Malformed native amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BondlineError {
    fn from(e: serde_json::Error) -> Self {
        BondlineError::Serialization(e.to_string())
    }
}
