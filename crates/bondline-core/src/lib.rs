// crates/bondline-core/src/lib.rs
//
// bondline-core: Core types, errors, and host-environment primitives for the
// Bondline share protocol.
//
// This is the leaf crate every other crate in the workspace depends on. It
// defines account ids and market subjects, the protocol error enum, native
// value units, the value bank that settles trades, the ledger clock, and the
// seam through which the governor reaches governed instances.

pub mod account;
pub mod bank;
pub mod clock;
pub mod error;
pub mod traits;
pub mod units;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use bondline_core::AccountId;`

pub use account::{AccountId, ContentKey, ContentSubject};
pub use bank::{Bank, Settlement, Transfer};
pub use clock::LedgerClock;
pub use error::BondlineError;
pub use traits::{Governable, GovernedCall};
pub use units::{
    format_amount, parse_amount, Wei, BPS_DENOMINATOR, DEFAULT_CURVE_K, SCALE, SHARE_UNIT,
};
