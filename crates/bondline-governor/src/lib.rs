// crates/bondline-governor/src/lib.rs
//
// bondline-governor: Timelock governance for the Bondline protocol.
//
// Parameter changes on the ledgers and the gateway are proposed, delayed by
// `min_delay` seconds of ledger time, then executed, each step gated by its
// own role.

pub mod governor;
pub mod operation;
pub mod roles;

pub use governor::{GovernedTargets, TimelockGovernor};
pub use operation::{
    Action, OperationId, OperationRecord, OperationState, DEFAULT_MIN_DELAY_SECS, ZERO_SALT,
};
pub use roles::{Role, RoleSet};
