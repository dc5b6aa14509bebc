// crates/bondline-core/src/traits.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::AccountId;
use crate::error::BondlineError;

/// A configuration mutation that can be routed through the timelock.
///
/// The same call shape is used by owners invoking a setter directly and by
/// the governor executing a scheduled operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "setter", content = "value", rename_all = "snake_case")]
pub enum GovernedCall {
    SetProtocolFeePercent(u16),
    SetSubjectFeePercent(u16),
    SetFeeDestination(AccountId),
    SetAuthorizedCaller(AccountId),
    SetLastShareProtected(bool),
    SetPaused(bool),
    TransferOwnership(AccountId),
}

impl GovernedCall {
    /// Setter name as exposed on the targets.
    pub fn name(&self) -> &'static str {
        match self {
            GovernedCall::SetProtocolFeePercent(_) => "set_protocol_fee_percent",
            GovernedCall::SetSubjectFeePercent(_) => "set_subject_fee_percent",
            GovernedCall::SetFeeDestination(_) => "set_fee_destination",
            GovernedCall::SetAuthorizedCaller(_) => "set_authorized_caller",
            GovernedCall::SetLastShareProtected(_) => "set_last_share_protected",
            GovernedCall::SetPaused(_) => "set_paused",
            GovernedCall::TransferOwnership(_) => "transfer_ownership",
        }
    }

    /// Canonical payload bytes: one selector byte followed by the value.
    ///
    /// Used as the payload component of timelock operation ids, so two calls
    /// encode identically iff they are the same setter with the same value.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(21);
        match self {
            GovernedCall::SetProtocolFeePercent(bps) => {
                out.push(0x01);
                out.extend_from_slice(&bps.to_be_bytes());
            }
            GovernedCall::SetSubjectFeePercent(bps) => {
                out.push(0x02);
                out.extend_from_slice(&bps.to_be_bytes());
            }
            GovernedCall::SetFeeDestination(account) => {
                out.push(0x03);
                out.extend_from_slice(&account.0);
            }
            GovernedCall::SetAuthorizedCaller(account) => {
                out.push(0x04);
                out.extend_from_slice(&account.0);
            }
            GovernedCall::SetLastShareProtected(flag) => {
                out.push(0x05);
                out.push(u8::from(*flag));
            }
            GovernedCall::SetPaused(flag) => {
                out.push(0x06);
                out.push(u8::from(*flag));
            }
            GovernedCall::TransferOwnership(account) => {
                out.push(0x07);
                out.extend_from_slice(&account.0);
            }
        }
        out
    }
}

impl fmt::Display for GovernedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GovernedCall::SetProtocolFeePercent(v) | GovernedCall::SetSubjectFeePercent(v) => {
                write!(f, "{}({} bps)", self.name(), v)
            }
            GovernedCall::SetFeeDestination(a)
            | GovernedCall::SetAuthorizedCaller(a)
            | GovernedCall::TransferOwnership(a) => write!(f, "{}({})", self.name(), a),
            GovernedCall::SetLastShareProtected(v) | GovernedCall::SetPaused(v) => {
                write!(f, "{}({})", self.name(), v)
            }
        }
    }
}

/// An owned instance whose configuration setters can be invoked by address.
///
/// Implemented by the share ledgers and the trading gateway; the governor
/// drives them through this seam once ownership has been handed over.
pub trait Governable {
    /// Address the instance answers to.
    fn address(&self) -> AccountId;

    /// Invoke the setter named by `call` on behalf of `caller`.
    ///
    /// The usual owner check applies; targets return
    /// `BondlineError::UnsupportedSetter` for calls they do not expose.
    fn apply_governed(&mut self, caller: AccountId, call: &GovernedCall) -> Result<(), BondlineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_distinguishes_setters_and_values() {
        let a = GovernedCall::SetProtocolFeePercent(500).encode();
        let b = GovernedCall::SetSubjectFeePercent(500).encode();
        let c = GovernedCall::SetProtocolFeePercent(501).encode();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, GovernedCall::SetProtocolFeePercent(500).encode());
    }

    #[test]
    fn test_serde_tagged_form() {
        let call: GovernedCall =
            serde_json::from_str(r#"{"setter":"set_paused","value":false}"#).unwrap();
        assert_eq!(call, GovernedCall::SetPaused(false));

        let call: GovernedCall =
            serde_json::from_str(r#"{"setter":"set_fee_destination","value":"treasury"}"#).unwrap();
        assert_eq!(
            call,
            GovernedCall::SetFeeDestination(AccountId::from_label("treasury"))
        );
    }
}
