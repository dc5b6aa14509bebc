// crates/bondline-governor/src/operation.rs
//
// Timelock operations: ids, actions, and lifecycle states.
//
// Lifecycle: Unscheduled -> Scheduled(readyAt) -> Executed, with
// Scheduled -> Cancelled on cancel. A cancelled id may be proposed again.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use bondline_core::{AccountId, BondlineError, GovernedCall};

/// Salt used by the per-setter entry points.
pub const ZERO_SALT: [u8; 32] = [0u8; 32];

/// Default delay between proposal and execution: 48 hours.
pub const DEFAULT_MIN_DELAY_SECS: u64 = 48 * 60 * 60;

/// SHA-256 of `target || encoded call || salt`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(pub [u8; 32]);

impl OperationId {
    pub fn hash(target: &AccountId, call: &GovernedCall, salt: &[u8; 32]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(target.0);
        hasher.update(call.encode());
        hasher.update(salt);
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn short(&self) -> String {
        let full = hex::encode(self.0);
        format!("0x{}", &full[..12])
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperationId({})", self.short())
    }
}

impl Serialize for OperationId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// What a governed entry point is asked to do with an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Propose = 0,
    Execute = 1,
    Cancel = 2,
}

impl TryFrom<u8> for Action {
    type Error = BondlineError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Action::Propose),
            1 => Ok(Action::Execute),
            2 => Ok(Action::Cancel),
            other => Err(BondlineError::InvalidAction(other)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Propose => write!(f, "propose"),
            Action::Execute => write!(f, "execute"),
            Action::Cancel => write!(f, "cancel"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OperationState {
    #[default]
    Unscheduled,
    Scheduled {
        ready_at: u64,
    },
    Executed,
    Cancelled,
}

impl OperationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, OperationState::Scheduled { .. })
    }

    pub fn is_ready(&self, now: u64) -> bool {
        matches!(self, OperationState::Scheduled { ready_at } if now >= *ready_at)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationState::Unscheduled => write!(f, "unscheduled"),
            OperationState::Scheduled { ready_at } => write!(f, "scheduled (ready at {})", ready_at),
            OperationState::Executed => write!(f, "executed"),
            OperationState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Everything the governor remembers about one operation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationRecord {
    pub id: OperationId,
    pub target: AccountId,
    pub call: GovernedCall,
    pub salt: [u8; 32],
    pub state: OperationState,
}
