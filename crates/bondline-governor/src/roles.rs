// crates/bondline-governor/src/roles.rs

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use bondline_core::AccountId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Proposer,
    Executor,
    Canceller,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Proposer => write!(f, "proposer"),
            Role::Executor => write!(f, "executor"),
            Role::Canceller => write!(f, "canceller"),
        }
    }
}

/// Account sets for each timelock role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
    pub proposers: BTreeSet<AccountId>,
    pub executors: BTreeSet<AccountId>,
    pub cancellers: BTreeSet<AccountId>,
}

impl RoleSet {
    pub fn new(
        proposers: impl IntoIterator<Item = AccountId>,
        executors: impl IntoIterator<Item = AccountId>,
        cancellers: impl IntoIterator<Item = AccountId>,
    ) -> Self {
        Self {
            proposers: proposers.into_iter().collect(),
            executors: executors.into_iter().collect(),
            cancellers: cancellers.into_iter().collect(),
        }
    }

    pub fn members(&self, role: Role) -> &BTreeSet<AccountId> {
        match role {
            Role::Proposer => &self.proposers,
            Role::Executor => &self.executors,
            Role::Canceller => &self.cancellers,
        }
    }

    pub(crate) fn members_mut(&mut self, role: Role) -> &mut BTreeSet<AccountId> {
        match role {
            Role::Proposer => &mut self.proposers,
            Role::Executor => &mut self.executors,
            Role::Canceller => &mut self.cancellers,
        }
    }

    pub fn has_role(&self, role: Role, account: &AccountId) -> bool {
        self.members(role).contains(account)
    }
}
