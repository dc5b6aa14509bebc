// crates/bondline-governor/src/governor.rs
//
// Timelock governor.
//
// Once the ledgers and the gateway hand ownership to the governor, every
// configuration change goes through three steps: a proposer schedules the
// call, `min_delay` seconds of ledger time pass, and an executor applies it.
// A canceller can drop a scheduled call before it runs. The governor applies
// calls as its own account, so targets see it as their owner.

use std::collections::HashMap;

use bondline_core::{AccountId, BondlineError, Governable, GovernedCall};

use crate::operation::{Action, OperationId, OperationRecord, OperationState, ZERO_SALT};
use crate::roles::{Role, RoleSet};

/// Resolves target addresses to governed instances at execution time.
pub trait GovernedTargets {
    fn resolve(&mut self, target: AccountId) -> Option<&mut dyn Governable>;
}

#[derive(Debug, Clone)]
pub struct TimelockGovernor {
    address: AccountId,
    min_delay: u64,
    admin: AccountId,
    roles: RoleSet,
    operations: HashMap<OperationId, OperationRecord>,
}

impl TimelockGovernor {
    pub fn new(address: AccountId, min_delay: u64, roles: RoleSet, admin: AccountId) -> Self {
        tracing::info!(
            "Timelock governor {} created: min delay {}s, {} proposers, {} executors, {} cancellers",
            address.short(),
            min_delay,
            roles.proposers.len(),
            roles.executors.len(),
            roles.cancellers.len()
        );
        Self {
            address,
            min_delay,
            admin,
            roles,
            operations: HashMap::new(),
        }
    }

    pub fn address(&self) -> AccountId {
        self.address
    }

    pub fn min_delay(&self) -> u64 {
        self.min_delay
    }

    pub fn admin(&self) -> AccountId {
        self.admin
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn has_role(&self, role: Role, account: &AccountId) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn hash_operation(target: &AccountId, call: &GovernedCall, salt: &[u8; 32]) -> OperationId {
        OperationId::hash(target, call, salt)
    }

    pub fn operation_state(&self, id: &OperationId) -> OperationState {
        self.operations
            .get(id)
            .map(|record| record.state)
            .unwrap_or_default()
    }

    pub fn is_operation_ready(&self, id: &OperationId, now: u64) -> bool {
        self.operation_state(id).is_ready(now)
    }

    pub fn operation(&self, id: &OperationId) -> Option<&OperationRecord> {
        self.operations.get(id)
    }

    /// Every known operation, ordered by id.
    pub fn operations(&self) -> Vec<&OperationRecord> {
        let mut records: Vec<&OperationRecord> = self.operations.values().collect();
        records.sort_by_key(|record| record.id);
        records
    }

    // ---------------------------------------------------------------
    // Role administration
    // ---------------------------------------------------------------

    pub fn grant_role(&mut self, caller: AccountId, role: Role, account: AccountId) -> Result<(), BondlineError> {
        self.ensure_admin(&caller)?;
        if self.roles.members_mut(role).insert(account) {
            tracing::info!("Granted {} role to {}", role, account);
        }
        Ok(())
    }

    pub fn revoke_role(&mut self, caller: AccountId, role: Role, account: AccountId) -> Result<(), BondlineError> {
        self.ensure_admin(&caller)?;
        if self.roles.members_mut(role).remove(&account) {
            tracing::info!("Revoked {} role from {}", role, account);
        }
        Ok(())
    }

    fn ensure_admin(&self, caller: &AccountId) -> Result<(), BondlineError> {
        if *caller != self.admin {
            return Err(BondlineError::Unauthorized(format!(
                "{} is not the timelock admin",
                caller
            )));
        }
        Ok(())
    }

    fn ensure_role(&self, role: Role, caller: &AccountId) -> Result<(), BondlineError> {
        if !self.roles.has_role(role, caller) {
            tracing::warn!("Rejected timelock action from {}: missing {} role", caller, role);
            return Err(BondlineError::Unauthorized(format!(
                "{} lacks the {} role",
                caller, role
            )));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------

    /// Propose, execute, or cancel `call` on `target`.
    ///
    /// Returns the operation's state after the action.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        targets: &mut dyn GovernedTargets,
        caller: AccountId,
        now: u64,
        target: AccountId,
        call: GovernedCall,
        action: Action,
        salt: [u8; 32],
    ) -> Result<OperationState, BondlineError> {
        let id = OperationId::hash(&target, &call, &salt);
        match action {
            Action::Propose => self.propose(caller, now, id, target, call, salt),
            Action::Execute => self.execute(targets, caller, now, id),
            Action::Cancel => self.cancel(caller, id),
        }
    }

    fn propose(
        &mut self,
        caller: AccountId,
        now: u64,
        id: OperationId,
        target: AccountId,
        call: GovernedCall,
        salt: [u8; 32],
    ) -> Result<OperationState, BondlineError> {
        self.ensure_role(Role::Proposer, &caller)?;
        let current = self.operation_state(&id);
        if matches!(current, OperationState::Scheduled { .. } | OperationState::Executed) {
            tracing::warn!("Rejected proposal of {}: already {}", id.short(), current);
            return Err(BondlineError::OperationAlreadyScheduled(id.to_hex()));
        }

        let state = OperationState::Scheduled {
            ready_at: now.saturating_add(self.min_delay),
        };
        tracing::info!("Scheduled {} on {} as {}, {}", call, target, id.short(), state);
        self.operations.insert(
            id,
            OperationRecord {
                id,
                target,
                call,
                salt,
                state,
            },
        );
        Ok(state)
    }

    fn execute(
        &mut self,
        targets: &mut dyn GovernedTargets,
        caller: AccountId,
        now: u64,
        id: OperationId,
    ) -> Result<OperationState, BondlineError> {
        self.ensure_role(Role::Executor, &caller)?;
        let record = match self.operations.get(&id) {
            Some(record) if record.state.is_ready(now) => record.clone(),
            other => {
                let state = other.map(|r| r.state).unwrap_or_default();
                tracing::warn!("Rejected execution of {} at {}: {}", id.short(), now, state);
                return Err(BondlineError::OperationNotReady(format!("{} is {}", id, state)));
            }
        };

        let instance = targets
            .resolve(record.target)
            .ok_or(BondlineError::UnknownTarget(record.target))?;
        if let Err(e) = instance.apply_governed(self.address, &record.call) {
            tracing::warn!("Execution of {} failed, operation stays scheduled: {}", id.short(), e);
            return Err(e);
        }

        let state = OperationState::Executed;
        if let Some(entry) = self.operations.get_mut(&id) {
            entry.state = state;
        }
        tracing::info!("Executed {} on {} ({})", record.call, record.target, id.short());
        Ok(state)
    }

    fn cancel(&mut self, caller: AccountId, id: OperationId) -> Result<OperationState, BondlineError> {
        self.ensure_role(Role::Canceller, &caller)?;
        let entry = match self.operations.get_mut(&id) {
            Some(entry) if entry.state.is_pending() => entry,
            other => {
                let state = other.map(|r| r.state).unwrap_or_default();
                tracing::warn!("Rejected cancellation of {}: {}", id.short(), state);
                return Err(BondlineError::OperationNotPending(format!("{} is {}", id, state)));
            }
        };
        entry.state = OperationState::Cancelled;
        tracing::info!("Cancelled {} ({})", entry.call, id.short());
        Ok(OperationState::Cancelled)
    }

    // ---------------------------------------------------------------
    // Per-setter entry points (zero salt)
    // ---------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn set_protocol_fee_percent(
        &mut self,
        targets: &mut dyn GovernedTargets,
        caller: AccountId,
        now: u64,
        target: AccountId,
        bps: u16,
        action: Action,
    ) -> Result<OperationState, BondlineError> {
        let call = GovernedCall::SetProtocolFeePercent(bps);
        self.submit(targets, caller, now, target, call, action, ZERO_SALT)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_subject_fee_percent(
        &mut self,
        targets: &mut dyn GovernedTargets,
        caller: AccountId,
        now: u64,
        target: AccountId,
        bps: u16,
        action: Action,
    ) -> Result<OperationState, BondlineError> {
        let call = GovernedCall::SetSubjectFeePercent(bps);
        self.submit(targets, caller, now, target, call, action, ZERO_SALT)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_fee_destination(
        &mut self,
        targets: &mut dyn GovernedTargets,
        caller: AccountId,
        now: u64,
        target: AccountId,
        destination: AccountId,
        action: Action,
    ) -> Result<OperationState, BondlineError> {
        let call = GovernedCall::SetFeeDestination(destination);
        self.submit(targets, caller, now, target, call, action, ZERO_SALT)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_authorized_caller(
        &mut self,
        targets: &mut dyn GovernedTargets,
        caller: AccountId,
        now: u64,
        target: AccountId,
        authorized: AccountId,
        action: Action,
    ) -> Result<OperationState, BondlineError> {
        let call = GovernedCall::SetAuthorizedCaller(authorized);
        self.submit(targets, caller, now, target, call, action, ZERO_SALT)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_last_share_protected(
        &mut self,
        targets: &mut dyn GovernedTargets,
        caller: AccountId,
        now: u64,
        target: AccountId,
        protected: bool,
        action: Action,
    ) -> Result<OperationState, BondlineError> {
        let call = GovernedCall::SetLastShareProtected(protected);
        self.submit(targets, caller, now, target, call, action, ZERO_SALT)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_paused(
        &mut self,
        targets: &mut dyn GovernedTargets,
        caller: AccountId,
        now: u64,
        target: AccountId,
        paused: bool,
        action: Action,
    ) -> Result<OperationState, BondlineError> {
        let call = GovernedCall::SetPaused(paused);
        self.submit(targets, caller, now, target, call, action, ZERO_SALT)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn transfer_ownership(
        &mut self,
        targets: &mut dyn GovernedTargets,
        caller: AccountId,
        now: u64,
        target: AccountId,
        new_owner: AccountId,
        action: Action,
    ) -> Result<OperationState, BondlineError> {
        let call = GovernedCall::TransferOwnership(new_owner);
        self.submit(targets, caller, now, target, call, action, ZERO_SALT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::DEFAULT_MIN_DELAY_SECS;

    /// Minimal owned target recording the last fee it was given.
    struct FeeTarget {
        address: AccountId,
        owner: AccountId,
        protocol_bps: u16,
    }

    impl Governable for FeeTarget {
        fn address(&self) -> AccountId {
            self.address
        }

        fn apply_governed(&mut self, caller: AccountId, call: &GovernedCall) -> Result<(), BondlineError> {
            if caller != self.owner {
                return Err(BondlineError::Unauthorized("not owner".to_string()));
            }
            match call {
                GovernedCall::SetProtocolFeePercent(bps) if *bps <= 10_000 => {
                    self.protocol_bps = *bps;
                    Ok(())
                }
                GovernedCall::SetProtocolFeePercent(bps) => Err(BondlineError::FeePercentOutOfRange {
                    protocol_bps: u32::from(*bps),
                    subject_bps: 0,
                }),
                _ => Err(BondlineError::UnsupportedSetter {
                    target: self.address,
                    setter: call.name().to_string(),
                }),
            }
        }
    }

    impl GovernedTargets for FeeTarget {
        fn resolve(&mut self, target: AccountId) -> Option<&mut dyn Governable> {
            if target == self.address {
                Some(self)
            } else {
                None
            }
        }
    }

    fn proposer() -> AccountId {
        AccountId::from_label("proposer")
    }
    fn executor() -> AccountId {
        AccountId::from_label("executor")
    }
    fn canceller() -> AccountId {
        AccountId::from_label("canceller")
    }
    fn admin() -> AccountId {
        AccountId::from_label("admin")
    }

    fn setup() -> (TimelockGovernor, FeeTarget) {
        let governor = TimelockGovernor::new(
            AccountId::from_label("timelock"),
            DEFAULT_MIN_DELAY_SECS,
            RoleSet::new([proposer()], [executor()], [canceller()]),
            admin(),
        );
        let target = FeeTarget {
            address: AccountId::from_label("content-ledger"),
            owner: governor.address(),
            protocol_bps: 0,
        };
        (governor, target)
    }

    #[test]
    fn test_execute_only_after_delay() {
        let (mut gov, mut target) = setup();
        let address = target.address;
        let state = gov
            .set_protocol_fee_percent(&mut target, proposer(), 1_000, address, 500, Action::Propose)
            .unwrap();
        assert_eq!(state, OperationState::Scheduled { ready_at: 1_000 + DEFAULT_MIN_DELAY_SECS });

        let err = gov
            .set_protocol_fee_percent(&mut target, executor(), 1_000, address, 500, Action::Execute)
            .unwrap_err();
        assert!(matches!(err, BondlineError::OperationNotReady(_)));
        assert_eq!(target.protocol_bps, 0);

        let ready = 1_000 + DEFAULT_MIN_DELAY_SECS;
        gov.set_protocol_fee_percent(&mut target, executor(), ready, address, 500, Action::Execute)
            .unwrap();
        assert_eq!(target.protocol_bps, 500);

        // Exactly once.
        let err = gov
            .set_protocol_fee_percent(&mut target, executor(), ready + 1, address, 500, Action::Execute)
            .unwrap_err();
        assert!(matches!(err, BondlineError::OperationNotReady(_)));
        let err = gov
            .set_protocol_fee_percent(&mut target, proposer(), ready + 1, address, 500, Action::Propose)
            .unwrap_err();
        assert!(matches!(err, BondlineError::OperationAlreadyScheduled(_)));
    }

    #[test]
    fn test_cancel_then_repropose() {
        let (mut gov, mut target) = setup();
        let address = target.address;
        let id = TimelockGovernor::hash_operation(
            &address,
            &GovernedCall::SetProtocolFeePercent(500),
            &ZERO_SALT,
        );

        gov.set_protocol_fee_percent(&mut target, proposer(), 0, address, 500, Action::Propose)
            .unwrap();
        gov.set_protocol_fee_percent(&mut target, canceller(), 10, address, 500, Action::Cancel)
            .unwrap();
        assert_eq!(gov.operation_state(&id), OperationState::Cancelled);

        let late = DEFAULT_MIN_DELAY_SECS + 1;
        let err = gov
            .set_protocol_fee_percent(&mut target, executor(), late, address, 500, Action::Execute)
            .unwrap_err();
        assert!(matches!(err, BondlineError::OperationNotReady(_)));

        let state = gov
            .set_protocol_fee_percent(&mut target, proposer(), late, address, 500, Action::Propose)
            .unwrap();
        assert_eq!(state, OperationState::Scheduled { ready_at: late + DEFAULT_MIN_DELAY_SECS });
        assert!(!gov.is_operation_ready(&id, late));
        assert!(gov.is_operation_ready(&id, late + DEFAULT_MIN_DELAY_SECS));
    }

    #[test]
    fn test_cancel_requires_pending() {
        let (mut gov, mut target) = setup();
        let address = target.address;
        let err = gov
            .set_protocol_fee_percent(&mut target, canceller(), 0, address, 500, Action::Cancel)
            .unwrap_err();
        assert!(matches!(err, BondlineError::OperationNotPending(_)));
    }

    #[test]
    fn test_roles_are_enforced() {
        let (mut gov, mut target) = setup();
        let address = target.address;
        for (caller, action) in [
            (executor(), Action::Propose),
            (proposer(), Action::Execute),
            (proposer(), Action::Cancel),
        ] {
            let err = gov
                .set_protocol_fee_percent(&mut target, caller, 0, address, 500, action)
                .unwrap_err();
            assert!(matches!(err, BondlineError::Unauthorized(_)), "{:?}", action);
        }
    }

    #[test]
    fn test_failed_execution_stays_scheduled() {
        let (mut gov, mut target) = setup();
        let address = target.address;
        gov.set_protocol_fee_percent(&mut target, proposer(), 0, address, 20_000, Action::Propose)
            .unwrap();
        let err = gov
            .set_protocol_fee_percent(
                &mut target,
                executor(),
                DEFAULT_MIN_DELAY_SECS,
                address,
                20_000,
                Action::Execute,
            )
            .unwrap_err();
        assert!(matches!(err, BondlineError::FeePercentOutOfRange { .. }));
        let id = TimelockGovernor::hash_operation(
            &address,
            &GovernedCall::SetProtocolFeePercent(20_000),
            &ZERO_SALT,
        );
        assert!(gov.operation_state(&id).is_pending());
    }

    #[test]
    fn test_unknown_target() {
        let (mut gov, mut target) = setup();
        let stray = AccountId::from_label("stray");
        gov.set_paused(&mut target, proposer(), 0, stray, true, Action::Propose)
            .unwrap();
        let err = gov
            .set_paused(&mut target, executor(), DEFAULT_MIN_DELAY_SECS, stray, true, Action::Execute)
            .unwrap_err();
        assert_eq!(err, BondlineError::UnknownTarget(stray));
    }

    #[test]
    fn test_admin_manages_roles() {
        let (mut gov, _) = setup();
        let newcomer = AccountId::from_label("newcomer");
        assert!(gov.grant_role(newcomer, Role::Proposer, newcomer).is_err());
        gov.grant_role(admin(), Role::Proposer, newcomer).unwrap();
        assert!(gov.has_role(Role::Proposer, &newcomer));
        gov.revoke_role(admin(), Role::Proposer, newcomer).unwrap();
        assert!(!gov.has_role(Role::Proposer, &newcomer));
    }
}
