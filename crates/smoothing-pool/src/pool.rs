//! The smoothing pool facade.
//!
//! [`SmoothingPool`] owns every component and exposes the public call
//! surface. Each call takes a [`CallContext`] carrying the caller and the
//! attached value. Calls validate everything before mutating, and append
//! their events only once they cannot fail anymore.

use smoothing_crypto::keccak;
use smoothing_oracle::consensus::OracleConsensus;
use smoothing_types::events::Event;
use smoothing_types::report::Report;
use smoothing_types::{address_hex, Address, Hash, Slot, ValidatorId, Wei, ZERO_ADDRESS};

use crate::claims::{ClaimPlan, ClaimsLedger};
use crate::config::PoolConfig;
use crate::events::EventLog;
use crate::governance::Roles;
use crate::params::PoolParameters;
use crate::subscriptions::{Subscription, SubscriptionRegistry};
use crate::transfer::ValueTransfer;
use crate::treasury::Treasury;
use crate::{CallContext, PoolError, Result};

/// Complete pool state.
#[derive(Clone, Debug)]
pub struct SmoothingPool {
    roles: Roles,
    params: PoolParameters,
    subscriptions: SubscriptionRegistry,
    oracle: OracleConsensus,
    claims: ClaimsLedger,
    treasury: Treasury,
    events: EventLog,
    deployment_block_number: u64,
}

/// Reject value attached to a call that does not take any.
fn non_payable(ctx: &CallContext) -> Result<()> {
    if ctx.value != 0 {
        return Err(PoolError::NonPayable(ctx.value));
    }
    Ok(())
}

impl SmoothingPool {
    /// Deploy a pool owned by `deployer`.
    ///
    /// The pool starts uninitialized: reports are refused until the owner
    /// calls [`Self::init_smoothing_pool`].
    ///
    /// # Errors
    ///
    /// - [`PoolError::FeeTooHigh`] if the pool fee exceeds 10000
    /// - [`PoolError::CheckpointSlotSizeZero`] if the checkpoint size is 0
    /// - [`PoolError::Oracle`] if the quorum is 0
    pub fn initialize(
        deployer: Address,
        config: &PoolConfig,
        deployment_block_number: u64,
    ) -> Result<Self> {
        let params = PoolParameters::try_from(config)?;
        let oracle = OracleConsensus::new(config.quorum)?;

        let mut pool = Self {
            roles: Roles::new(deployer, config.governance),
            params,
            subscriptions: SubscriptionRegistry::new(),
            oracle,
            claims: ClaimsLedger::new(),
            treasury: Treasury::new(),
            events: EventLog::new(),
            deployment_block_number,
        };

        pool.events.emit_all([
            Event::OwnershipTransferred {
                previous_owner: ZERO_ADDRESS,
                new_owner: deployer,
            },
            Event::UpdatePoolFee {
                pool_fee: config.pool_fee,
            },
            Event::UpdatePoolFeeRecipient {
                pool_fee_recipient: config.pool_fee_recipient,
            },
            Event::UpdateCheckpointSlotSize {
                checkpoint_slot_size: config.checkpoint_slot_size,
            },
            Event::UpdateQuorum {
                quorum: config.quorum,
            },
        ]);

        tracing::info!(
            owner = address_hex(&deployer),
            governance = address_hex(&config.governance),
            pool_fee = config.pool_fee,
            checkpoint_slot_size = config.checkpoint_slot_size,
            quorum = config.quorum,
            deployment_block_number,
            "smoothing pool deployed"
        );

        Ok(pool)
    }

    // ========================================================================
    // Treasury
    // ========================================================================

    /// Accept native value, with or without call data.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Overflow`] if the pool balance would overflow
    pub fn receive(&mut self, ctx: &CallContext, data: &[u8]) -> Result<()> {
        self.treasury.credit(ctx.value)?;
        self.events.emit_all([Event::EtherReceived {
            sender: ctx.caller,
            amount: ctx.value,
        }]);
        tracing::debug!(
            sender = address_hex(&ctx.caller),
            amount = %ctx.value,
            data_len = data.len(),
            "value received"
        );
        Ok(())
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Subscribe one validator. The call must carry exactly the current
    /// collateral.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidCollateral`] if the attached value is wrong
    /// - [`PoolError::AlreadySubscribed`] if the validator is subscribed
    pub fn subscribe_validator(
        &mut self,
        ctx: &CallContext,
        validator_id: ValidatorId,
    ) -> Result<()> {
        self.subscribe_validators(ctx, &[validator_id])
    }

    /// Subscribe several validators. The call must carry the current
    /// collateral times the number of IDs.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidCollateral`] if the attached value is wrong
    /// - [`PoolError::AlreadySubscribed`] if any ID is subscribed or repeated
    pub fn subscribe_validators(
        &mut self,
        ctx: &CallContext,
        validator_ids: &[ValidatorId],
    ) -> Result<()> {
        let collateral = self.params.subscription_collateral();
        let expected = SubscriptionRegistry::required_collateral(collateral, validator_ids.len())?;
        if ctx.value != expected {
            return Err(PoolError::InvalidCollateral {
                expected,
                actual: ctx.value,
            });
        }

        let mut treasury = self.treasury;
        treasury.credit(ctx.value)?;
        self.subscriptions
            .subscribe(ctx.caller, validator_ids, collateral)?;
        self.treasury = treasury;

        self.events
            .emit_all(validator_ids.iter().map(|&validator_id| Event::SubscribeValidator {
                sender: ctx.caller,
                collateral,
                validator_id,
            }));

        tracing::info!(
            depositor = address_hex(&ctx.caller),
            validators = ?validator_ids,
            collateral = %collateral,
            "validators subscribed"
        );
        Ok(())
    }

    /// End a validator's subscription. Anyone may call this; the collateral
    /// stays in the pool.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotSubscribed`] if the validator is not subscribed
    pub fn unsubscribe_validator(
        &mut self,
        ctx: &CallContext,
        validator_id: ValidatorId,
    ) -> Result<()> {
        non_payable(ctx)?;
        let subscription = self.subscriptions.unsubscribe(validator_id)?;

        self.events.emit_all([Event::UnsubscribeValidator {
            depositor: subscription.depositor,
            validator_id,
        }]);

        tracing::info!(
            validator_id,
            depositor = address_hex(&subscription.depositor),
            caller = address_hex(&ctx.caller),
            "validator unsubscribed"
        );
        Ok(())
    }

    // ========================================================================
    // Governance
    // ========================================================================

    /// Nominate the next governance address.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotGovernance`] if the caller is not governance
    pub fn transfer_governance(&mut self, ctx: &CallContext, candidate: Address) -> Result<()> {
        non_payable(ctx)?;
        self.roles.transfer_governance(&ctx.caller, candidate)?;
        self.events.emit_all([Event::TransferGovernance {
            new_pending_governance: candidate,
        }]);
        tracing::info!(candidate = address_hex(&candidate), "governance transfer proposed");
        Ok(())
    }

    /// Accept a pending governance nomination.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotPendingGovernance`] if the caller is not the candidate
    /// - [`PoolError::GovernanceAlreadyAccepted`] if the caller already holds
    ///   governance and nothing is pending
    pub fn accept_governance(&mut self, ctx: &CallContext) -> Result<()> {
        non_payable(ctx)?;
        self.roles.accept_governance(&ctx.caller)?;
        self.events.emit_all([Event::AcceptGovernance {
            new_governance: ctx.caller,
        }]);
        tracing::info!(governance = address_hex(&ctx.caller), "governance accepted");
        Ok(())
    }

    /// # Errors
    ///
    /// - [`PoolError::NotGovernance`] if the caller is not governance
    /// - [`PoolError::Oracle`] if the address is already a member
    pub fn add_oracle_member(&mut self, ctx: &CallContext, member: Address) -> Result<()> {
        non_payable(ctx)?;
        self.roles.ensure_governance(&ctx.caller)?;
        self.oracle.add_member(member)?;
        self.events.emit_all([Event::AddOracleMember {
            oracle_member: member,
        }]);
        Ok(())
    }

    /// Remove the member at `index`, withdrawing its outstanding vote.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotGovernance`] if the caller is not governance
    /// - [`PoolError::Oracle`] if the address is not a member or `index` is
    ///   not its current position
    pub fn remove_oracle_member(
        &mut self,
        ctx: &CallContext,
        member: Address,
        index: usize,
    ) -> Result<()> {
        non_payable(ctx)?;
        self.roles.ensure_governance(&ctx.caller)?;
        self.oracle.remove_member(&member, index)?;
        self.events.emit_all([Event::RemoveOracleMember {
            oracle_member: member,
        }]);
        Ok(())
    }

    /// # Errors
    ///
    /// - [`PoolError::NotGovernance`] if the caller is not governance
    /// - [`PoolError::Oracle`] if `quorum` is 0
    pub fn update_quorum(&mut self, ctx: &CallContext, quorum: u32) -> Result<()> {
        non_payable(ctx)?;
        self.roles.ensure_governance(&ctx.caller)?;
        self.oracle.set_quorum(quorum)?;
        self.events.emit_all([Event::UpdateQuorum { quorum }]);
        Ok(())
    }

    // ========================================================================
    // Owner
    // ========================================================================

    /// Set the start slot, enabling report submission. One-time.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotOwner`] if the caller is not the owner
    /// - [`PoolError::Oracle`] if `start_slot` is 0 or the pool is already
    ///   initialized
    pub fn init_smoothing_pool(&mut self, ctx: &CallContext, start_slot: Slot) -> Result<()> {
        non_payable(ctx)?;
        self.roles.ensure_owner(&ctx.caller)?;
        self.oracle.initialize(start_slot)?;
        self.events
            .emit_all([Event::InitSmoothingPool { slot: start_slot }]);
        Ok(())
    }

    /// # Errors
    ///
    /// - [`PoolError::NotOwner`] if the caller is not the owner
    pub fn update_collateral(&mut self, ctx: &CallContext, collateral: Wei) -> Result<()> {
        non_payable(ctx)?;
        self.roles.ensure_owner(&ctx.caller)?;
        self.params.set_subscription_collateral(collateral);
        self.events
            .emit_all([Event::UpdateSubscriptionCollateral { collateral }]);
        tracing::info!(collateral = %collateral, "subscription collateral updated");
        Ok(())
    }

    /// # Errors
    ///
    /// - [`PoolError::NotOwner`] if the caller is not the owner
    /// - [`PoolError::FeeTooHigh`] if `pool_fee` exceeds 10000
    pub fn update_pool_fee(&mut self, ctx: &CallContext, pool_fee: u16) -> Result<()> {
        non_payable(ctx)?;
        self.roles.ensure_owner(&ctx.caller)?;
        self.params.set_pool_fee(pool_fee)?;
        self.events.emit_all([Event::UpdatePoolFee { pool_fee }]);
        tracing::info!(pool_fee, "pool fee updated");
        Ok(())
    }

    /// # Errors
    ///
    /// - [`PoolError::NotOwner`] if the caller is not the owner
    pub fn update_pool_fee_recipient(
        &mut self,
        ctx: &CallContext,
        pool_fee_recipient: Address,
    ) -> Result<()> {
        non_payable(ctx)?;
        self.roles.ensure_owner(&ctx.caller)?;
        self.params.set_pool_fee_recipient(pool_fee_recipient);
        self.events
            .emit_all([Event::UpdatePoolFeeRecipient { pool_fee_recipient }]);
        Ok(())
    }

    /// # Errors
    ///
    /// - [`PoolError::NotOwner`] if the caller is not the owner
    /// - [`PoolError::CheckpointSlotSizeZero`] if `checkpoint_slot_size` is 0
    pub fn update_checkpoint_slot_size(
        &mut self,
        ctx: &CallContext,
        checkpoint_slot_size: u64,
    ) -> Result<()> {
        non_payable(ctx)?;
        self.roles.ensure_owner(&ctx.caller)?;
        self.params.set_checkpoint_slot_size(checkpoint_slot_size)?;
        self.events
            .emit_all([Event::UpdateCheckpointSlotSize { checkpoint_slot_size }]);
        tracing::info!(checkpoint_slot_size, "checkpoint slot size updated");
        Ok(())
    }

    /// # Errors
    ///
    /// - [`PoolError::NotOwner`] if the caller is not the owner
    /// - [`PoolError::ZeroAddressOwner`] if `new_owner` is the zero address
    pub fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: Address) -> Result<()> {
        non_payable(ctx)?;
        let previous_owner = self.roles.transfer_ownership(&ctx.caller, new_owner)?;
        self.events.emit_all([Event::OwnershipTransferred {
            previous_owner,
            new_owner,
        }]);
        tracing::info!(
            previous_owner = address_hex(&previous_owner),
            new_owner = address_hex(&new_owner),
            "ownership transferred"
        );
        Ok(())
    }

    /// Leave the pool without an owner. Owner-gated calls fail afterwards.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotOwner`] if the caller is not the owner
    pub fn renounce_ownership(&mut self, ctx: &CallContext) -> Result<()> {
        non_payable(ctx)?;
        let previous_owner = self.roles.renounce_ownership(&ctx.caller)?;
        self.events.emit_all([Event::OwnershipTransferred {
            previous_owner,
            new_owner: ZERO_ADDRESS,
        }]);
        tracing::warn!(
            previous_owner = address_hex(&previous_owner),
            "ownership renounced"
        );
        Ok(())
    }

    // ========================================================================
    // Oracle
    // ========================================================================

    /// Vote for `(slot, rewards_root)` as the caller.
    ///
    /// Always emits `SubmitReport`; also emits `ReportConsolidated` when the
    /// vote brings the report to quorum.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Oracle`] if the pool is not initialized, the caller is
    ///   not a member, or the slot is not admissible
    pub fn submit_report(
        &mut self,
        ctx: &CallContext,
        slot: Slot,
        rewards_root: Hash,
    ) -> Result<()> {
        non_payable(ctx)?;
        let outcome = self.oracle.submit_report(
            &ctx.caller,
            slot,
            rewards_root,
            self.params.checkpoint_slot_size(),
        )?;

        self.events.emit_all([Event::SubmitReport {
            slot,
            rewards_root,
            oracle_member: ctx.caller,
        }]);
        if outcome.consolidated {
            self.events
                .emit_all([Event::ReportConsolidated { slot, rewards_root }]);
        }
        Ok(())
    }

    // ========================================================================
    // Claims
    // ========================================================================

    /// Pay out the unclaimed part of `beneficiary`'s cumulative entitlement.
    ///
    /// Anyone may trigger the claim; the payout goes to the beneficiary's
    /// reward recipient if set, else to the beneficiary. The ledger is
    /// updated before `transfer` is invoked and restored if it fails. A zero
    /// payout succeeds without calling `transfer`.
    ///
    /// Returns the amount paid.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidProof`] if the proof does not authenticate the
    ///   claim against the current rewards root
    /// - [`PoolError::EntitlementBelowClaimed`] if more was already paid
    /// - [`PoolError::TransferFailed`] if the pool balance is insufficient or
    ///   the recipient rejects the value
    pub fn claim_rewards<T>(
        &mut self,
        ctx: &CallContext,
        beneficiary: Address,
        entitlement: Wei,
        proof: &[Hash],
        transfer: &mut T,
    ) -> Result<Wei>
    where
        T: ValueTransfer + ?Sized,
    {
        non_payable(ctx)?;
        let plan = self.claims.plan_claim(
            &self.oracle.rewards_root(),
            beneficiary,
            entitlement,
            proof,
        )?;

        self.claims.apply(&plan);
        if let Err(err) = self.pay_out(&plan, transfer) {
            self.claims.revert(&plan);
            tracing::warn!(
                beneficiary = address_hex(&plan.beneficiary),
                recipient = address_hex(&plan.recipient),
                payout = %plan.payout,
                error = %err,
                "reward claim reverted"
            );
            return Err(err);
        }

        self.events.emit_all([Event::ClaimRewards {
            beneficiary: plan.beneficiary,
            recipient: plan.recipient,
            amount: plan.payout,
        }]);

        tracing::info!(
            beneficiary = address_hex(&plan.beneficiary),
            recipient = address_hex(&plan.recipient),
            payout = %plan.payout,
            entitlement = %plan.entitlement,
            "rewards claimed"
        );
        Ok(plan.payout)
    }

    /// Move `plan.payout` from the pool to the recipient.
    fn pay_out<T>(&mut self, plan: &ClaimPlan, transfer: &mut T) -> Result<()>
    where
        T: ValueTransfer + ?Sized,
    {
        if plan.payout == 0 {
            return Ok(());
        }
        let mut treasury = self.treasury;
        treasury.debit(plan.payout)?;
        transfer
            .send_value(&plan.recipient, plan.payout)
            .map_err(|rejected| PoolError::TransferFailed(rejected.to_string()))?;
        self.treasury = treasury;
        Ok(())
    }

    /// Route the caller's future payouts to `delegate`. The zero address
    /// restores payouts to the caller.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NonPayable`] if value is attached
    pub fn set_reward_recipient(&mut self, ctx: &CallContext, delegate: Address) -> Result<()> {
        non_payable(ctx)?;
        self.claims.set_reward_recipient(ctx.caller, delegate);
        self.events.emit_all([Event::SetRewardRecipient {
            beneficiary: ctx.caller,
            recipient: delegate,
        }]);
        tracing::info!(
            beneficiary = address_hex(&ctx.caller),
            recipient = address_hex(&delegate),
            "reward recipient set"
        );
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn owner(&self) -> Address {
        self.roles.owner()
    }

    pub fn governance(&self) -> Address {
        self.roles.governance()
    }

    /// Zero address when no handoff is pending.
    pub fn pending_governance(&self) -> Address {
        self.roles.pending_governance()
    }

    pub fn subscription_collateral(&self) -> Wei {
        self.params.subscription_collateral()
    }

    pub fn pool_fee(&self) -> u16 {
        self.params.pool_fee()
    }

    pub fn pool_fee_recipient(&self) -> Address {
        self.params.pool_fee_recipient()
    }

    pub fn checkpoint_slot_size(&self) -> u64 {
        self.params.checkpoint_slot_size()
    }

    pub fn quorum(&self) -> u32 {
        self.oracle.quorum()
    }

    pub fn rewards_root(&self) -> Hash {
        self.oracle.rewards_root()
    }

    /// 0 until [`Self::init_smoothing_pool`].
    pub fn last_consolidated_slot(&self) -> Slot {
        self.oracle.last_consolidated_slot()
    }

    pub fn deployment_block_number(&self) -> u64 {
        self.deployment_block_number
    }

    pub fn oracle_members(&self) -> &[Address] {
        self.oracle.members()
    }

    pub fn oracle_members_count(&self) -> usize {
        self.oracle.member_count()
    }

    /// # Errors
    ///
    /// - [`PoolError::Oracle`] if `member` is not a member
    pub fn oracle_member_index(&self, member: &Address) -> Result<usize> {
        Ok(self.oracle.member_index(member)?)
    }

    pub fn is_oracle_member(&self, address: &Address) -> bool {
        self.oracle.is_member(address)
    }

    /// Zero for non-members, the initial sentinel for members who have not
    /// voted, else the report hash voted for.
    pub fn voted_report_hash(&self, member: &Address) -> Hash {
        self.oracle.voted_report_hash(member)
    }

    /// Report tally; slot 0 / votes 0 if absent or consolidated.
    pub fn report(&self, report_hash: &Hash) -> Report {
        self.oracle.report(report_hash)
    }

    /// Hash identifying the report `(slot, rewards_root)`.
    pub fn report_hash(slot: Slot, rewards_root: &Hash) -> Hash {
        keccak::report_hash(slot, rewards_root)
    }

    pub fn claimed_balance(&self, beneficiary: &Address) -> Wei {
        self.claims.claimed(beneficiary)
    }

    /// Zero address when no override is set.
    pub fn reward_recipient(&self, beneficiary: &Address) -> Address {
        self.claims.reward_recipient(beneficiary)
    }

    pub fn subscription(&self, validator_id: ValidatorId) -> Option<Subscription> {
        self.subscriptions.get(validator_id).copied()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Native balance held by the pool.
    pub fn balance(&self) -> Wei {
        self.treasury.balance()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }
}
