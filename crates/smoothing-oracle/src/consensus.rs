//! Quorum consensus over checkpointed reward reports.
//!
//! Each oracle member points at exactly one report hash (or none, right after
//! joining). Reports are tallied by hash, so members can change their minds
//! freely before consolidation without any ballot history being kept.
//!
//! ## Lifecycle of a report hash
//!
//! ```text
//! NoVotes --vote--> PartialVotes(n) --votes >= quorum--> Consolidated
//!    ^                    |
//!    +--last vote withdrawn
//! ```
//!
//! A consolidated report reads back as slot 0 / votes 0, and can never be
//! voted on again because its slot is no longer ahead of the last
//! consolidated slot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use smoothing_crypto::keccak::report_hash;
use smoothing_types::report::{Report, Vote};
use smoothing_types::{address_hex, hash_hex, Address, Hash, Slot, ZERO_HASH};

use crate::members::MemberSet;
use crate::{OracleError, Result};

/// What a single `submit_report` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// Hash of the submitted `(slot, root)` pair.
    pub report_hash: Hash,
    /// Votes the report held after this submission (before any reset).
    pub votes: u32,
    /// Whether the member's vote moved to a different report.
    pub vote_changed: bool,
    /// Whether this submission made the report canonical.
    pub consolidated: bool,
}

/// Oracle committee state: members, votes, tallies and the canonical root.
#[derive(Clone, Debug)]
pub struct OracleConsensus {
    members: MemberSet,
    /// Entry exists iff the address is a member.
    votes: HashMap<Address, Vote>,
    /// Only reports with at least one vote are stored.
    reports: HashMap<Hash, Report>,
    quorum: u32,
    rewards_root: Hash,
    /// 0 until the pool is initialized.
    last_consolidated_slot: Slot,
}

impl OracleConsensus {
    /// Create an empty committee with the given quorum.
    ///
    /// # Errors
    ///
    /// - [`OracleError::QuorumZero`] if `quorum` is 0
    pub fn new(quorum: u32) -> Result<Self> {
        if quorum == 0 {
            return Err(OracleError::QuorumZero);
        }
        Ok(Self {
            members: MemberSet::new(),
            votes: HashMap::new(),
            reports: HashMap::new(),
            quorum,
            rewards_root: ZERO_HASH,
            last_consolidated_slot: 0,
        })
    }

    /// Set the slot from which reports are accepted. One-time.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidSlot`] if `start_slot` is 0
    /// - [`OracleError::AlreadyInitialized`] if a start slot was already set
    pub fn initialize(&mut self, start_slot: Slot) -> Result<()> {
        if start_slot == 0 {
            return Err(OracleError::InvalidSlot {
                slot: 0,
                reason: "cannot initialize to slot 0",
            });
        }
        if self.is_initialized() {
            return Err(OracleError::AlreadyInitialized(self.last_consolidated_slot));
        }
        self.last_consolidated_slot = start_slot;
        tracing::info!(start_slot, "smoothing pool initialized");
        Ok(())
    }

    /// Whether a start slot has been set.
    pub fn is_initialized(&self) -> bool {
        self.last_consolidated_slot != 0
    }

    /// Add an oracle member with no outstanding vote.
    ///
    /// # Errors
    ///
    /// - [`OracleError::AlreadyMember`] if the address is already a member
    pub fn add_member(&mut self, member: Address) -> Result<()> {
        let index = self.members.insert(member)?;
        self.votes.insert(member, Vote::Unvoted);
        tracing::info!(member = address_hex(&member), index, "oracle member added");
        Ok(())
    }

    /// Remove an oracle member, withdrawing any outstanding vote.
    ///
    /// Returns the report hash the member was supporting, if any.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NotAMember`] if the address is not a member
    /// - [`OracleError::IndexMismatch`] if `index` is not its current position
    pub fn remove_member(&mut self, member: &Address, index: usize) -> Result<Option<Hash>> {
        self.members.remove(member, index)?;
        let withdrawn = match self.votes.remove(member) {
            Some(Vote::VotedFor(hash)) => {
                self.withdraw_vote(&hash);
                Some(hash)
            }
            _ => None,
        };
        tracing::info!(
            member = address_hex(member),
            withdrawn = ?withdrawn.as_ref().map(hash_hex),
            "oracle member removed"
        );
        Ok(withdrawn)
    }

    /// Change the number of matching votes needed to consolidate.
    ///
    /// Lowering the quorum does not consolidate pending reports by itself;
    /// the next submission for such a report does.
    ///
    /// # Errors
    ///
    /// - [`OracleError::QuorumZero`] if `quorum` is 0
    pub fn set_quorum(&mut self, quorum: u32) -> Result<()> {
        if quorum == 0 {
            return Err(OracleError::QuorumZero);
        }
        self.quorum = quorum;
        tracing::info!(quorum, "quorum updated");
        Ok(())
    }

    /// Check that `slot` may be reported on.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidSlot`] unless `slot` is a positive multiple of
    ///   `checkpoint_slot_size` strictly after the last consolidated slot
    pub fn validate_slot(&self, slot: Slot, checkpoint_slot_size: u64) -> Result<()> {
        let reason = if slot == 0 {
            "slot is zero"
        } else if checkpoint_slot_size == 0 {
            "checkpoint slot size is zero"
        } else if slot % checkpoint_slot_size != 0 {
            "not a multiple of the checkpoint slot size"
        } else if slot <= self.last_consolidated_slot {
            "not after the last consolidated slot"
        } else {
            return Ok(());
        };
        Err(OracleError::InvalidSlot { slot, reason })
    }

    /// Cast `member`'s vote for `(slot, rewards_root)`.
    ///
    /// Moving a vote decrements the previously supported report first.
    /// Re-submitting the current vote changes no tallies. If the report's
    /// tally reaches the quorum it is consolidated: the root becomes
    /// canonical, `slot` becomes the last consolidated slot and the report's
    /// tally is cleared.
    ///
    /// # Errors
    ///
    /// - [`OracleError::PoolNotInitialized`] before [`Self::initialize`]
    /// - [`OracleError::NotAnOracleMember`] if `member` is not a member
    /// - [`OracleError::InvalidSlot`] if the slot fails [`Self::validate_slot`]
    pub fn submit_report(
        &mut self,
        member: &Address,
        slot: Slot,
        rewards_root: Hash,
        checkpoint_slot_size: u64,
    ) -> Result<SubmitOutcome> {
        if !self.is_initialized() {
            return Err(OracleError::PoolNotInitialized);
        }
        let previous = *self
            .votes
            .get(member)
            .ok_or_else(|| OracleError::NotAnOracleMember(address_hex(member)))?;
        self.validate_slot(slot, checkpoint_slot_size)?;

        let hash = report_hash(slot, &rewards_root);
        let vote_changed = previous != Vote::VotedFor(hash);

        if vote_changed {
            if let Vote::VotedFor(old) = previous {
                self.withdraw_vote(&old);
            }
            self.votes.insert(*member, Vote::VotedFor(hash));
            let report = self.reports.entry(hash).or_insert(Report { slot, votes: 0 });
            report.votes += 1;
        }

        let votes = self.reports.get(&hash).map_or(0, |r| r.votes);
        tracing::debug!(
            member = address_hex(member),
            slot,
            report = hash_hex(&hash),
            votes,
            quorum = self.quorum,
            vote_changed,
            "report vote recorded"
        );

        let consolidated = votes >= self.quorum;
        if consolidated {
            self.reports.remove(&hash);
            self.rewards_root = rewards_root;
            self.last_consolidated_slot = slot;
            tracing::info!(
                slot,
                rewards_root = hash_hex(&rewards_root),
                votes,
                "report consolidated"
            );
        }

        Ok(SubmitOutcome {
            report_hash: hash,
            votes,
            vote_changed,
            consolidated,
        })
    }

    /// Drop one vote from `hash`, clearing the report when none remain.
    /// Reports that were already cleared are left alone.
    fn withdraw_vote(&mut self, hash: &Hash) {
        if let Some(report) = self.reports.get_mut(hash) {
            report.votes = report.votes.saturating_sub(1);
            if report.votes == 0 {
                self.reports.remove(hash);
            }
        }
    }

    /// Current quorum.
    pub fn quorum(&self) -> u32 {
        self.quorum
    }

    /// Canonical rewards root.
    pub fn rewards_root(&self) -> Hash {
        self.rewards_root
    }

    /// Last consolidated slot, or the start slot if nothing consolidated yet.
    pub fn last_consolidated_slot(&self) -> Slot {
        self.last_consolidated_slot
    }

    /// Members in storage order.
    pub fn members(&self) -> &[Address] {
        self.members.as_slice()
    }

    /// Number of members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether `address` is a member.
    pub fn is_member(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    /// Current index of `member`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NotAMember`] if the address is not a member
    pub fn member_index(&self, member: &Address) -> Result<usize> {
        self.members
            .index_of(member)
            .ok_or_else(|| OracleError::NotAMember(address_hex(member)))
    }

    /// `member`'s vote, or `None` for non-members.
    pub fn vote_of(&self, member: &Address) -> Option<Vote> {
        self.votes.get(member).copied()
    }

    /// Voted report hash as exposed on-chain: zero for non-members, the
    /// initial sentinel for members who have not voted.
    pub fn voted_report_hash(&self, member: &Address) -> Hash {
        self.vote_of(member)
            .map_or(ZERO_HASH, |vote| vote.as_report_hash())
    }

    /// Tally for `hash`; default (zeroed) if it has no votes.
    pub fn report(&self, hash: &Hash) -> Report {
        self.reports.get(hash).copied().unwrap_or_default()
    }
}
