//! Claimed-amount ledger and reward recipient overrides.
//!
//! Reward trees carry each beneficiary's cumulative entitlement, so a claim
//! pays the difference between the proven entitlement and what was already
//! paid. Claiming twice against the same root pays nothing the second time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use smoothing_crypto::keccak::reward_leaf;
use smoothing_crypto::merkle::verify_proof;
use smoothing_types::hex::PrefixedHex;
use smoothing_types::{address_hex, Address, Hash, Wei, ZERO_ADDRESS};

use crate::{PoolError, Result};

/// A verified claim, ready to be applied.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPlan {
    #[serde_as(as = "PrefixedHex")]
    pub beneficiary: Address,
    /// Where the payout goes.
    #[serde_as(as = "PrefixedHex")]
    pub recipient: Address,
    /// Proven cumulative entitlement.
    #[serde_as(as = "DisplayFromStr")]
    pub entitlement: Wei,
    /// Amount claimed before this claim.
    #[serde_as(as = "DisplayFromStr")]
    pub previously_claimed: Wei,
    /// `entitlement - previously_claimed`.
    #[serde_as(as = "DisplayFromStr")]
    pub payout: Wei,
}

/// Per-beneficiary claim bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct ClaimsLedger {
    claimed: HashMap<Address, Wei>,
    recipients: HashMap<Address, Address>,
}

impl ClaimsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative amount paid out for `beneficiary`.
    pub fn claimed(&self, beneficiary: &Address) -> Wei {
        self.claimed.get(beneficiary).copied().unwrap_or(0)
    }

    /// Delegated recipient of `beneficiary`, or the zero address if unset.
    pub fn reward_recipient(&self, beneficiary: &Address) -> Address {
        self.recipients
            .get(beneficiary)
            .copied()
            .unwrap_or(ZERO_ADDRESS)
    }

    /// Where payouts for `beneficiary` are sent.
    pub fn payout_recipient(&self, beneficiary: &Address) -> Address {
        self.recipients
            .get(beneficiary)
            .copied()
            .unwrap_or(*beneficiary)
    }

    /// Route future payouts for `beneficiary` to `recipient`. Setting the
    /// zero address clears the override.
    pub fn set_reward_recipient(&mut self, beneficiary: Address, recipient: Address) {
        if recipient == ZERO_ADDRESS {
            self.recipients.remove(&beneficiary);
        } else {
            self.recipients.insert(beneficiary, recipient);
        }
    }

    /// Authenticate a claim against `rewards_root` and work out the payout.
    /// Does not modify the ledger.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidProof`] if the proof does not authenticate
    ///   `(beneficiary, entitlement)` under `rewards_root`
    /// - [`PoolError::EntitlementBelowClaimed`] if the proven entitlement is
    ///   less than what was already paid
    pub fn plan_claim(
        &self,
        rewards_root: &Hash,
        beneficiary: Address,
        entitlement: Wei,
        proof: &[Hash],
    ) -> Result<ClaimPlan> {
        let leaf = reward_leaf(&beneficiary, entitlement);
        if !verify_proof(proof, rewards_root, &leaf) {
            tracing::debug!(
                beneficiary = address_hex(&beneficiary),
                entitlement = %entitlement,
                proof_len = proof.len(),
                "claim proof rejected"
            );
            return Err(PoolError::InvalidProof);
        }

        let previously_claimed = self.claimed(&beneficiary);
        let payout = entitlement
            .checked_sub(previously_claimed)
            .ok_or(PoolError::EntitlementBelowClaimed {
                entitlement,
                claimed: previously_claimed,
            })?;

        Ok(ClaimPlan {
            beneficiary,
            recipient: self.payout_recipient(&beneficiary),
            entitlement,
            previously_claimed,
            payout,
        })
    }

    /// Record `plan.entitlement` as fully claimed.
    pub fn apply(&mut self, plan: &ClaimPlan) {
        self.claimed.insert(plan.beneficiary, plan.entitlement);
    }

    /// Undo [`Self::apply`].
    pub fn revert(&mut self, plan: &ClaimPlan) {
        if plan.previously_claimed == 0 {
            self.claimed.remove(&plan.beneficiary);
        } else {
            self.claimed
                .insert(plan.beneficiary, plan.previously_claimed);
        }
    }
}

#[cfg(test)]
mod tests {
    use smoothing_crypto::merkle::{RewardEntry, RewardsTree};
    use smoothing_types::WEI_PER_ETHER;

    use super::*;

    const ALICE: Address = [0xa1; 20];
    const BOB: Address = [0xb0; 20];
    const DELEGATE: Address = [0xde; 20];

    fn tree(alice: Wei, bob: Wei) -> RewardsTree {
        RewardsTree::from_entries(&[
            RewardEntry {
                beneficiary: ALICE,
                entitlement: alice,
            },
            RewardEntry {
                beneficiary: BOB,
                entitlement: bob,
            },
        ])
    }

    #[test]
    fn test_first_claim_pays_full_entitlement() {
        let tree = tree(10 * WEI_PER_ETHER, WEI_PER_ETHER);
        let ledger = ClaimsLedger::new();
        let proof = tree.proof(0).expect("proof");

        let plan = ledger
            .plan_claim(&tree.root(), ALICE, 10 * WEI_PER_ETHER, &proof)
            .expect("valid claim");
        assert_eq!(plan.payout, 10 * WEI_PER_ETHER);
        assert_eq!(plan.recipient, ALICE);
    }

    #[test]
    fn test_repeat_claim_pays_zero() {
        let tree = tree(10 * WEI_PER_ETHER, WEI_PER_ETHER);
        let mut ledger = ClaimsLedger::new();
        let proof = tree.proof(0).expect("proof");

        let plan = ledger
            .plan_claim(&tree.root(), ALICE, 10 * WEI_PER_ETHER, &proof)
            .expect("first");
        ledger.apply(&plan);

        let again = ledger
            .plan_claim(&tree.root(), ALICE, 10 * WEI_PER_ETHER, &proof)
            .expect("second");
        assert_eq!(again.payout, 0);
        assert_eq!(ledger.claimed(&ALICE), 10 * WEI_PER_ETHER);
    }

    #[test]
    fn test_growing_entitlement_pays_delta() {
        let mut ledger = ClaimsLedger::new();
        let first = tree(3, 1);
        let plan = ledger
            .plan_claim(&first.root(), ALICE, 3, &first.proof(0).expect("proof"))
            .expect("first");
        ledger.apply(&plan);

        let second = tree(8, 1);
        let plan = ledger
            .plan_claim(&second.root(), ALICE, 8, &second.proof(0).expect("proof"))
            .expect("second");
        assert_eq!(plan.previously_claimed, 3);
        assert_eq!(plan.payout, 5);
    }

    #[test]
    fn test_shrinking_entitlement_rejected() {
        let mut ledger = ClaimsLedger::new();
        let first = tree(8, 1);
        let plan = ledger
            .plan_claim(&first.root(), ALICE, 8, &first.proof(0).expect("proof"))
            .expect("first");
        ledger.apply(&plan);

        let second = tree(5, 1);
        let err = ledger
            .plan_claim(&second.root(), ALICE, 5, &second.proof(0).expect("proof"))
            .expect_err("below claimed");
        assert!(matches!(
            err,
            PoolError::EntitlementBelowClaimed {
                entitlement: 5,
                claimed: 8
            }
        ));
    }

    #[test]
    fn test_invalid_proof_rejected() {
        let tree = tree(10, 1);
        let ledger = ClaimsLedger::new();
        let proof = tree.proof(0).expect("proof");

        // Inflated amount.
        assert!(matches!(
            ledger.plan_claim(&tree.root(), ALICE, 11, &proof),
            Err(PoolError::InvalidProof)
        ));
        // Someone else's proof.
        assert!(matches!(
            ledger.plan_claim(&tree.root(), BOB, 10, &proof),
            Err(PoolError::InvalidProof)
        ));
    }

    #[test]
    fn test_recipient_override() {
        let mut ledger = ClaimsLedger::new();
        assert_eq!(ledger.reward_recipient(&ALICE), ZERO_ADDRESS);
        assert_eq!(ledger.payout_recipient(&ALICE), ALICE);

        ledger.set_reward_recipient(ALICE, DELEGATE);
        assert_eq!(ledger.reward_recipient(&ALICE), DELEGATE);
        assert_eq!(ledger.payout_recipient(&ALICE), DELEGATE);

        ledger.set_reward_recipient(ALICE, ZERO_ADDRESS);
        assert_eq!(ledger.payout_recipient(&ALICE), ALICE);
    }

    #[test]
    fn test_revert_restores_previous_amount() {
        let mut ledger = ClaimsLedger::new();
        let plan = ClaimPlan {
            beneficiary: ALICE,
            recipient: ALICE,
            entitlement: 9,
            previously_claimed: 4,
            payout: 5,
        };
        ledger.claimed.insert(ALICE, 4);
        ledger.apply(&plan);
        assert_eq!(ledger.claimed(&ALICE), 9);
        ledger.revert(&plan);
        assert_eq!(ledger.claimed(&ALICE), 4);
    }
}
