//! Sorted-pair Merkle trees over reward leaves.
//!
//! Trees are built bottom-up from the leaves in the order given. When a level
//! has an odd number of nodes the last node is hashed with itself, and that
//! node is its own sibling in any proof that passes through it. Inner nodes
//! use [`hash_pair`], so a proof is just the list of sibling hashes.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use smoothing_types::hex::PrefixedHex;
use smoothing_types::{Address, Hash, Wei, ZERO_HASH};

use crate::keccak::{hash_pair, reward_leaf};
use crate::{CryptoError, Result};

/// One beneficiary's cumulative entitlement.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    /// Beneficiary address.
    #[serde_as(as = "PrefixedHex")]
    pub beneficiary: Address,
    /// Total owed to date, in wei.
    pub entitlement: Wei,
}

impl RewardEntry {
    /// The Merkle leaf for this entry.
    pub fn leaf(&self) -> Hash {
        reward_leaf(&self.beneficiary, self.entitlement)
    }
}

/// A fully materialized Merkle tree.
#[derive(Clone, Debug)]
pub struct RewardsTree {
    /// `layers[0]` holds the leaves; the last layer holds the root.
    layers: Vec<Vec<Hash>>,
}

impl RewardsTree {
    /// Build a tree from precomputed leaves.
    pub fn from_leaves(leaves: Vec<Hash>) -> Self {
        let mut layers = vec![leaves];
        loop {
            let current = &layers[layers.len() - 1];
            if current.len() <= 1 {
                break;
            }
            let next: Vec<Hash> = current
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    hash_pair(left, right)
                })
                .collect();
            layers.push(next);
        }

        tracing::debug!(
            leaves = layers[0].len(),
            depth = layers.len() - 1,
            "built rewards tree"
        );

        Self { layers }
    }

    /// Build a tree from reward entries.
    pub fn from_entries(entries: &[RewardEntry]) -> Self {
        Self::from_leaves(entries.iter().map(RewardEntry::leaf).collect())
    }

    /// The tree root. An empty tree has the zero root.
    pub fn root(&self) -> Hash {
        self.layers
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or(ZERO_HASH)
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    /// Whether the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    /// All layers, leaves first.
    pub fn layers(&self) -> &[Vec<Hash>] {
        &self.layers
    }

    /// Sibling path from the leaf at `index` up to the root.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::LeafOutOfRange`] if `index` is not a leaf
    pub fn proof(&self, index: usize) -> Result<Vec<Hash>> {
        if index >= self.len() {
            return Err(CryptoError::LeafOutOfRange {
                index,
                leaves: self.len(),
            });
        }

        let mut proof = Vec::with_capacity(self.layers.len().saturating_sub(1));
        let mut position = index;
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = position ^ 1;
            // Odd tail node is paired with itself.
            proof.push(layer.get(sibling).copied().unwrap_or(layer[position]));
            position /= 2;
        }
        Ok(proof)
    }
}

/// Fold `proof` from `leaf` and compare against `root`.
///
/// An empty proof authenticates a leaf only if it is the root itself.
pub fn verify_proof(proof: &[Hash], root: &Hash, leaf: &Hash) -> bool {
    compute_root(proof, leaf) == *root
}

/// Recompute the root implied by `proof` and `leaf`.
pub fn compute_root(proof: &[Hash], leaf: &Hash) -> Hash {
    proof
        .iter()
        .fold(*leaf, |node, sibling| hash_pair(&node, sibling))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: u8) -> Vec<RewardEntry> {
        (1..=n)
            .map(|i| {
                let mut beneficiary = [0u8; 20];
                beneficiary[0] = i << 4;
                RewardEntry {
                    beneficiary,
                    entitlement: u128::from(i) * 10_000,
                }
            })
            .collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree = RewardsTree::from_leaves(vec![]);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), ZERO_HASH);
        assert!(matches!(
            tree.proof(0),
            Err(CryptoError::LeafOutOfRange { index: 0, leaves: 0 })
        ));
    }

    #[test]
    fn test_single_leaf_is_root() {
        let entry = &entries(1)[0];
        let tree = RewardsTree::from_entries(std::slice::from_ref(entry));
        assert_eq!(tree.root(), entry.leaf());
        let proof = tree.proof(0).expect("proof");
        assert!(proof.is_empty());
        assert!(verify_proof(&proof, &tree.root(), &entry.leaf()));
    }

    #[test]
    fn test_two_leaves() {
        let es = entries(2);
        let tree = RewardsTree::from_entries(&es);
        assert_eq!(tree.root(), hash_pair(&es[0].leaf(), &es[1].leaf()));
        assert_eq!(tree.proof(0).expect("proof"), vec![es[1].leaf()]);
    }

    #[test]
    fn test_all_proofs_verify_with_odd_layers() {
        // 6 leaves -> 3 nodes -> 2 nodes -> root
        let es = entries(6);
        let tree = RewardsTree::from_entries(&es);
        assert_eq!(tree.layers().len(), 4);
        for (i, entry) in es.iter().enumerate() {
            let proof = tree.proof(i).expect("proof");
            assert!(
                verify_proof(&proof, &tree.root(), &entry.leaf()),
                "proof for leaf {i} must verify"
            );
        }
    }

    #[test]
    fn test_duplicated_odd_node_is_own_sibling() {
        let es = entries(6);
        let tree = RewardsTree::from_entries(&es);
        let proof = tree.proof(4).expect("proof");
        assert_eq!(proof.len(), 3);
        assert_eq!(proof[0], es[5].leaf());
        assert_eq!(proof[1], tree.layers()[1][2]);
    }

    #[test]
    fn test_proof_rejects_wrong_leaf() {
        let es = entries(4);
        let tree = RewardsTree::from_entries(&es);
        let proof = tree.proof(0).expect("proof");
        assert!(!verify_proof(&proof, &tree.root(), &es[1].leaf()));

        let inflated = reward_leaf(&es[0].beneficiary, es[0].entitlement + 1);
        assert!(!verify_proof(&proof, &tree.root(), &inflated));
    }

    #[test]
    fn test_empty_proof_rejects_non_root_leaf() {
        let es = entries(2);
        let tree = RewardsTree::from_entries(&es);
        assert!(!verify_proof(&[], &tree.root(), &es[0].leaf()));
    }

    #[test]
    fn test_entry_json() {
        let json = r#"{"beneficiary":"0x1000000000000000000000000000000000000000","entitlement":10000}"#;
        let entry: RewardEntry = serde_json::from_str(json).expect("parse");
        assert_eq!(entry, entries(1)[0]);
    }
}
