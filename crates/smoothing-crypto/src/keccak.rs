//! Keccak-256 hashing over packed encodings.
//!
//! ## Encodings
//!
//! - Report hash: `keccak256(slot_be8 || rewards_root)`
//! - Reward leaf: `keccak256(beneficiary || entitlement_be32)`
//! - Inner node: `keccak256(min(a, b) || max(a, b))`

use sha3::{Digest, Keccak256};
use smoothing_types::{Address, Hash, Slot, Wei};

/// Compute the Keccak-256 hash of the input data.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash the concatenation of several byte slices without an intermediate buffer.
pub fn keccak256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Content hash of a `(slot, rewards_root)` pair. This is the unit oracle
/// members vote on.
pub fn report_hash(slot: Slot, rewards_root: &Hash) -> Hash {
    keccak256_concat(&[&slot.to_be_bytes(), rewards_root])
}

/// Merkle leaf for a beneficiary's cumulative entitlement.
///
/// The entitlement is left-padded to 32 bytes to match a packed `uint256`.
pub fn reward_leaf(beneficiary: &Address, entitlement: Wei) -> Hash {
    let mut amount = [0u8; 32];
    amount[16..].copy_from_slice(&entitlement.to_be_bytes());
    keccak256_concat(&[beneficiary, &amount])
}

/// Hash two sibling nodes in sorted order, so proofs carry no direction bits.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    if a <= b {
        keccak256_concat(&[a, b])
    } else {
        keccak256_concat(&[b, a])
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            keccak256(b""),
            hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn test_keccak_abc() {
        assert_eq!(
            keccak256(b"abc"),
            hex!("4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45")
        );
    }

    #[test]
    fn test_concat_matches_single_buffer() {
        let joined = keccak256(b"helloworld");
        assert_eq!(keccak256_concat(&[b"hello".as_slice(), b"world".as_slice()]), joined);
    }

    #[test]
    fn test_report_hash_packing() {
        let root = [0xAB; 32];
        let mut packed = Vec::with_capacity(40);
        packed.extend_from_slice(&14_400u64.to_be_bytes());
        packed.extend_from_slice(&root);
        assert_eq!(report_hash(14_400, &root), keccak256(&packed));
    }

    #[test]
    fn test_report_hash_distinguishes_inputs() {
        let root = [0x01; 32];
        assert_ne!(report_hash(7200, &root), report_hash(14_400, &root));
        assert_ne!(report_hash(7200, &root), report_hash(7200, &[0x02; 32]));
    }

    #[test]
    fn test_reward_leaf_packing() {
        let addr = [0x10; 20];
        let mut packed = Vec::with_capacity(52);
        packed.extend_from_slice(&addr);
        packed.extend_from_slice(&[0u8; 31]);
        packed.push(42);
        assert_eq!(reward_leaf(&addr, 42), keccak256(&packed));
    }

    #[test]
    fn test_hash_pair_is_commutative() {
        let a = keccak256(b"a");
        let b = keccak256(b"b");
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
        assert_ne!(hash_pair(&a, &b), hash_pair(&a, &a));
    }
}
