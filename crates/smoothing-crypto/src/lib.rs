//! # smoothing-crypto
//!
//! Hashing and Merkle primitives for the smoothing pool.
//!
//! All hashing is Ethereum-flavoured Keccak-256 over packed encodings, so
//! roots and proofs produced here interoperate with off-chain tooling that
//! uses `solidityKeccak256` and sorted-pair Merkle trees.
//!
//! ## Modules
//!
//! - [`keccak`]: Keccak-256 and the packed report/leaf encodings
//! - [`merkle`]: Sorted-pair Merkle tree construction and proof verification

pub mod keccak;
pub mod merkle;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// A leaf index outside the tree was requested.
    #[error("leaf index {index} out of range for tree with {leaves} leaves")]
    LeafOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of leaves in the tree.
        leaves: usize,
    },

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
