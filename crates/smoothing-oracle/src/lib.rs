//! # smoothing-oracle
//!
//! Oracle committee and quorum consensus over reward snapshots.
//!
//! Oracle members vote on `(slot, rewards_root)` pairs. Each member has at
//! most one outstanding vote; once a quorum of current members supports the
//! same pair for a valid checkpoint slot, that root becomes canonical.
//!
//! ## Modules
//!
//! - [`members`]: Enumerable member set with O(1) swap-and-pop removal
//! - [`consensus`]: Vote tracking, report tallies and consolidation

pub mod consensus;
pub mod members;

use smoothing_types::Slot;

/// Error types for oracle operations.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Address is already an oracle member.
    #[error("already oracle member: {0}")]
    AlreadyMember(String),

    /// Address was not an oracle member.
    #[error("was not an oracle member: {0}")]
    NotAMember(String),

    /// Supplied index does not match the member's current position.
    #[error("oracle member index does not match: supplied {supplied}, actual {actual}")]
    IndexMismatch {
        /// Index supplied by the caller.
        supplied: usize,
        /// Member's current index.
        actual: usize,
    },

    /// Caller is not an oracle member.
    #[error("not an oracle member: {0}")]
    NotAnOracleMember(String),

    /// Quorum must be at least one.
    #[error("quorum cannot be 0")]
    QuorumZero,

    /// Reports cannot be submitted before the start slot is set.
    #[error("smoothing pool not initialized")]
    PoolNotInitialized,

    /// Start slot was already set.
    #[error("smoothing pool already initialized at slot {0}")]
    AlreadyInitialized(Slot),

    /// Slot is zero, not on a checkpoint boundary, or not advancing.
    #[error("invalid slot {slot}: {reason}")]
    InvalidSlot {
        /// The rejected slot.
        slot: Slot,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Convenience result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
