//! # smoothing-pool
//!
//! Validator-reward smoothing pool state machine.
//!
//! Validators subscribe by depositing collateral, an oracle committee ratifies
//! periodic reward Merkle roots by quorum, and beneficiaries redeem their
//! cumulative entitlement against the canonical root with a Merkle proof.
//!
//! Every public operation on [`SmoothingPool`] behaves like a contract call:
//! it either completes and appends its events to the log, or fails and
//! leaves all state untouched.
//!
//! ## Modules
//!
//! - [`pool`]: The [`SmoothingPool`] facade and its call surface
//! - [`params`]: Owner-controlled economic parameters
//! - [`subscriptions`]: Validator subscription registry
//! - [`governance`]: Owner and two-step governance roles
//! - [`claims`]: Claimed-amount ledger and reward recipient overrides
//! - [`treasury`]: Pool balance
//! - [`transfer`]: Outbound value transfer seam
//! - [`events`]: Ordered event log
//! - [`config`]: TOML configuration of initial parameters

pub mod claims;
pub mod config;
pub mod events;
pub mod governance;
pub mod params;
pub mod pool;
pub mod subscriptions;
pub mod transfer;
pub mod treasury;

pub use pool::SmoothingPool;

use serde::{Deserialize, Serialize};
use smoothing_oracle::OracleError;
use smoothing_types::{Address, ValidatorId, Wei};

/// Caller identity and attached value of a single call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// The calling address.
    pub caller: Address,
    /// Native value attached to the call, in wei.
    pub value: Wei,
}

impl CallContext {
    /// A call from `caller` with no value attached.
    pub fn new(caller: Address) -> Self {
        Self { caller, value: 0 }
    }

    /// Attach `value` wei to the call.
    pub fn with_value(mut self, value: Wei) -> Self {
        self.value = value;
        self
    }
}

/// Coarse failure categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller lacks the required role.
    AccessDenied,
    /// An argument or attached value is out of range.
    InvalidParameter,
    /// The requested state already holds.
    AlreadyInState,
    /// The referenced entity does not exist or could not be authenticated.
    NotFound,
    /// The outbound value transfer was rejected.
    TransferFailed,
}

/// Error types for pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Caller is not the owner.
    #[error("caller is not the owner")]
    NotOwner,

    /// Caller is not the governance address.
    #[error("only governance")]
    NotGovernance,

    /// Caller is not the pending governance address.
    #[error("only pending governance")]
    NotPendingGovernance,

    /// The governance handoff was already completed.
    #[error("governance already accepted")]
    GovernanceAlreadyAccepted,

    /// Ownership cannot be transferred to the zero address.
    #[error("new owner is the zero address")]
    ZeroAddressOwner,

    /// Value was attached to a call that does not accept it.
    #[error("call is not payable: {0} wei attached")]
    NonPayable(Wei),

    /// Attached value does not equal the required collateral.
    #[error("msg.value does not equal subscription collateral: expected {expected}, got {actual}")]
    InvalidCollateral {
        /// Collateral required for this call.
        expected: Wei,
        /// Value attached.
        actual: Wei,
    },

    /// Pool fee exceeds 100%.
    #[error("pool fee cannot be greater than 100%: {0} bps")]
    FeeTooHigh(u16),

    /// Checkpoint slot size must be positive.
    #[error("checkpoint slot size cannot be 0")]
    CheckpointSlotSizeZero,

    /// Validator already has an active subscription.
    #[error("validator {0} already subscribed")]
    AlreadySubscribed(ValidatorId),

    /// Validator has no active subscription.
    #[error("validator {0} is not subscribed")]
    NotSubscribed(ValidatorId),

    /// Merkle proof does not authenticate the claim against the rewards root.
    #[error("invalid merkle proof")]
    InvalidProof,

    /// Cumulative entitlement is lower than what was already paid out.
    #[error("entitlement {entitlement} is below already claimed {claimed}")]
    EntitlementBelowClaimed {
        /// Entitlement in the claim.
        entitlement: Wei,
        /// Amount already paid to the beneficiary.
        claimed: Wei,
    },

    /// Outbound value transfer failed.
    #[error("eth transfer failed: {0}")]
    TransferFailed(String),

    /// Arithmetic overflow in balance accounting.
    #[error("arithmetic overflow")]
    Overflow,

    /// Oracle committee error.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl PoolError {
    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PoolError::NotOwner
            | PoolError::NotGovernance
            | PoolError::NotPendingGovernance
            | PoolError::Oracle(OracleError::NotAnOracleMember(_)) => ErrorKind::AccessDenied,

            PoolError::ZeroAddressOwner
            | PoolError::NonPayable(_)
            | PoolError::InvalidCollateral { .. }
            | PoolError::FeeTooHigh(_)
            | PoolError::CheckpointSlotSizeZero
            | PoolError::EntitlementBelowClaimed { .. }
            | PoolError::Overflow
            | PoolError::Oracle(
                OracleError::QuorumZero
                | OracleError::InvalidSlot { .. }
                | OracleError::IndexMismatch { .. }
                | OracleError::PoolNotInitialized,
            ) => ErrorKind::InvalidParameter,

            PoolError::GovernanceAlreadyAccepted
            | PoolError::AlreadySubscribed(_)
            | PoolError::Oracle(
                OracleError::AlreadyMember(_) | OracleError::AlreadyInitialized(_),
            ) => ErrorKind::AlreadyInState,

            PoolError::NotSubscribed(_)
            | PoolError::InvalidProof
            | PoolError::Oracle(OracleError::NotAMember(_)) => ErrorKind::NotFound,

            PoolError::TransferFailed(_) => ErrorKind::TransferFailed,
        }
    }
}

/// Convenience result type for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
