//! Owner and governance roles.
//!
//! Two independent roles guard the pool. The owner tunes economic parameters
//! and may hand ownership over in a single step. Governance manages the
//! oracle committee and is handed over in two steps: the current governance
//! nominates a candidate, and only that candidate can accept.

use smoothing_types::{Address, ZERO_ADDRESS};

use crate::{PoolError, Result};

/// Role holders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roles {
    owner: Address,
    governance: Address,
    pending_governance: Option<Address>,
}

impl Roles {
    pub fn new(owner: Address, governance: Address) -> Self {
        Self {
            owner,
            governance,
            pending_governance: None,
        }
    }

    /// Current owner; the zero address after renouncement.
    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn governance(&self) -> Address {
        self.governance
    }

    /// Nominated governance, or the zero address when none is pending.
    pub fn pending_governance(&self) -> Address {
        self.pending_governance.unwrap_or(ZERO_ADDRESS)
    }

    /// # Errors
    ///
    /// - [`PoolError::NotOwner`] if `caller` is not the owner
    pub fn ensure_owner(&self, caller: &Address) -> Result<()> {
        // A renounced pool has no owner; nobody may act as the zero address.
        if self.owner == ZERO_ADDRESS || *caller != self.owner {
            return Err(PoolError::NotOwner);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// - [`PoolError::NotGovernance`] if `caller` is not governance
    pub fn ensure_governance(&self, caller: &Address) -> Result<()> {
        if *caller != self.governance {
            return Err(PoolError::NotGovernance);
        }
        Ok(())
    }

    /// Nominate `candidate` as the next governance, replacing any earlier
    /// nomination.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotGovernance`] if `caller` is not governance
    pub fn transfer_governance(&mut self, caller: &Address, candidate: Address) -> Result<()> {
        self.ensure_governance(caller)?;
        self.pending_governance = Some(candidate);
        Ok(())
    }

    /// Complete the handoff to the nominated candidate.
    ///
    /// # Errors
    ///
    /// - [`PoolError::GovernanceAlreadyAccepted`] if nothing is pending and
    ///   `caller` already holds governance
    /// - [`PoolError::NotPendingGovernance`] if `caller` is not the candidate
    pub fn accept_governance(&mut self, caller: &Address) -> Result<()> {
        match self.pending_governance {
            Some(candidate) if candidate == *caller => {
                self.governance = candidate;
                self.pending_governance = None;
                Ok(())
            }
            None if *caller == self.governance => Err(PoolError::GovernanceAlreadyAccepted),
            _ => Err(PoolError::NotPendingGovernance),
        }
    }

    /// Hand ownership to `new_owner`, returning the previous owner.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotOwner`] if `caller` is not the owner
    /// - [`PoolError::ZeroAddressOwner`] if `new_owner` is the zero address
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<Address> {
        self.ensure_owner(caller)?;
        if new_owner == ZERO_ADDRESS {
            return Err(PoolError::ZeroAddressOwner);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }

    /// Give up ownership permanently, returning the previous owner.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotOwner`] if `caller` is not the owner
    pub fn renounce_ownership(&mut self, caller: &Address) -> Result<Address> {
        self.ensure_owner(caller)?;
        Ok(std::mem::replace(&mut self.owner, ZERO_ADDRESS))
    }
}
