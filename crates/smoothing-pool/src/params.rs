//! Owner-controlled economic parameters.
//!
//! The pool fee is expressed in basis points and consumed off-chain by the
//! oracle when it builds reward trees. The checkpoint slot size determines
//! which slots oracle reports may target.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use smoothing_types::hex::PrefixedHex;
use smoothing_types::{Address, Wei, MAX_POOL_FEE_BPS};

use crate::{PoolError, Result};

/// Current parameter values.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolParameters {
    /// Collateral required per subscribed validator, in wei.
    #[serde_as(as = "DisplayFromStr")]
    subscription_collateral: Wei,
    /// Pool fee in basis points, at most 10000.
    pool_fee: u16,
    /// Receiver of the pool fee share.
    #[serde_as(as = "PrefixedHex")]
    pool_fee_recipient: Address,
    /// Slots between admissible report slots.
    checkpoint_slot_size: u64,
}

impl PoolParameters {
    /// Validate and assemble a parameter set.
    ///
    /// # Errors
    ///
    /// - [`PoolError::FeeTooHigh`] if `pool_fee` exceeds 10000
    /// - [`PoolError::CheckpointSlotSizeZero`] if `checkpoint_slot_size` is 0
    pub fn new(
        subscription_collateral: Wei,
        pool_fee: u16,
        pool_fee_recipient: Address,
        checkpoint_slot_size: u64,
    ) -> Result<Self> {
        check_pool_fee(pool_fee)?;
        check_checkpoint_slot_size(checkpoint_slot_size)?;
        Ok(Self {
            subscription_collateral,
            pool_fee,
            pool_fee_recipient,
            checkpoint_slot_size,
        })
    }

    pub fn subscription_collateral(&self) -> Wei {
        self.subscription_collateral
    }

    pub fn pool_fee(&self) -> u16 {
        self.pool_fee
    }

    pub fn pool_fee_recipient(&self) -> Address {
        self.pool_fee_recipient
    }

    pub fn checkpoint_slot_size(&self) -> u64 {
        self.checkpoint_slot_size
    }

    /// Any collateral value is accepted, including zero.
    pub fn set_subscription_collateral(&mut self, collateral: Wei) {
        self.subscription_collateral = collateral;
    }

    /// # Errors
    ///
    /// - [`PoolError::FeeTooHigh`] if `pool_fee` exceeds 10000
    pub fn set_pool_fee(&mut self, pool_fee: u16) -> Result<()> {
        check_pool_fee(pool_fee)?;
        self.pool_fee = pool_fee;
        Ok(())
    }

    pub fn set_pool_fee_recipient(&mut self, recipient: Address) {
        self.pool_fee_recipient = recipient;
    }

    /// # Errors
    ///
    /// - [`PoolError::CheckpointSlotSizeZero`] if `size` is 0
    pub fn set_checkpoint_slot_size(&mut self, size: u64) -> Result<()> {
        check_checkpoint_slot_size(size)?;
        self.checkpoint_slot_size = size;
        Ok(())
    }
}

fn check_pool_fee(pool_fee: u16) -> Result<()> {
    if pool_fee > MAX_POOL_FEE_BPS {
        return Err(PoolError::FeeTooHigh(pool_fee));
    }
    Ok(())
}

fn check_checkpoint_slot_size(size: u64) -> Result<()> {
    if size == 0 {
        return Err(PoolError::CheckpointSlotSizeZero);
    }
    Ok(())
}
