//! Outbound value transfers.
//!
//! Claims pay out through a [`ValueTransfer`] implementation supplied by the
//! caller. A rejected transfer aborts the claim and rolls its effects back.

use std::collections::{HashMap, HashSet};

use smoothing_types::{Address, Wei};

/// The receiving side refused a transfer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("transfer to {recipient} rejected: {reason}")]
pub struct TransferRejected {
    /// Hex-encoded recipient.
    pub recipient: String,
    pub reason: String,
}

/// Sends native value out of the pool.
pub trait ValueTransfer {
    /// Deliver `amount` wei to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferRejected`] if the recipient does not accept the value.
    fn send_value(&mut self, to: &Address, amount: Wei) -> Result<(), TransferRejected>;
}

/// In-memory account balances, for simulations and tests.
///
/// Addresses registered with [`Self::reject_from`] refuse every transfer.
#[derive(Clone, Debug, Default)]
pub struct AccountBook {
    balances: HashMap<Address, Wei>,
    rejecting: HashSet<Address>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &Address) -> Wei {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Make `account` refuse incoming transfers.
    pub fn reject_from(&mut self, account: Address) {
        self.rejecting.insert(account);
    }

    /// Let `account` accept incoming transfers again.
    pub fn accept_from(&mut self, account: &Address) {
        self.rejecting.remove(account);
    }
}

impl ValueTransfer for AccountBook {
    fn send_value(&mut self, to: &Address, amount: Wei) -> Result<(), TransferRejected> {
        if self.rejecting.contains(to) {
            return Err(TransferRejected {
                recipient: smoothing_types::address_hex(to),
                reason: "recipient refuses value".into(),
            });
        }
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = balance.checked_add(amount).ok_or_else(|| TransferRejected {
            recipient: smoothing_types::address_hex(to),
            reason: "recipient balance overflow".into(),
        })?;
        Ok(())
    }
}
