//! Pool balance.
//!
//! Value enters through subscriptions and plain transfers and leaves only
//! through reward claims.

use smoothing_types::Wei;

use crate::{PoolError, Result};

/// Native balance held by the pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Treasury {
    balance: Wei,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> Wei {
        self.balance
    }

    /// # Errors
    ///
    /// - [`PoolError::Overflow`] if the balance would exceed [`Wei::MAX`]
    pub fn credit(&mut self, amount: Wei) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        Ok(())
    }

    /// # Errors
    ///
    /// - [`PoolError::TransferFailed`] if the pool holds less than `amount`
    pub fn debit(&mut self, amount: Wei) -> Result<()> {
        self.balance = self.balance.checked_sub(amount).ok_or_else(|| {
            PoolError::TransferFailed(format!(
                "insufficient pool balance: {} < {amount}",
                self.balance
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_and_debit() {
        let mut t = Treasury::new();
        t.credit(10).expect("credit");
        t.debit(4).expect("debit");
        assert_eq!(t.balance(), 6);
    }

    #[test]
    fn test_overdraw_fails_without_change() {
        let mut t = Treasury::new();
        t.credit(3).expect("credit");
        let err = t.debit(4).expect_err("overdraw");
        assert!(matches!(err, PoolError::TransferFailed(_)));
        assert_eq!(t.balance(), 3);
    }

    #[test]
    fn test_credit_overflow() {
        let mut t = Treasury::new();
        t.credit(Wei::MAX).expect("credit");
        assert!(matches!(t.credit(1), Err(PoolError::Overflow)));
        assert_eq!(t.balance(), Wei::MAX);
    }
}
