//! Validator subscription registry.
//!
//! A validator ID is either unsubscribed or held by exactly one subscription
//! recording who paid and how much. The collateral is not refunded on
//! unsubscribe; it stays in the pool.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use smoothing_types::hex::PrefixedHex;
use smoothing_types::{Address, ValidatorId, Wei};

use crate::{PoolError, Result};

/// An active subscription.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Address that paid the collateral.
    #[serde_as(as = "PrefixedHex")]
    pub depositor: Address,
    /// Collateral paid, in wei.
    #[serde_as(as = "DisplayFromStr")]
    pub collateral: Wei,
}

/// All active subscriptions keyed by validator ID.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: HashMap<ValidatorId, Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required payment for subscribing `count` validators at `collateral` each.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Overflow`] if the total does not fit in a [`Wei`]
    pub fn required_collateral(collateral: Wei, count: usize) -> Result<Wei> {
        Wei::try_from(count)
            .ok()
            .and_then(|n| collateral.checked_mul(n))
            .ok_or(PoolError::Overflow)
    }

    /// Subscribe every ID in `validator_ids` for `depositor`.
    ///
    /// All IDs are checked before any is recorded, so on error the registry
    /// is unchanged.
    ///
    /// # Errors
    ///
    /// - [`PoolError::AlreadySubscribed`] if an ID is already subscribed or
    ///   appears more than once in `validator_ids`
    pub fn subscribe(
        &mut self,
        depositor: Address,
        validator_ids: &[ValidatorId],
        collateral: Wei,
    ) -> Result<()> {
        for (i, id) in validator_ids.iter().enumerate() {
            if self.subscriptions.contains_key(id) || validator_ids[..i].contains(id) {
                return Err(PoolError::AlreadySubscribed(*id));
            }
        }

        for id in validator_ids {
            self.subscriptions.insert(
                *id,
                Subscription {
                    depositor,
                    collateral,
                },
            );
        }
        Ok(())
    }

    /// End the subscription of `validator_id`, returning it.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotSubscribed`] if the ID has no subscription
    pub fn unsubscribe(&mut self, validator_id: ValidatorId) -> Result<Subscription> {
        self.subscriptions
            .remove(&validator_id)
            .ok_or(PoolError::NotSubscribed(validator_id))
    }

    pub fn get(&self, validator_id: ValidatorId) -> Option<&Subscription> {
        self.subscriptions.get(&validator_id)
    }

    pub fn is_subscribed(&self, validator_id: ValidatorId) -> bool {
        self.subscriptions.contains_key(&validator_id)
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = [0xa1; 20];
    const BOB: Address = [0xb0; 20];

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut reg = SubscriptionRegistry::new();
        reg.subscribe(ALICE, &[7], 100).expect("subscribe");
        assert!(reg.is_subscribed(7));
        assert_eq!(
            reg.get(7),
            Some(&Subscription {
                depositor: ALICE,
                collateral: 100
            })
        );

        let sub = reg.unsubscribe(7).expect("unsubscribe");
        assert_eq!(sub.depositor, ALICE);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_already_subscribed_rejected() {
        let mut reg = SubscriptionRegistry::new();
        reg.subscribe(ALICE, &[7], 100).expect("subscribe");
        let err = reg.subscribe(BOB, &[7], 100).expect_err("duplicate");
        assert!(matches!(err, PoolError::AlreadySubscribed(7)));
        assert_eq!(reg.get(7).map(|s| s.depositor), Some(ALICE));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let mut reg = SubscriptionRegistry::new();
        reg.subscribe(ALICE, &[3], 100).expect("subscribe");

        let err = reg.subscribe(BOB, &[1, 2, 3], 100).expect_err("3 taken");
        assert!(matches!(err, PoolError::AlreadySubscribed(3)));
        assert_eq!(reg.len(), 1);

        let err = reg.subscribe(BOB, &[4, 5, 4], 100).expect_err("dup in batch");
        assert!(matches!(err, PoolError::AlreadySubscribed(4)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_unsubscribe_unknown() {
        let mut reg = SubscriptionRegistry::new();
        assert!(matches!(
            reg.unsubscribe(42),
            Err(PoolError::NotSubscribed(42))
        ));
    }

    #[test]
    fn test_required_collateral() {
        assert_eq!(SubscriptionRegistry::required_collateral(10, 3).expect("fits"), 30);
        assert_eq!(SubscriptionRegistry::required_collateral(10, 0).expect("fits"), 0);
        assert!(matches!(
            SubscriptionRegistry::required_collateral(Wei::MAX, 2),
            Err(PoolError::Overflow)
        ));
    }
}
