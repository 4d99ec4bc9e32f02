//! Events emitted by the smoothing pool.
//!
//! Each successful state-changing call produces zero or more events in a
//! deterministic order. Failed calls produce none.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::hex::PrefixedHex;
use crate::{Address, Hash, Slot, ValidatorId, Wei};

/// All pool events.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    // Subscription events
    SubscribeValidator {
        #[serde_as(as = "PrefixedHex")]
        sender: Address,
        collateral: Wei,
        validator_id: ValidatorId,
    },
    UnsubscribeValidator {
        /// The address that paid the collateral, not the caller.
        #[serde_as(as = "PrefixedHex")]
        depositor: Address,
        validator_id: ValidatorId,
    },

    // Claim events
    ClaimRewards {
        #[serde_as(as = "PrefixedHex")]
        beneficiary: Address,
        #[serde_as(as = "PrefixedHex")]
        recipient: Address,
        amount: Wei,
    },
    SetRewardRecipient {
        #[serde_as(as = "PrefixedHex")]
        beneficiary: Address,
        #[serde_as(as = "PrefixedHex")]
        recipient: Address,
    },

    // Oracle events
    SubmitReport {
        slot: Slot,
        #[serde_as(as = "PrefixedHex")]
        rewards_root: Hash,
        #[serde_as(as = "PrefixedHex")]
        oracle_member: Address,
    },
    ReportConsolidated {
        slot: Slot,
        #[serde_as(as = "PrefixedHex")]
        rewards_root: Hash,
    },

    // Governance events
    AddOracleMember {
        #[serde_as(as = "PrefixedHex")]
        oracle_member: Address,
    },
    RemoveOracleMember {
        #[serde_as(as = "PrefixedHex")]
        oracle_member: Address,
    },
    UpdateQuorum {
        quorum: u32,
    },
    TransferGovernance {
        #[serde_as(as = "PrefixedHex")]
        new_pending_governance: Address,
    },
    AcceptGovernance {
        #[serde_as(as = "PrefixedHex")]
        new_governance: Address,
    },

    // Owner events
    InitSmoothingPool {
        slot: Slot,
    },
    UpdateSubscriptionCollateral {
        collateral: Wei,
    },
    UpdatePoolFee {
        pool_fee: u16,
    },
    UpdatePoolFeeRecipient {
        #[serde_as(as = "PrefixedHex")]
        pool_fee_recipient: Address,
    },
    UpdateCheckpointSlotSize {
        checkpoint_slot_size: u64,
    },
    OwnershipTransferred {
        #[serde_as(as = "PrefixedHex")]
        previous_owner: Address,
        #[serde_as(as = "PrefixedHex")]
        new_owner: Address,
    },

    // Treasury events
    EtherReceived {
        #[serde_as(as = "PrefixedHex")]
        sender: Address,
        amount: Wei,
    },
}

impl Event {
    /// The event name as it appears in the pool's ABI.
    pub fn name(&self) -> &'static str {
        match self {
            Event::SubscribeValidator { .. } => "SubscribeValidator",
            Event::UnsubscribeValidator { .. } => "UnsubscribeValidator",
            Event::ClaimRewards { .. } => "ClaimRewards",
            Event::SetRewardRecipient { .. } => "SetRewardRecipient",
            Event::SubmitReport { .. } => "SubmitReport",
            Event::ReportConsolidated { .. } => "ReportConsolidated",
            Event::AddOracleMember { .. } => "AddOracleMember",
            Event::RemoveOracleMember { .. } => "RemoveOracleMember",
            Event::UpdateQuorum { .. } => "UpdateQuorum",
            Event::TransferGovernance { .. } => "TransferGovernance",
            Event::AcceptGovernance { .. } => "AcceptGovernance",
            Event::InitSmoothingPool { .. } => "InitSmoothingPool",
            Event::UpdateSubscriptionCollateral { .. } => "UpdateSubscriptionCollateral",
            Event::UpdatePoolFee { .. } => "UpdatePoolFee",
            Event::UpdatePoolFeeRecipient { .. } => "UpdatePoolFeeRecipient",
            Event::UpdateCheckpointSlotSize { .. } => "UpdateCheckpointSlotSize",
            Event::OwnershipTransferred { .. } => "OwnershipTransferred",
            Event::EtherReceived { .. } => "EtherReceived",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = Event::ClaimRewards {
            beneficiary: [0x11; 20],
            recipient: [0x22; 20],
            amount: 10,
        };
        let value = serde_json::to_value(&event).expect("serialize");
        let body = &value["claim_rewards"];
        assert_eq!(body["beneficiary"], format!("0x{}", "11".repeat(20)));
        assert_eq!(body["amount"], 10);
    }

    #[test]
    fn test_event_roundtrip_large_amount() {
        let event = Event::EtherReceived {
            sender: [0x01; 20],
            amount: 100 * crate::WEI_PER_ETHER,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let parsed: Event = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, event);
        assert_eq!(parsed.name(), "EtherReceived");
    }
}
