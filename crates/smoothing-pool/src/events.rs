//! Ordered event log.
//!
//! Every successful operation appends its events in emission order under a
//! monotonically increasing sequence number. Readers resume from the last
//! sequence they saw with [`EventLog::since`].

use serde::{Deserialize, Serialize};
use smoothing_types::events::Event;

/// An event with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Starts at 1.
    pub sequence: u64,
    pub event: Event,
}

/// Coarse grouping of events by the pool area that emits them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Subscription,
    Claim,
    Oracle,
    Governance,
    Owner,
    Treasury,
}

impl EventCategory {
    /// Category of `event`.
    pub fn of(event: &Event) -> Self {
        match event {
            Event::SubscribeValidator { .. } | Event::UnsubscribeValidator { .. } => {
                EventCategory::Subscription
            }
            Event::ClaimRewards { .. } | Event::SetRewardRecipient { .. } => EventCategory::Claim,
            Event::SubmitReport { .. } | Event::ReportConsolidated { .. } => EventCategory::Oracle,
            Event::AddOracleMember { .. }
            | Event::RemoveOracleMember { .. }
            | Event::UpdateQuorum { .. }
            | Event::TransferGovernance { .. }
            | Event::AcceptGovernance { .. } => EventCategory::Governance,
            Event::InitSmoothingPool { .. }
            | Event::UpdateSubscriptionCollateral { .. }
            | Event::UpdatePoolFee { .. }
            | Event::UpdatePoolFeeRecipient { .. }
            | Event::UpdateCheckpointSlotSize { .. }
            | Event::OwnershipTransferred { .. } => EventCategory::Owner,
            Event::EtherReceived { .. } => EventCategory::Treasury,
        }
    }
}

/// Append-only log of pool events.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append events from one completed operation.
    pub fn emit_all(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            let sequence = self.sequence() + 1;
            tracing::trace!(sequence, event = event.name(), "event emitted");
            self.records.push(EventRecord { sequence, event });
        }
    }

    /// Sequence number of the latest event, or 0 when empty.
    pub fn sequence(&self) -> u64 {
        self.records.last().map_or(0, |r| r.sequence)
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with a sequence number greater than `sequence`.
    pub fn since(&self, sequence: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.sequence <= sequence);
        &self.records[start..]
    }

    /// Events of one category, in order.
    pub fn by_category(&self, category: EventCategory) -> impl Iterator<Item = &Event> + '_ {
        self.records
            .iter()
            .map(|r| &r.event)
            .filter(move |e| EventCategory::of(e) == category)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
