//! Oracle report and vote records.

use serde::{Deserialize, Serialize};

use crate::{Hash, Slot, INITIAL_REPORT_HASH};

/// Tally for a single report hash.
///
/// A report that has never been voted on, or whose votes were all withdrawn,
/// or which was consolidated, reads as `Report::default()` (slot 0, votes 0).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Checkpoint slot the report covers.
    pub slot: Slot,
    /// Number of current oracle members whose vote points at this report.
    pub votes: u32,
}

/// The report an oracle member currently supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    /// Member has not voted since joining.
    Unvoted,
    /// Member supports the report with this hash.
    VotedFor(Hash),
}

impl Vote {
    /// The hash exposed by the `addressToVotedReportHash`-style accessor.
    pub fn as_report_hash(&self) -> Hash {
        match self {
            Vote::Unvoted => INITIAL_REPORT_HASH,
            Vote::VotedFor(hash) => *hash,
        }
    }

    /// The hash this vote points at, if any.
    pub fn target(&self) -> Option<&Hash> {
        match self {
            Vote::Unvoted => None,
            Vote::VotedFor(hash) => Some(hash),
        }
    }
}
