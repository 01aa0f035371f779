//! Run state definitions for tracking pipeline progress
//!
//! A run moves forward through its phases exactly once. The only branch is
//! `Discovering -> Aborted` when category discovery fails.

use std::fmt;

/// Represents the current phase of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    // ===== Active States =====
    /// Enumerating the source's categories
    Discovering,

    /// Category workers are running
    Harvesting,

    /// Harvest finished, registry is being snapshotted
    Deduplicating,

    /// Batches are being sent to the ingestion endpoint
    Delivering,

    // ===== Terminal States =====
    /// The run went through delivery
    Done,

    /// Discovery failed and nothing was harvested
    Aborted,
}

impl RunState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if the run is still progressing
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns the single forward successor of an active state
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Discovering => Some(Self::Harvesting),
            Self::Harvesting => Some(Self::Deduplicating),
            Self::Deduplicating => Some(Self::Delivering),
            Self::Delivering => Some(Self::Done),
            Self::Done | Self::Aborted => None,
        }
    }

    /// Returns true if moving from `self` to `to` is allowed
    ///
    /// Transitions are monotonic: each active state may only advance to its
    /// successor, and only `Discovering` may abort.
    pub fn can_transition_to(&self, to: RunState) -> bool {
        if *self == Self::Discovering && to == Self::Aborted {
            return true;
        }
        self.next() == Some(to)
    }

    /// Short lowercase label used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovering => "discovering",
            Self::Harvesting => "harvesting",
            Self::Deduplicating => "deduplicating",
            Self::Delivering => "delivering",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    /// Returns all possible run states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Discovering,
            Self::Harvesting,
            Self::Deduplicating,
            Self::Delivering,
            Self::Done,
            Self::Aborted,
        ]
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
