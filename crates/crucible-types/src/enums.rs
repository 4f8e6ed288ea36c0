//! Status and mode enumerations shared across the workspace.

use serde::{Deserialize, Serialize};

/// Whether an agent is currently emitting a given action.
///
/// Owned by the agent; mutated by agent behaviors and read by the
/// event-protocol restriction rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    /// The agent is performing the action.
    Emitting,
    /// The agent is not performing the action.
    NotEmitting,
}

impl core::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Emitting => write!(f, "emitting"),
            Self::NotEmitting => write!(f, "not emitting"),
        }
    }
}

/// The lifecycle phase of a stimulus applied to an agent.
///
/// A stimulation cycles `Absent -> Beginning -> Stable -> Ending -> Absent`.
/// The phase is owned by the agent and mutated only through stimulation
/// delivery in response to accepted protocol events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StimulationStatus {
    /// The stimulus is not being applied.
    Absent,
    /// The stimulus has just started being applied.
    Beginning,
    /// The stimulus is being applied steadily.
    Stable,
    /// The stimulus is ceasing to be applied.
    Ending,
}

impl StimulationStatus {
    /// The phase that follows this one in the stimulation cycle.
    pub const fn next_in_cycle(self) -> Self {
        match self {
            Self::Absent => Self::Beginning,
            Self::Beginning => Self::Stable,
            Self::Stable => Self::Ending,
            Self::Ending => Self::Absent,
        }
    }
}

impl core::fmt::Display for StimulationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Beginning => write!(f, "beginning"),
            Self::Stable => write!(f, "stable"),
            Self::Ending => write!(f, "ending"),
        }
    }
}

/// How a simulation run is being driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// The simulation chooses its own course through the coordination
    /// structure (e.g. plain runs, random exploration).
    Exploration,
    /// The simulation is driven externally by a verification engine; the
    /// environment applies only the stimulation buffered for it.
    Verification,
}

impl core::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Exploration => write!(f, "exploration"),
            Self::Verification => write!(f, "verification"),
        }
    }
}

/// How the states of a simulation run are retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    /// Keep full snapshots.
    Full,
    /// Keep only fossilized projections.
    Fossilized,
    /// Keep nothing; only track the position.
    None,
}

impl core::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Fossilized => write!(f, "fossilized"),
            Self::None => write!(f, "none"),
        }
    }
}
