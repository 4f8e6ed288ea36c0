//! Per-round trace safeguards.
//!
//! Within one synchronization round (between two `commit` events), at most
//! one stimulation-phase transition may be scheduled per (agent, stimulus)
//! pair, and at most one action transition per (agent, action) pair. The
//! safeguard sets record what has already been scheduled this round; they
//! are cleared exactly when a `commit` is scheduled.
//!
//! Search algorithms fork the safeguards per explored branch, so the type
//! is cheaply cloneable.

use std::collections::BTreeSet;

use crucible_types::{AgentAction, AgentId, Stimulus};

/// The safeguard sets of the current synchronization round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSafeguards {
    stimulation: BTreeSet<(AgentId, Stimulus)>,
    action: BTreeSet<(AgentId, AgentAction)>,
}

impl TraceSafeguards {
    /// Create empty safeguard sets.
    pub const fn new() -> Self {
        Self {
            stimulation: BTreeSet::new(),
            action: BTreeSet::new(),
        }
    }

    /// Record that a stimulation-phase transition was scheduled for the
    /// given (agent, stimulus) pair this round.
    pub fn put_stimulation(&mut self, agent: AgentId, stimulus: Stimulus) {
        self.stimulation.insert((agent, stimulus));
    }

    /// Whether a stimulation-phase transition is already scheduled for the
    /// given (agent, stimulus) pair this round.
    pub fn has_stimulation(&self, agent: AgentId, stimulus: &Stimulus) -> bool {
        self.stimulation.contains(&(agent, stimulus.clone()))
    }

    /// Record that an action transition was scheduled for the given
    /// (agent, action) pair this round.
    pub fn put_action(&mut self, agent: AgentId, action: AgentAction) {
        self.action.insert((agent, action));
    }

    /// Whether an action transition is already scheduled for the given
    /// (agent, action) pair this round.
    pub fn has_action(&self, agent: AgentId, action: &AgentAction) -> bool {
        self.action.contains(&(agent, action.clone()))
    }

    /// Clear both safeguard sets; the start of a new round.
    pub fn clear(&mut self) {
        self.stimulation.clear();
        self.action.clear();
    }

    /// Whether nothing has been scheduled this round.
    pub fn is_empty(&self) -> bool {
        self.stimulation.is_empty() && self.action.is_empty()
    }
}
