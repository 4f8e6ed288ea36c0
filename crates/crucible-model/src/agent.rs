//! Agent controls, behaviors, and the roster.
//!
//! An [`AgentControl`] is the simulator's handle on one agent: its identity,
//! its action-emission and stimulation-lifecycle state, and the pluggable
//! [`AgentBehavior`] that reacts each step. Behaviors come from the
//! component registry; the protocol layer mutates the stimulation state
//! through [`AgentBody::receive_stimulus`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crucible_types::{ActionStatus, AgentAction, AgentId, StimulationStatus, Stimulus};

use crate::error::InstantiationError;

/// The identity and observable state of one agent.
///
/// Separated from the behavior so a behavior can mutate its own agent's
/// state without borrowing itself.
#[derive(Debug, Clone)]
pub struct AgentBody {
    id: AgentId,
    name: String,
    possible_actions: BTreeSet<AgentAction>,
    possible_stimuli: BTreeSet<Stimulus>,
    action_status: BTreeMap<AgentAction, ActionStatus>,
    stimulation: BTreeMap<Stimulus, StimulationStatus>,
}

impl AgentBody {
    /// Create a body with every action not emitting and every stimulus
    /// absent.
    pub fn new(
        id: AgentId,
        name: impl Into<String>,
        possible_actions: BTreeSet<AgentAction>,
        possible_stimuli: BTreeSet<Stimulus>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            possible_actions,
            possible_stimuli,
            action_status: BTreeMap::new(),
            stimulation: BTreeMap::new(),
        }
    }

    /// The agent's unique id.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// The agent's user-friendly name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The actions this agent may perform.
    pub const fn possible_actions(&self) -> &BTreeSet<AgentAction> {
        &self.possible_actions
    }

    /// The stimuli this agent may receive.
    pub const fn possible_stimuli(&self) -> &BTreeSet<Stimulus> {
        &self.possible_stimuli
    }

    /// The current emission status of an action.
    ///
    /// Actions never set default to [`ActionStatus::NotEmitting`].
    pub fn action_status(&self, action: &AgentAction) -> ActionStatus {
        self.action_status
            .get(action)
            .copied()
            .unwrap_or(ActionStatus::NotEmitting)
    }

    /// Set the emission status of an action.
    pub fn set_action_status(&mut self, action: AgentAction, status: ActionStatus) {
        self.action_status.insert(action, status);
    }

    /// The current lifecycle phase of a stimulus.
    ///
    /// Stimuli never delivered default to [`StimulationStatus::Absent`].
    pub fn stimulation_status(&self, stimulus: &Stimulus) -> StimulationStatus {
        self.stimulation
            .get(stimulus)
            .copied()
            .unwrap_or(StimulationStatus::Absent)
    }

    /// Apply a stimulation phase to this agent.
    ///
    /// The coordination engine owns the phase ordering; a delivery that
    /// skips ahead in the cycle is applied anyway, but logged.
    pub fn receive_stimulus(&mut self, stimulus: Stimulus, status: StimulationStatus) {
        let current = self.stimulation_status(&stimulus);
        if status != current && status != current.next_in_cycle() {
            warn!(
                agent = %self.id,
                %stimulus,
                from = %current,
                to = %status,
                "Stimulation phase jump"
            );
        }
        self.stimulation.insert(stimulus, status);
    }

    /// The stimuli currently in the given phase.
    pub fn stimuli_in_phase(&self, phase: StimulationStatus) -> Vec<&Stimulus> {
        if phase == StimulationStatus::Absent {
            // Stimuli never delivered are absent too.
            self.possible_stimuli
                .iter()
                .filter(|s| self.stimulation_status(s) == StimulationStatus::Absent)
                .collect()
        } else {
            self.stimulation
                .iter()
                .filter(|(_, p)| **p == phase)
                .map(|(s, _)| s)
                .collect()
        }
    }
}

impl core::fmt::Display for AgentBody {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Agent '{}' ({})", self.name, self.id)?;
        let emitting: Vec<&str> = self
            .action_status
            .iter()
            .filter(|(_, s)| **s == ActionStatus::Emitting)
            .map(|(a, _)| a.name())
            .collect();
        write!(f, " emitting [{}]", emitting.join(", "))?;
        let stimulated: Vec<String> = self
            .stimulation
            .iter()
            .filter(|(_, p)| **p != StimulationStatus::Absent)
            .map(|(s, p)| format!("{} = {p}", s.name()))
            .collect();
        write!(f, " stimulation [{}]", stimulated.join(", "))
    }
}

/// The per-step hook of an agent.
///
/// Implementations update their agent's internal state as if one time unit
/// has passed; the roster invokes them in snapshot order. Behaviors must be
/// clone-boxable so snapshots can deep-clone.
pub trait AgentBehavior: Send + Sync + core::fmt::Debug {
    /// Advance the agent by one time unit.
    fn step(&mut self, body: &mut AgentBody);

    /// Clone this behavior into a fresh box.
    fn clone_box(&self) -> Box<dyn AgentBehavior>;
}

impl Clone for Box<dyn AgentBehavior> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A behavior that does nothing each step.
#[derive(Debug, Clone, Copy, Default)]
pub struct InertBehavior;

impl AgentBehavior for InertBehavior {
    fn step(&mut self, _body: &mut AgentBody) {}

    fn clone_box(&self) -> Box<dyn AgentBehavior> {
        Box::new(*self)
    }
}

/// The simulator's handle on one agent.
#[derive(Debug, Clone)]
pub struct AgentControl {
    body: AgentBody,
    behavior: Box<dyn AgentBehavior>,
}

impl AgentControl {
    /// Create a control for the given body and behavior.
    pub const fn new(body: AgentBody, behavior: Box<dyn AgentBehavior>) -> Self {
        Self { body, behavior }
    }

    /// The agent's unique id.
    pub const fn id(&self) -> AgentId {
        self.body.id()
    }

    /// The agent's observable state.
    pub const fn body(&self) -> &AgentBody {
        &self.body
    }

    /// The agent's observable state, mutably.
    pub const fn body_mut(&mut self) -> &mut AgentBody {
        &mut self.body
    }

    /// Instruct the agent to update its internal state as if one time
    /// unit has passed.
    pub fn step(&mut self) {
        self.behavior.step(&mut self.body);
    }
}

impl core::fmt::Display for AgentControl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.body)
    }
}

/// The ordered sequence of agent controls of one snapshot.
///
/// Order is the stepping order; ids are unique within a roster.
#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    agents: Vec<AgentControl>,
}

impl AgentRoster {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self { agents: Vec::new() }
    }

    /// Append an agent to the roster.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiationError::DuplicateAgent`] if an agent with the
    /// same id is already present.
    pub fn push(&mut self, agent: AgentControl) -> Result<(), InstantiationError> {
        if self.get(agent.id()).is_some() {
            return Err(InstantiationError::DuplicateAgent(agent.id()));
        }
        self.agents.push(agent);
        Ok(())
    }

    /// Look up an agent by id.
    pub fn get(&self, id: AgentId) -> Option<&AgentControl> {
        self.agents.iter().find(|a| a.id() == id)
    }

    /// Look up an agent by id, mutably.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut AgentControl> {
        self.agents.iter_mut().find(|a| a.id() == id)
    }

    /// Iterate the agents in stepping order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentControl> {
        self.agents.iter()
    }

    /// Iterate the agents in stepping order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AgentControl> {
        self.agents.iter_mut()
    }

    /// The agent ids in stepping order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(AgentControl::id).collect()
    }

    /// The number of agents.
    pub const fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the roster is empty.
    pub const fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
