//! The environment capability and its implementations.
//!
//! An environment owns the rules coordinating the agents of a snapshot. It
//! is stepped by the runner before any agent updates, because it may need
//! to finalize pending deliveries first. Two implementations ship:
//!
//! - [`BasicEnvironment`] -- endogenous coordination only; the agents act,
//!   the environment does nothing per step.
//! - [`CoordinatedEnvironment`] -- exogenous coordination against an
//!   external transition system, with a stimulation buffer filled by the
//!   verification connector (or by its own path choice in exploration
//!   mode).

use rand::Rng;
use tracing::debug;

use crucible_protocol::{
    AgentTransitionSystem, ContextView, ProtocolEvent, TraceSafeguards, TsStateId,
};
use crucible_types::{
    ActionStatus, AgentAction, AgentId, ExecutionMode, StimulationStatus, Stimulus,
};

use crate::agent::AgentRoster;
use crate::error::EnvironmentError;

/// The coordination rules of a snapshot.
///
/// Environments are deep-cloned with their snapshot via [`clone_box`];
/// implementations holding a transition-system handle share it across
/// clones (the handle is immutable by contract).
///
/// [`clone_box`]: Environment::clone_box
pub trait Environment: Send + Sync + core::fmt::Debug {
    /// The environment's user-friendly name.
    fn name(&self) -> &str;

    /// Advance the environment by one time unit, before any agent update.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when a buffered delivery addresses an
    /// unknown agent or the coordination structure fails.
    fn step(&mut self, mode: ExecutionMode, agents: &mut AgentRoster)
    -> Result<(), EnvironmentError>;

    /// Buffer a stimulation for delivery on the next step.
    ///
    /// # Errors
    ///
    /// The default implementation reports the capability as unsupported.
    fn deliver_stimulation(
        &mut self,
        agent: AgentId,
        stimulus: Stimulus,
        status: StimulationStatus,
    ) -> Result<(), EnvironmentError> {
        let _ = (agent, stimulus, status);
        Err(EnvironmentError::UnsupportedCapability {
            capability: "stimulation delivery",
        })
    }

    /// The transition system coordinating this environment, if any.
    ///
    /// Verification strategies require `Some`; the default is `None`.
    fn transition_system(&self) -> Option<AgentTransitionSystem> {
        None
    }

    /// Clone this environment into a fresh box.
    fn clone_box(&self) -> Box<dyn Environment>;
}

impl Clone for Box<dyn Environment> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An environment with endogenous coordination only.
#[derive(Debug, Clone)]
pub struct BasicEnvironment {
    name: String,
}

impl BasicEnvironment {
    /// Create a basic environment.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Environment for BasicEnvironment {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(
        &mut self,
        mode: ExecutionMode,
        _agents: &mut AgentRoster,
    ) -> Result<(), EnvironmentError> {
        debug!(environment = %self.name, %mode, "Environment step (endogenous)");
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Environment> {
        Box::new(self.clone())
    }
}

/// A [`ContextView`] over a roster, used while walking the transition
/// system in exploration mode.
struct RosterContext<'a> {
    agents: &'a AgentRoster,
}

impl ContextView for RosterContext<'_> {
    fn action_status(&self, agent: AgentId, action: &AgentAction) -> Option<ActionStatus> {
        self.agents
            .get(agent)
            .map(|control| control.body().action_status(action))
    }
}

/// How many transition-system events one exploration step may traverse
/// while looking for a commit.
const MAX_PATH_EVENTS_PER_STEP: usize = 64;

/// An environment coordinated exogenously by an external transition
/// system.
#[derive(Debug, Clone)]
pub struct CoordinatedEnvironment {
    name: String,
    ts: AgentTransitionSystem,
    /// Stimulation to deliver at the next step: (target agent, stimulus,
    /// phase).
    buffer: Vec<(AgentId, Stimulus, StimulationStatus)>,
    /// The exploration cursor into the transition system.
    cursor: Option<TsStateId>,
    /// The exploration walk's safeguards for the current round.
    safeguards: TraceSafeguards,
}

impl CoordinatedEnvironment {
    /// Create a coordinated environment over the given transition system.
    pub fn new(name: impl Into<String>, ts: AgentTransitionSystem) -> Self {
        Self {
            name: name.into(),
            ts,
            buffer: Vec::new(),
            cursor: None,
            safeguards: TraceSafeguards::new(),
        }
    }

    /// Deliver everything buffered, clearing the buffer for the next
    /// round.
    fn drain_buffer(&mut self, agents: &mut AgentRoster) -> Result<(), EnvironmentError> {
        for (agent_id, stimulus, status) in self.buffer.drain(..) {
            let agent = agents
                .get_mut(agent_id)
                .ok_or(EnvironmentError::UnknownAgent(agent_id))?;
            agent.body_mut().receive_stimulus(stimulus, status);
        }
        Ok(())
    }

    /// Choose one course through the transition system, buffering the
    /// output stimulations encountered, until a commit closes the round
    /// (or no successor remains).
    fn choose_path(&mut self, agents: &AgentRoster) -> Result<(), EnvironmentError> {
        let mut cursor = self.cursor.unwrap_or_else(|| self.ts.initial_state());
        let context = RosterContext { agents };
        let mut rng = rand::rng();

        for _ in 0..MAX_PATH_EVENTS_PER_STEP {
            let successors = self.ts.successors(cursor, &context, &self.safeguards)?;
            if successors.is_empty() {
                debug!(environment = %self.name, state = %cursor, "No admissible successor");
                break;
            }

            let index = rng.random_range(0..successors.len());
            let Some((event, target)) = successors.into_iter().nth(index) else {
                break;
            };

            self.ts.event_scheduled(&event, &mut self.safeguards);
            self.buffer_if_stimulation(&event);
            cursor = target;

            if event.is_commit() {
                break;
            }
        }

        self.cursor = Some(cursor);
        Ok(())
    }

    /// Buffer the stimulation an output event carries, if any.
    fn buffer_if_stimulation(&mut self, event: &ProtocolEvent) {
        if let (Some(agent), Some(stimulus), Some(status)) =
            (event.agent(), event.stimulus_ref(), event.status())
        {
            self.buffer.push((agent, stimulus.clone(), status));
        }
    }
}

impl Environment for CoordinatedEnvironment {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(
        &mut self,
        mode: ExecutionMode,
        agents: &mut AgentRoster,
    ) -> Result<(), EnvironmentError> {
        match mode {
            ExecutionMode::Verification => {
                // Externally driven: apply only what was buffered for us.
                self.drain_buffer(agents)
            }
            ExecutionMode::Exploration => {
                self.choose_path(agents)?;
                self.drain_buffer(agents)
            }
        }
    }

    fn deliver_stimulation(
        &mut self,
        agent: AgentId,
        stimulus: Stimulus,
        status: StimulationStatus,
    ) -> Result<(), EnvironmentError> {
        self.buffer.push((agent, stimulus, status));
        Ok(())
    }

    fn transition_system(&self) -> Option<AgentTransitionSystem> {
        Some(self.ts.clone())
    }

    fn clone_box(&self) -> Box<dyn Environment> {
        Box::new(self.clone())
    }
}
