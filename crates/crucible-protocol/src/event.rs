//! Protocol events and their complementarity rules.
//!
//! A [`ProtocolEvent`] can denote exactly one of:
//!
//! - an action performed by an agent (channel `emit` or `stop`),
//! - a stimulation phase applied to an agent (channel `beginning`,
//!   `stable`, `ending`, or `absent`),
//! - an event unrelated to any agent, such as the round-boundary `commit`.
//!
//! Pairing between an agent's proposal and the environment's counterpart is
//! decided by *complementarity*, not raw equality: opposite input/output
//! directions, the same channel name, and matching optional decorations.

use serde::{Deserialize, Serialize};

use crucible_types::{AgentAction, AgentId, StimulationStatus, Stimulus};

/// The reserved channel names of the coordination structure.
pub mod channel {
    use crucible_types::StimulationStatus;

    /// An agent starts emitting an action.
    pub const EMIT: &str = "emit";
    /// An agent stops emitting an action.
    pub const STOP: &str = "stop";
    /// A stimulation enters its beginning phase.
    pub const BEGINNING: &str = "beginning";
    /// A stimulation enters its stable phase.
    pub const STABLE: &str = "stable";
    /// A stimulation enters its ending phase.
    pub const ENDING: &str = "ending";
    /// A stimulation becomes absent.
    pub const ABSENT: &str = "absent";
    /// The synchronization-round boundary.
    pub const COMMIT: &str = "commit";

    /// Whether the name denotes an agent-action transition.
    pub fn is_action_name(name: &str) -> bool {
        name == EMIT || name == STOP
    }

    /// Whether the name denotes a stimulation-phase transition.
    pub fn is_stimulation_name(name: &str) -> bool {
        name == BEGINNING || name == STABLE || name == ENDING || name == ABSENT
    }

    /// Whether the name carries domain meaning at all.
    ///
    /// Internal wrapper transitions whose cause carries one of these names
    /// are transparent to the translation.
    pub fn is_meaningful(name: &str) -> bool {
        is_action_name(name) || is_stimulation_name(name)
    }

    /// The stimulation phase a stimulation channel name stands for.
    pub fn stimulation_status(name: &str) -> Option<StimulationStatus> {
        match name {
            BEGINNING => Some(StimulationStatus::Beginning),
            STABLE => Some(StimulationStatus::Stable),
            ENDING => Some(StimulationStatus::Ending),
            ABSENT => Some(StimulationStatus::Absent),
            _ => None,
        }
    }
}

/// The I/O direction of a protocol event, seen from the coordination
/// structure.
///
/// Agent actions drive the structure and are inputs; stimulation phases
/// come out of it towards the agents and are outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The event flows into the coordination structure.
    Input,
    /// The event flows out of the coordination structure.
    Output,
    /// The event is internal and invisible to the exterior.
    Internal,
    /// The event has no I/O reading.
    Other,
}

impl Direction {
    /// Whether this direction pairs with the other for synchronization.
    pub const fn complements(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Input, Self::Output) | (Self::Output, Self::Input)
        )
    }
}

/// One event of the agent-action/stimulation protocol.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProtocolEvent {
    name: String,
    direction: Direction,
    agent: Option<AgentId>,
    action: Option<AgentAction>,
    stimulus: Option<Stimulus>,
    status: Option<StimulationStatus>,
}

impl ProtocolEvent {
    /// Build an event unrelated to any agent, action, or stimulus.
    pub fn unrelated(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
            agent: None,
            action: None,
            stimulus: None,
            status: None,
        }
    }

    /// Build an event denoting the performance of an action by an agent.
    pub fn action(
        name: impl Into<String>,
        direction: Direction,
        agent: AgentId,
        action: AgentAction,
    ) -> Self {
        Self {
            name: name.into(),
            direction,
            agent: Some(agent),
            action: Some(action),
            stimulus: None,
            status: None,
        }
    }

    /// Build an event denoting the stimulation of an agent.
    pub fn stimulation(
        name: impl Into<String>,
        direction: Direction,
        agent: AgentId,
        stimulus: Stimulus,
        status: StimulationStatus,
    ) -> Self {
        Self {
            name: name.into(),
            direction,
            agent: Some(agent),
            action: None,
            stimulus: Some(stimulus),
            status: Some(status),
        }
    }

    /// The distinguished round-boundary event.
    pub fn commit() -> Self {
        Self::unrelated(channel::COMMIT, Direction::Output)
    }

    /// The event's channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event's I/O direction.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// The agent concerned by the event, if any.
    pub const fn agent(&self) -> Option<AgentId> {
        self.agent
    }

    /// The action associated with the event, if any.
    pub const fn action_ref(&self) -> Option<&AgentAction> {
        self.action.as_ref()
    }

    /// The stimulus associated with the event, if any.
    pub const fn stimulus_ref(&self) -> Option<&Stimulus> {
        self.stimulus.as_ref()
    }

    /// The stimulation phase the event establishes, if any.
    pub const fn status(&self) -> Option<StimulationStatus> {
        self.status
    }

    /// Whether this is the round-boundary `commit` event.
    pub fn is_commit(&self) -> bool {
        self.name == channel::COMMIT
    }

    /// Whether the event concerns an agent-action transition.
    pub fn concerns_action(&self) -> bool {
        channel::is_action_name(&self.name)
    }

    /// Whether the event concerns a stimulation-phase transition.
    pub fn concerns_stimulation(&self) -> bool {
        channel::is_stimulation_name(&self.name)
    }

    /// Whether this event and the other can synchronize.
    ///
    /// Complementarity requires opposite input/output directions, equal
    /// channel names, and matching decorations: each optional field must be
    /// absent on both sides or present and equal on both.
    pub fn is_complementary(&self, other: &Self) -> bool {
        self.direction.complements(other.direction)
            && self.name == other.name
            && self.agent == other.agent
            && self.action == other.action
            && self.stimulus == other.stimulus
            && self.status == other.status
    }
}

impl core::fmt::Display for ProtocolEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let marker = match self.direction {
            Direction::Input => "?",
            Direction::Output => "!",
            Direction::Internal => "~",
            Direction::Other => "(*)",
        };
        write!(f, "{marker}{}", self.name)?;
        if let Some(agent) = self.agent {
            write!(f, "[agent = {agent}]")?;
        }
        if let Some(action) = &self.action {
            write!(f, "_{action}")?;
        }
        if let Some(stimulus) = &self.stimulus {
            write!(f, "_{stimulus}")?;
        }
        Ok(())
    }
}
