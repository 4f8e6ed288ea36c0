//! Translation of raw engine transitions into domain events.
//!
//! The external coordination engine emits generic transitions whose labels
//! carry decorations (agent id, action, stimulus) plus, for internal
//! transitions, the label that caused them. Translation rewrites each label
//! into a [`ProtocolEvent`], determining the I/O direction by the channel
//! name: action names are inputs (the agent drives the coordination
//! structure), stimulation names are outputs (the structure drives the
//! agent), and causeless internal transitions stay internal.

use crucible_types::{AgentAction, AgentId, Stimulus};

use crate::error::ProtocolError;
use crate::event::{Direction, ProtocolEvent, channel};

/// A raw transition label as reported by the coordination engine.
///
/// Labels are built with the `with_*` methods, e.g.:
///
/// ```
/// use crucible_protocol::RawLabel;
/// use crucible_types::{AgentId, Stimulus};
///
/// let label = RawLabel::new("beginning")
///     .with_agent(AgentId::new())
///     .with_stimulus(Stimulus::new("light"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLabel {
    /// The channel name of the label.
    pub name: String,
    /// Whether the transition is internal to the engine.
    pub internal: bool,
    /// The agent decoration, if any.
    pub agent: Option<AgentId>,
    /// The action decoration, if any.
    pub action: Option<AgentAction>,
    /// The stimulus decoration, if any.
    pub stimulus: Option<Stimulus>,
    /// For internal transitions, the label that caused them.
    pub cause: Option<Box<RawLabel>>,
}

impl RawLabel {
    /// Create a visible (non-internal) label with the given channel name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            internal: false,
            agent: None,
            action: None,
            stimulus: None,
            cause: None,
        }
    }

    /// Create an internal label with the given channel name.
    pub fn internal(name: impl Into<String>) -> Self {
        Self {
            internal: true,
            ..Self::new(name)
        }
    }

    /// Attach an agent decoration.
    #[must_use]
    pub const fn with_agent(mut self, agent: AgentId) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Attach an action decoration.
    #[must_use]
    pub fn with_action(mut self, action: AgentAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Attach a stimulus decoration.
    #[must_use]
    pub fn with_stimulus(mut self, stimulus: Stimulus) -> Self {
        self.stimulus = Some(stimulus);
        self
    }

    /// Record the label that caused this (internal) transition.
    #[must_use]
    pub fn with_cause(mut self, cause: Self) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

/// Rewrite a raw transition label into a domain event.
///
/// An internal label whose recorded cause carries a meaningful channel name
/// is translated through that cause; internal wrapper transitions are
/// transparent to the domain reading. A label that is internal even after
/// cause resolution translates to an [`Direction::Internal`] event.
///
/// # Errors
///
/// Returns [`ProtocolError::Untranslatable`] when the label's decorations
/// do not form one of the three admissible shapes (undecorated; agent with
/// action; agent with stimulus on a stimulation channel).
pub fn translate(label: &RawLabel) -> Result<ProtocolEvent, ProtocolError> {
    // Internal wrappers defer to their cause when the cause is meaningful.
    let effective = if label.internal {
        match &label.cause {
            Some(cause) if channel::is_meaningful(&cause.name) => cause.as_ref(),
            _ => label,
        }
    } else {
        label
    };

    let direction = if effective.internal {
        Direction::Internal
    } else if channel::is_action_name(&effective.name) {
        Direction::Input
    } else {
        Direction::Output
    };

    match (effective.agent, &effective.action, &effective.stimulus) {
        (None, None, None) => Ok(ProtocolEvent::unrelated(effective.name.clone(), direction)),
        (Some(agent), Some(action), None) => Ok(ProtocolEvent::action(
            effective.name.clone(),
            direction,
            agent,
            action.clone(),
        )),
        (Some(agent), None, Some(stimulus)) => {
            let status = channel::stimulation_status(&effective.name).ok_or_else(|| {
                ProtocolError::Untranslatable {
                    name: effective.name.clone(),
                    reason: String::from("a stimulation channel name was expected"),
                }
            })?;
            Ok(ProtocolEvent::stimulation(
                effective.name.clone(),
                direction,
                agent,
                stimulus.clone(),
                status,
            ))
        }
        _ => Err(ProtocolError::Untranslatable {
            name: effective.name.clone(),
            reason: String::from(
                "decorations must be empty, an agent with an action, or an agent with a stimulus",
            ),
        }),
    }
}
