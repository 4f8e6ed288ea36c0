//! Restriction of candidate successor events.
//!
//! Before the external engine may follow a transition, the candidate event
//! is checked against the source state's context and the current round's
//! trace safeguards. A candidate is forbidden when:
//!
//! 1. its agent is currently emitting the action and the candidate is an
//!    input `stop`;
//! 2. its agent is currently not emitting the action and the candidate is
//!    an input `emit`;
//! 3. it is a `commit` while a complementary input `emit` (for an emitting
//!    agent) or input `stop` (for a non-emitting agent) is still among the
//!    candidate successors -- the round cannot close while a confirmation
//!    is outstanding;
//! 4. it is a stimulation-phase transition whose (agent, stimulus) pair is
//!    already safeguarded this round;
//! 5. it is an action transition whose (agent, action) pair is already
//!    safeguarded this round.
//!
//! Together with [`event_scheduled`], this enforces at most one
//! stimulation-phase transition and at most one action transition per
//! (agent, subject) per synchronization round.

use tracing::debug;

use crucible_types::{ActionStatus, AgentAction, AgentId};

use crate::event::{Direction, ProtocolEvent, channel};
use crate::safeguards::TraceSafeguards;
use crate::ts::TsStateId;

/// A read-only view of the source state's agent context.
///
/// Implemented by the engine's snapshot-backed context; search states carry
/// one so restriction can consult action-emission status without touching
/// the live simulation.
pub trait ContextView {
    /// The current emission status of the given action for the given
    /// agent, or `None` if the agent or action is unknown.
    fn action_status(&self, agent: AgentId, action: &AgentAction) -> Option<ActionStatus>;
}

/// Filter the candidate successors of a state, dropping forbidden events.
pub fn restrict(
    context: &dyn ContextView,
    successors: Vec<(ProtocolEvent, TsStateId)>,
    safeguards: &TraceSafeguards,
) -> Vec<(ProtocolEvent, TsStateId)> {
    let mut allowed = Vec::with_capacity(successors.len());
    for (event, target) in &successors {
        if is_forbidden(context, event, &successors, safeguards) {
            debug!(event = %event, "Successor forbidden");
        } else {
            allowed.push((event.clone(), *target));
        }
    }
    allowed
}

/// Whether a single candidate event is forbidden in its source state.
fn is_forbidden(
    context: &dyn ContextView,
    event: &ProtocolEvent,
    successors: &[(ProtocolEvent, TsStateId)],
    safeguards: &TraceSafeguards,
) -> bool {
    //
    // Local transition constraints
    //

    if let (Some(agent), Some(action)) = (event.agent(), event.action_ref()) {
        match context.action_status(agent, action) {
            Some(ActionStatus::Emitting) => {
                // Restriction 1: an emitting agent cannot be told to have
                // stopped.
                if event.name() == channel::STOP && event.direction() == Direction::Input {
                    return true;
                }
            }
            Some(ActionStatus::NotEmitting) => {
                // Restriction 2: a non-emitting agent cannot be told to
                // have emitted.
                if event.name() == channel::EMIT && event.direction() == Direction::Input {
                    return true;
                }
            }
            None => {}
        }
    }

    // Restrictions 3 and 4: a commit cannot pass while a confirmation for
    // some agent's emission change is still among the candidates.
    if event.is_commit() && has_outstanding_confirmation(context, successors) {
        return true;
    }

    //
    // Trace constraints
    //

    if event.concerns_stimulation() {
        if let (Some(agent), Some(stimulus)) = (event.agent(), event.stimulus_ref()) {
            if safeguards.has_stimulation(agent, stimulus) {
                return true;
            }
        }
    }

    if event.concerns_action() {
        if let (Some(agent), Some(action)) = (event.agent(), event.action_ref()) {
            if safeguards.has_action(agent, action) {
                return true;
            }
        }
    }

    false
}

/// Whether any candidate is an input `emit` for an emitting agent or an
/// input `stop` for a non-emitting agent.
///
/// Such a candidate is the pending confirmation of an emission change, and
/// the round must consume it before it may close.
fn has_outstanding_confirmation(
    context: &dyn ContextView,
    successors: &[(ProtocolEvent, TsStateId)],
) -> bool {
    successors.iter().any(|(candidate, _)| {
        if candidate.direction() != Direction::Input {
            return false;
        }
        let (Some(agent), Some(action)) = (candidate.agent(), candidate.action_ref()) else {
            return false;
        };
        match context.action_status(agent, action) {
            Some(ActionStatus::Emitting) => candidate.name() == channel::EMIT,
            Some(ActionStatus::NotEmitting) => candidate.name() == channel::STOP,
            None => false,
        }
    })
}

/// Update the trace safeguards after an event is scheduled.
///
/// The `commit` event clears both safeguard sets (a new round starts); a
/// stimulation-phase event registers a stimulation safeguard; an action
/// event registers an action safeguard.
pub fn event_scheduled(event: &ProtocolEvent, safeguards: &mut TraceSafeguards) {
    if event.is_commit() {
        safeguards.clear();
    } else if event.concerns_stimulation() {
        if let (Some(agent), Some(stimulus)) = (event.agent(), event.stimulus_ref()) {
            safeguards.put_stimulation(agent, stimulus.clone());
        }
    } else if event.concerns_action() {
        if let (Some(agent), Some(action)) = (event.agent(), event.action_ref()) {
            safeguards.put_action(agent, action.clone());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use crucible_types::{StimulationStatus, Stimulus};

    use super::*;

    /// A context with a fixed action-status table.
    #[derive(Default)]
    struct TableContext {
        statuses: BTreeMap<(AgentId, AgentAction), ActionStatus>,
    }

    impl TableContext {
        fn with(mut self, agent: AgentId, action: &AgentAction, status: ActionStatus) -> Self {
            self.statuses.insert((agent, action.clone()), status);
            self
        }
    }

    impl ContextView for TableContext {
        fn action_status(&self, agent: AgentId, action: &AgentAction) -> Option<ActionStatus> {
            self.statuses.get(&(agent, action.clone())).copied()
        }
    }

    fn state(n: u64) -> TsStateId {
        TsStateId::new(n)
    }

    fn input_action(name: &str, agent: AgentId, action: &AgentAction) -> ProtocolEvent {
        ProtocolEvent::action(name, Direction::Input, agent, action.clone())
    }

    fn begin_light(agent: AgentId) -> ProtocolEvent {
        ProtocolEvent::stimulation(
            channel::BEGINNING,
            Direction::Output,
            agent,
            Stimulus::new("light"),
            StimulationStatus::Beginning,
        )
    }

    #[test]
    fn emitting_agent_cannot_receive_input_stop() {
        let agent = AgentId::new();
        let wave = AgentAction::new("wave");
        let context = TableContext::default().with(agent, &wave, ActionStatus::Emitting);

        let successors = vec![(input_action(channel::STOP, agent, &wave), state(1))];
        let allowed = restrict(&context, successors, &TraceSafeguards::new());
        assert!(allowed.is_empty());
    }

    #[test]
    fn non_emitting_agent_cannot_receive_input_emit() {
        let agent = AgentId::new();
        let wave = AgentAction::new("wave");
        let context = TableContext::default().with(agent, &wave, ActionStatus::NotEmitting);

        let successors = vec![(input_action(channel::EMIT, agent, &wave), state(1))];
        let allowed = restrict(&context, successors, &TraceSafeguards::new());
        assert!(allowed.is_empty());
    }

    #[test]
    fn emitting_agent_may_receive_input_emit() {
        let agent = AgentId::new();
        let wave = AgentAction::new("wave");
        let context = TableContext::default().with(agent, &wave, ActionStatus::Emitting);

        let successors = vec![(input_action(channel::EMIT, agent, &wave), state(1))];
        let allowed = restrict(&context, successors, &TraceSafeguards::new());
        assert_eq!(allowed.len(), 1);
    }

    #[test]
    fn commit_blocked_while_emit_confirmation_outstanding() {
        let agent = AgentId::new();
        let wave = AgentAction::new("wave");
        let context = TableContext::default().with(agent, &wave, ActionStatus::Emitting);

        let successors = vec![
            (ProtocolEvent::commit(), state(1)),
            (input_action(channel::EMIT, agent, &wave), state(2)),
        ];
        let allowed = restrict(&context, successors, &TraceSafeguards::new());

        // The commit is dropped; the pending emit confirmation survives.
        assert_eq!(allowed.len(), 1);
        assert_eq!(allowed.first().unwrap().0.name(), channel::EMIT);
    }

    #[test]
    fn commit_blocked_while_stop_confirmation_outstanding() {
        let agent = AgentId::new();
        let wave = AgentAction::new("wave");
        let context = TableContext::default().with(agent, &wave, ActionStatus::NotEmitting);

        let successors = vec![
            (ProtocolEvent::commit(), state(1)),
            (input_action(channel::STOP, agent, &wave), state(2)),
        ];
        let allowed = restrict(&context, successors, &TraceSafeguards::new());
        assert_eq!(allowed.len(), 1);
        assert_eq!(allowed.first().unwrap().0.name(), channel::STOP);
    }

    #[test]
    fn commit_passes_without_outstanding_confirmations() {
        let agent = AgentId::new();
        let wave = AgentAction::new("wave");
        let context = TableContext::default().with(agent, &wave, ActionStatus::Emitting);

        // The only action candidate is a forbidden stop, not a pending
        // emit, so the commit may pass.
        let successors = vec![
            (ProtocolEvent::commit(), state(1)),
            (input_action(channel::STOP, agent, &wave), state(2)),
        ];
        let allowed = restrict(&context, successors, &TraceSafeguards::new());
        assert_eq!(allowed.len(), 1);
        assert!(allowed.first().unwrap().0.is_commit());
    }

    #[test]
    fn safeguarded_stimulation_is_rejected_within_round() {
        let agent = AgentId::new();
        let context = TableContext::default();

        let mut safeguards = TraceSafeguards::new();
        let begin = begin_light(agent);
        event_scheduled(&begin, &mut safeguards);

        // Scheduling the same (agent, stimulus) pair again is rejected,
        // whatever the phase.
        let stable = ProtocolEvent::stimulation(
            channel::STABLE,
            Direction::Output,
            agent,
            Stimulus::new("light"),
            StimulationStatus::Stable,
        );
        let allowed = restrict(&context, vec![(stable, state(1))], &safeguards);
        assert!(allowed.is_empty());
    }

    #[test]
    fn safeguarded_action_is_rejected_within_round() {
        let agent = AgentId::new();
        let wave = AgentAction::new("wave");
        let context = TableContext::default().with(agent, &wave, ActionStatus::Emitting);

        let mut safeguards = TraceSafeguards::new();
        event_scheduled(&input_action(channel::EMIT, agent, &wave), &mut safeguards);

        let allowed = restrict(
            &context,
            vec![(input_action(channel::EMIT, agent, &wave), state(1))],
            &safeguards,
        );
        assert!(allowed.is_empty());
    }

    #[test]
    fn commit_clears_safeguards() {
        let agent = AgentId::new();
        let mut safeguards = TraceSafeguards::new();
        event_scheduled(&begin_light(agent), &mut safeguards);
        assert!(!safeguards.is_empty());

        event_scheduled(&ProtocolEvent::commit(), &mut safeguards);
        assert!(safeguards.is_empty());
    }

    #[test]
    fn other_agents_are_unaffected_by_safeguards() {
        let first = AgentId::new();
        let second = AgentId::new();
        let context = TableContext::default();

        let mut safeguards = TraceSafeguards::new();
        event_scheduled(&begin_light(first), &mut safeguards);

        let allowed = restrict(&context, vec![(begin_light(second), state(1))], &safeguards);
        assert_eq!(allowed.len(), 1);
    }
}
