//! The concrete simulator harness over a runner.
//!
//! A [`SimulatorConnector`] provides the way an external verification
//! engine controls a simulation whose environment is coordinated by a
//! transition system. Runs are set up under [`ExecutionMode::Verification`]
//! with full storage so the engine can backtrack; only output-direction
//! stimulation deliveries (buffered into the environment) and the `commit`
//! event may be scheduled.

use std::collections::BTreeSet;

use tracing::debug;

use crucible_model::SimulationSnapshot;
use crucible_protocol::{ContextView, Literal, ProtocolEvent};
use crucible_types::{ActionStatus, AgentAction, AgentId, ExecutionMode, StorageMode};

use crate::context::SimulatorContext;
use crate::error::InvalidRequest;
use crate::harness::SimulatorHarness;
use crate::runner::SimulationRunner;

/// Controls a simulation on behalf of the external verification engine.
#[derive(Debug)]
pub struct SimulatorConnector<'a> {
    runner: &'a mut SimulationRunner,
    commit: ProtocolEvent,
}

impl<'a> SimulatorConnector<'a> {
    /// Create a connector over the given runner.
    pub fn new(runner: &'a mut SimulationRunner) -> Self {
        Self {
            runner,
            commit: ProtocolEvent::commit(),
        }
    }

    /// The distinguished commit event this connector recognizes.
    pub const fn commit_event(&self) -> &ProtocolEvent {
        &self.commit
    }
}

impl SimulatorHarness for SimulatorConnector<'_> {
    fn setup(&mut self) -> Result<(), InvalidRequest> {
        self.runner
            .setup_run(StorageMode::Full, ExecutionMode::Verification)
            .map_err(InvalidRequest::from)
    }

    fn reset(&mut self) -> Result<(), InvalidRequest> {
        self.runner.reset_run().map_err(InvalidRequest::from)
    }

    fn schedule_step(&mut self, event: &ProtocolEvent) -> Result<(), InvalidRequest> {
        // Only outputs of the transition system are inputs to the
        // simulator; the other directions were already accounted for when
        // the step was admitted.
        if event.direction() != crucible_protocol::Direction::Output {
            return Ok(());
        }

        if let (Some(agent), Some(stimulus), Some(status)) =
            (event.agent(), event.stimulus_ref(), event.status())
        {
            debug!(%event, "Scheduling stimulation delivery");
            let current = self
                .runner
                .current_state_mut()
                .ok_or_else(|| InvalidRequest::new("no simulation run is active"))?;
            current
                .environment_mut()
                .deliver_stimulation(agent, stimulus.clone(), status)
                .map_err(InvalidRequest::from)
        } else if event.is_complementary(&self.commit) || *event == self.commit {
            // Nothing special is required to handle the commit.
            Ok(())
        } else {
            Err(InvalidRequest::new(format!(
                "a stimulation delivery to an agent or a commit event was expected; found: {event}"
            )))
        }
    }

    fn step(&mut self) -> Result<(), InvalidRequest> {
        self.runner.run_step().map_err(InvalidRequest::from)
    }

    fn current_position(&self) -> u64 {
        self.runner.current_state().position()
    }

    fn go_to_state(&mut self, state: &SimulationSnapshot) -> Result<(), InvalidRequest> {
        self.runner.go_to_state(state).map_err(|source| {
            InvalidRequest::new(format!(
                "the simulator is unable to return to the specified state: {source}"
            ))
        })
    }

    fn current_state(&self) -> SimulationSnapshot {
        self.runner.current_state().clone()
    }

    fn action_status(&self, agent: AgentId, action: &AgentAction) -> Option<ActionStatus> {
        SimulatorContext::new(self.runner.current_state()).action_status(agent, action)
    }

    fn literals(&self) -> Result<BTreeSet<Literal>, InvalidRequest> {
        SimulatorContext::new(self.runner.current_state())
            .literals()
            .map_err(InvalidRequest::from)
    }
}
