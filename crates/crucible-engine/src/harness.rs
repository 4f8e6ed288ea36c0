//! Contracts between the simulator and external verification algorithms.
//!
//! A verification algorithm explores the external transition system while
//! keeping a live simulation synchronized with its search. It drives the
//! simulation through the [`SimulatorHarness`] contract; the concrete
//! implementation over a runner is [`SimulatorConnector`].
//!
//! [`SimulatorConnector`]: crate::connector::SimulatorConnector

use std::collections::BTreeSet;

use crucible_model::SimulationSnapshot;
use crucible_protocol::{
    AgentTransitionSystem, Literal, ProtocolEvent, SimulationPurpose, SyncRecord, Verdict,
};
use crucible_types::{ActionStatus, AgentAction, AgentId};

use crate::error::InvalidRequest;

/// The way an external engine controls a simulation.
///
/// Every failure is reported as a single [`InvalidRequest`] error; the
/// engine does not distinguish the simulator's internal error kinds.
pub trait SimulatorHarness {
    /// Set up a fresh run for synchronization.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequest`] when the run cannot be set up.
    fn setup(&mut self) -> Result<(), InvalidRequest>;

    /// Replace the current run with a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequest`] when no run exists yet.
    fn reset(&mut self) -> Result<(), InvalidRequest>;

    /// Announce that the given event will take place in the next step.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequest`] for events the simulator cannot honor.
    fn schedule_step(&mut self, event: &ProtocolEvent) -> Result<(), InvalidRequest>;

    /// Run one simulation step.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequest`] when the step fails.
    fn step(&mut self) -> Result<(), InvalidRequest>;

    /// The position of the current simulation state.
    fn current_position(&self) -> u64;

    /// Make the given state the current one (backtracking).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequest`] when the simulator cannot return to the
    /// state.
    fn go_to_state(&mut self, state: &SimulationSnapshot) -> Result<(), InvalidRequest>;

    /// A clone of the current simulation state.
    fn current_state(&self) -> SimulationSnapshot;

    /// The current emission status of an action for an agent, if known.
    fn action_status(&self, agent: AgentId, action: &AgentAction) -> Option<ActionStatus>;

    /// The propositional literals of the current state.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequest`] when an observation fails.
    fn literals(&self) -> Result<BTreeSet<Literal>, InvalidRequest>;
}

/// An external verification algorithm.
///
/// Implementations decide whether a simulation can satisfy a purpose by
/// exploring the transition system while driving the simulation through a
/// harness. The simulator treats them as black boxes; only the verdict and
/// the trace found come back.
pub trait VerificationAlgorithm {
    /// A user-friendly name for the algorithm.
    fn name(&self) -> &str;

    /// Check the purpose against the transition system, driving the
    /// simulation through the harness.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequest`] when the harness rejects a request the
    /// algorithm cannot recover from.
    fn verify(
        &mut self,
        purpose: &dyn SimulationPurpose,
        ts: &AgentTransitionSystem,
        harness: &mut dyn SimulatorHarness,
    ) -> Result<Verdict, InvalidRequest>;

    /// The synchronization trace found by the last verification, if any.
    fn trace_found(&self) -> Vec<SyncRecord> {
        Vec::new()
    }
}
