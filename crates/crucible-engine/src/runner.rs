//! The stepper: advances one snapshot to the next.
//!
//! A [`SimulationRunner`] owns the immutable initial snapshot, the current
//! snapshot, and the active run. Simulation strategies drive their
//! algorithms through it: stepping forward, resetting, and -- for
//! verification backtracking -- re-entering an arbitrary earlier position
//! via [`go_to_state`].
//!
//! After any successful call, the current snapshot's position, the
//! runner's position, and the run's current position agree (the run
//! tracks position without retaining content under
//! [`StorageMode::None`]).
//!
//! [`go_to_state`]: SimulationRunner::go_to_state

use tracing::{debug, info};

use crucible_model::SimulationSnapshot;
use crucible_types::{ExecutionMode, StorageMode};

use crate::error::RunError;
use crate::run::SimulationRun;

/// Controls the execution of a simulation.
#[derive(Debug)]
pub struct SimulationRunner {
    /// The simulation's initial state.
    initial: SimulationSnapshot,
    /// The simulation's current state; `None` until a run is set up.
    current: Option<SimulationSnapshot>,
    /// The simulation's current run.
    run: SimulationRun,
    /// How the simulation is being driven.
    execution_mode: ExecutionMode,
    /// The current step. `None` means not even the initial state has been
    /// set up yet; `Some(0)` means the initial state is ready but no step
    /// has been taken.
    position: Option<u64>,
}

impl SimulationRunner {
    /// Create a runner over the given initial state, retaining nothing.
    pub fn new(initial: SimulationSnapshot) -> Self {
        Self::with_storage(initial, StorageMode::None)
    }

    /// Create a runner over the given initial state and storage mode.
    pub const fn with_storage(initial: SimulationSnapshot, mode: StorageMode) -> Self {
        Self {
            initial,
            current: None,
            run: SimulationRun::new(mode),
            execution_mode: ExecutionMode::Exploration,
            position: None,
        }
    }

    /// Set up a fresh run.
    ///
    /// Creates a new run under the given storage mode, clones the initial
    /// snapshot into the current one, stores another clone at position 0,
    /// and marks the run ready.
    ///
    /// # Errors
    ///
    /// Propagates [`RunError`] from storing the initial state.
    pub fn setup_run(
        &mut self,
        storage_mode: StorageMode,
        execution_mode: ExecutionMode,
    ) -> Result<(), RunError> {
        info!(%storage_mode, %execution_mode, "Setting up simulation run");

        self.run = SimulationRun::new(storage_mode);
        self.execution_mode = execution_mode;

        let mut current = self.initial.clone();
        current.set_position(0);
        self.run.append(current.clone())?;
        self.current = Some(current);
        self.position = Some(0);
        Ok(())
    }

    /// Run one step of the simulation.
    ///
    /// If no run has been set up, one is set up first with the default
    /// modes ([`StorageMode::None`], [`ExecutionMode::Exploration`]). The
    /// environment is stepped before any agent or relation update, because
    /// it may need to finalize pending deliveries first; agents then step
    /// in roster order; relations currently receive no per-step update.
    ///
    /// # Errors
    ///
    /// Propagates [`RunError`] from the environment, the property sweep,
    /// or storing the stepped state.
    pub fn run_step(&mut self) -> Result<(), RunError> {
        if self.position.is_none() {
            self.setup_run(StorageMode::None, ExecutionMode::Exploration)?;
        }

        let position = self.position.map_or(0, |p| p.saturating_add(1));
        let mode = self.execution_mode;

        let Some(current) = self.current.as_mut() else {
            return Err(RunError::NoRun);
        };
        current.set_position(position);

        // Update the environment first; it may be responsible for
        // synchronizing things the other elements need (e.g. delivering
        // buffered stimulation to agents).
        let (environment, agents) = current.coordination_mut();
        environment.step(mode, agents)?;

        // Supervise agents, in roster order.
        for agent in agents.iter_mut() {
            agent.step();
        }

        // Relations receive no per-step update.

        // Supervise property bearers.
        for bearer in current.bearers() {
            let view = current.resolve_bearer(bearer)?;
            let mut observations = Vec::with_capacity(bearer.properties().len());
            for property_id in bearer.properties() {
                if let Some(property) = current.property(*property_id) {
                    observations
                        .push(format!("[{} = {}]", property.name(), property.value_as_string(view)?));
                }
            }
            debug!(
                position,
                bearer = bearer.name(),
                properties = observations.join(" "),
                "Properties"
            );
        }

        // Store the current state after the modifications.
        self.run.append(current.clone())?;
        self.position = Some(position);
        Ok(())
    }

    /// Run the simulation for `steps` iterations.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NoSteps`] for zero steps, and propagates any
    /// stepping failure.
    pub fn run_steps(&mut self, steps: u64) -> Result<&SimulationRun, RunError> {
        if steps == 0 {
            return Err(RunError::NoSteps);
        }

        for _ in 0..steps {
            self.run_step()?;
        }

        Ok(&self.run)
    }

    /// Replace the current run with a fresh one under the same modes.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NoRun`] if no run has ever been set up.
    pub fn reset_run(&mut self) -> Result<(), RunError> {
        if self.position.is_none() {
            return Err(RunError::NoRun);
        }
        self.setup_run(self.run.mode(), self.execution_mode)
    }

    /// Make the given state the current one.
    ///
    /// The state is deep-cloned; its position must be at most the next one
    /// in the run. This is how verification backtracking is realized.
    ///
    /// # Errors
    ///
    /// Propagates [`RunError`] from the run's restart.
    pub fn go_to_state(&mut self, state: &SimulationSnapshot) -> Result<(), RunError> {
        let current = state.clone();
        self.run.restart_from(current.clone())?;
        self.position = Some(current.position());
        self.current = Some(current);
        Ok(())
    }

    /// The current state of the simulation.
    ///
    /// Before any run is set up, the current state is the initial one.
    pub fn current_state(&self) -> &SimulationSnapshot {
        self.current.as_ref().unwrap_or(&self.initial)
    }

    /// The current state, mutably, if a run is active.
    pub const fn current_state_mut(&mut self) -> Option<&mut SimulationSnapshot> {
        self.current.as_mut()
    }

    /// A clone of the initial state.
    pub fn initial_state_clone(&self) -> SimulationSnapshot {
        self.initial.clone()
    }

    /// The initial state.
    pub const fn initial_state(&self) -> &SimulationSnapshot {
        &self.initial
    }

    /// The current run.
    pub const fn run(&self) -> &SimulationRun {
        &self.run
    }

    /// The current position, if a run is set up.
    pub const fn position(&self) -> Option<u64> {
        self.position
    }

    /// The configured execution mode.
    pub const fn execution_mode(&self) -> ExecutionMode {
        self.execution_mode
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use crucible_model::{
        AgentBehavior, AgentBody, AgentControl, AgentRoster, BasicEnvironment, BearerKind,
        Property, PropertyBearer, StimulationPhaseCount,
    };
    use crucible_types::{ActionStatus, AgentAction, AgentId, PropertyId, StimulationStatus,
        Stimulus};

    use super::*;

    /// A behavior that starts emitting `wave` on its first step.
    #[derive(Debug, Clone, Copy)]
    struct WaveOnce;

    impl AgentBehavior for WaveOnce {
        fn step(&mut self, body: &mut AgentBody) {
            body.set_action_status(AgentAction::new("wave"), ActionStatus::Emitting);
        }

        fn clone_box(&self) -> Box<dyn AgentBehavior> {
            Box::new(*self)
        }
    }

    fn one_agent_snapshot() -> (SimulationSnapshot, AgentId) {
        let agent_id = AgentId::new();
        let mut roster = AgentRoster::new();
        roster
            .push(AgentControl::new(
                AgentBody::new(
                    agent_id,
                    "alpha",
                    BTreeSet::from([AgentAction::new("wave")]),
                    BTreeSet::from([Stimulus::new("light")]),
                ),
                Box::new(WaveOnce),
            ))
            .unwrap();

        let property_id = PropertyId::new();
        let snapshot = SimulationSnapshot::new(
            Box::new(BasicEnvironment::new("env")),
            roster,
            Vec::new(),
            vec![Property::new(
                property_id,
                "stimulated",
                Box::new(StimulationPhaseCount::new(StimulationStatus::Beginning)),
            )],
            vec![PropertyBearer::new(
                "alpha",
                BearerKind::Agent(agent_id),
                vec![property_id],
            )],
        );
        (snapshot, agent_id)
    }

    #[test]
    fn three_steps_store_four_positions() {
        let (snapshot, _) = one_agent_snapshot();
        let mut runner = SimulationRunner::new(snapshot);
        runner
            .setup_run(StorageMode::Full, ExecutionMode::Exploration)
            .unwrap();

        let run = runner.run_steps(3).unwrap();
        assert_eq!(run.len(), 4);
        let trace = run.trace().unwrap();
        for (index, state) in trace.iter().enumerate() {
            assert_eq!(state.position(), u64::try_from(index).unwrap());
        }
    }

    #[test]
    fn zero_steps_is_rejected() {
        let (snapshot, _) = one_agent_snapshot();
        let mut runner = SimulationRunner::new(snapshot);
        assert!(matches!(runner.run_steps(0), Err(RunError::NoSteps)));
    }

    #[test]
    fn run_step_sets_up_default_run_implicitly() {
        let (snapshot, _) = one_agent_snapshot();
        let mut runner = SimulationRunner::new(snapshot);
        runner.run_step().unwrap();

        assert_eq!(runner.position(), Some(1));
        assert_eq!(runner.execution_mode(), ExecutionMode::Exploration);
        assert!(runner.run().is_empty());
        assert_eq!(runner.run().current_position(), Some(1));
    }

    #[test]
    fn positions_agree_after_each_step() {
        let (snapshot, _) = one_agent_snapshot();
        let mut runner = SimulationRunner::new(snapshot);
        runner
            .setup_run(StorageMode::Full, ExecutionMode::Exploration)
            .unwrap();

        for _ in 0..3 {
            runner.run_step().unwrap();
            assert_eq!(Some(runner.current_state().position()), runner.position());
            assert_eq!(runner.run().current_position(), runner.position());
        }
    }

    #[test]
    fn agent_steps_mutate_only_the_current_state() {
        let (snapshot, agent_id) = one_agent_snapshot();
        let mut runner = SimulationRunner::new(snapshot);
        runner
            .setup_run(StorageMode::Full, ExecutionMode::Exploration)
            .unwrap();
        runner.run_step().unwrap();

        let wave = AgentAction::new("wave");
        // The agent waved during the step.
        assert_eq!(
            runner
                .current_state()
                .agent(agent_id)
                .unwrap()
                .body()
                .action_status(&wave),
            ActionStatus::Emitting
        );
        // The stored initial state did not.
        let trace = runner.run().trace().unwrap();
        assert_eq!(
            trace
                .first()
                .unwrap()
                .agent(agent_id)
                .unwrap()
                .body()
                .action_status(&wave),
            ActionStatus::NotEmitting
        );
    }

    #[test]
    fn reset_requires_an_existing_run() {
        let (snapshot, _) = one_agent_snapshot();
        let mut runner = SimulationRunner::new(snapshot);
        assert!(matches!(runner.reset_run(), Err(RunError::NoRun)));
    }

    #[test]
    fn reset_keeps_storage_and_execution_modes() {
        let (snapshot, _) = one_agent_snapshot();
        let mut runner = SimulationRunner::new(snapshot);
        runner
            .setup_run(StorageMode::Full, ExecutionMode::Verification)
            .unwrap();
        runner.reset_run().unwrap();

        assert_eq!(runner.run().mode(), StorageMode::Full);
        assert_eq!(runner.execution_mode(), ExecutionMode::Verification);
        assert_eq!(runner.position(), Some(0));
        assert_eq!(runner.run().len(), 1);
    }

    #[test]
    fn go_to_state_rewinds_the_run() {
        let (snapshot, _) = one_agent_snapshot();
        let mut runner = SimulationRunner::new(snapshot);
        runner
            .setup_run(StorageMode::Full, ExecutionMode::Verification)
            .unwrap();
        runner.run_steps(3).unwrap();

        let second = runner.run().trace().unwrap().get(1).unwrap().clone();
        runner.go_to_state(&second).unwrap();

        assert_eq!(runner.position(), Some(1));
        assert_eq!(runner.current_state().position(), 1);
        assert_eq!(runner.run().current_position(), Some(1));

        // Stepping continues from the re-entered position.
        runner.run_step().unwrap();
        assert_eq!(runner.position(), Some(2));
    }

    #[test]
    fn go_to_state_rejects_future_positions() {
        let (snapshot, _) = one_agent_snapshot();
        let mut runner = SimulationRunner::new(snapshot);
        runner
            .setup_run(StorageMode::Full, ExecutionMode::Verification)
            .unwrap();
        runner.run_steps(1).unwrap();

        let mut future = runner.current_state().clone();
        future.set_position(3);
        assert!(matches!(
            runner.go_to_state(&future),
            Err(RunError::PositionAhead { .. })
        ));
    }

    #[test]
    fn go_to_state_clones_instead_of_aliasing() {
        let (snapshot, agent_id) = one_agent_snapshot();
        let mut runner = SimulationRunner::new(snapshot);
        runner
            .setup_run(StorageMode::Full, ExecutionMode::Verification)
            .unwrap();

        let entry = runner.initial_state_clone();
        runner.go_to_state(&entry).unwrap();

        // Mutating the runner's current state leaves the caller's copy
        // untouched.
        let wave = AgentAction::new("wave");
        runner
            .current_state_mut()
            .unwrap()
            .agents_mut()
            .get_mut(agent_id)
            .unwrap()
            .body_mut()
            .set_action_status(wave.clone(), ActionStatus::Emitting);
        assert_eq!(
            entry.agent(agent_id).unwrap().body().action_status(&wave),
            ActionStatus::NotEmitting
        );
    }
}
