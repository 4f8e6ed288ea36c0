//! The plain simulation strategy.
//!
//! Runs the model and presents the final result; nothing more.

use tracing::info;

use crucible_engine::SimulationRunner;
use crucible_model::SimulationSnapshot;

use crate::strategy::{Chronometer, SharedGroups, Strategy, StrategyError};

/// Runs `iterations_per_run` steps, `runs` times, and reports the final
/// snapshot.
#[derive(Debug)]
pub struct StandardSimulation {
    runs: u32,
    iterations_per_run: u32,
    chronometer: Chronometer,
    last_state: Option<SimulationSnapshot>,
}

impl StandardSimulation {
    /// Create the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::InvalidParameter`] when either count is
    /// zero.
    pub fn new(runs: u32, iterations_per_run: u32) -> Result<Self, StrategyError> {
        if runs == 0 {
            return Err(StrategyError::InvalidParameter {
                strategy: "standard simulation",
                parameter: "runs",
                reason: String::from("must be positive"),
            });
        }
        if iterations_per_run == 0 {
            return Err(StrategyError::InvalidParameter {
                strategy: "standard simulation",
                parameter: "iterations_per_run",
                reason: String::from("must be positive"),
            });
        }

        Ok(Self {
            runs,
            iterations_per_run,
            chronometer: Chronometer::new(),
            last_state: None,
        })
    }

    /// The last simulation state, once executed.
    pub const fn last_state(&self) -> Option<&SimulationSnapshot> {
        self.last_state.as_ref()
    }
}

impl Strategy for StandardSimulation {
    fn name(&self) -> &str {
        "Standard Simulation"
    }

    fn execute(
        &mut self,
        runner: &mut SimulationRunner,
        _groups: &SharedGroups,
    ) -> Result<(), StrategyError> {
        for run in 0..self.runs {
            info!(run, iterations = self.iterations_per_run, "Standard simulation run");
            runner.run_steps(u64::from(self.iterations_per_run))?;
        }

        self.last_state = Some(runner.current_state().clone());
        Ok(())
    }

    fn report(&self) -> String {
        let mut s = String::from("Standard simulation strategy\n");
        s.push_str("======================================================\n");
        match &self.last_state {
            Some(state) => s.push_str(&state.to_string()),
            None => s.push_str("(not executed)\n"),
        }
        s
    }

    fn chronometer(&self) -> &Chronometer {
        &self.chronometer
    }

    fn chronometer_mut(&mut self) -> &mut Chronometer {
        &mut self.chronometer
    }
}
