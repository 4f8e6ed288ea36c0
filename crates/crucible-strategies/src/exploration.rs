//! Bounded random exploration of the transition system.
//!
//! Performs a random walk over the external engine's transition system
//! through the simulator connector: at each step the admissible successors
//! are enumerated (translated and restricted), one is chosen uniformly at
//! random, output events are scheduled into the simulator, and each
//! `commit` closes a synchronization round with one simulation step.

use rand::Rng;
use tracing::{debug, info};

use crucible_engine::{SimulationRunner, SimulatorConnector, SimulatorHarness};
use crucible_protocol::{ContextView, TraceSafeguards};
use crucible_types::{ActionStatus, AgentAction, AgentId};

use crate::strategy::{Chronometer, SharedGroups, Strategy, StrategyError};

/// A [`ContextView`] answered by the live simulation behind a harness.
struct HarnessContext<'a> {
    harness: &'a dyn SimulatorHarness,
}

impl ContextView for HarnessContext<'_> {
    fn action_status(&self, agent: AgentId, action: &AgentAction) -> Option<ActionStatus> {
        self.harness.action_status(agent, action)
    }
}

/// Walks the transition system at random, within bounds.
///
/// Skips execution entirely when its group has already been finished by a
/// successful verification strategy.
#[derive(Debug)]
pub struct RandomExploration {
    runs: u32,
    iterations_per_run: u32,
    group: String,
    events_walked: u64,
    rounds_committed: u64,
    skipped: bool,
    chronometer: Chronometer,
}

impl RandomExploration {
    /// Create the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::InvalidParameter`] when either count is
    /// zero.
    pub fn new(
        runs: u32,
        iterations_per_run: u32,
        group: impl Into<String>,
    ) -> Result<Self, StrategyError> {
        if runs == 0 {
            return Err(StrategyError::InvalidParameter {
                strategy: "random exploration",
                parameter: "runs",
                reason: String::from("must be positive"),
            });
        }
        if iterations_per_run == 0 {
            return Err(StrategyError::InvalidParameter {
                strategy: "random exploration",
                parameter: "iterations_per_run",
                reason: String::from("must be positive"),
            });
        }

        Ok(Self {
            runs,
            iterations_per_run,
            group: group.into(),
            events_walked: 0,
            rounds_committed: 0,
            skipped: false,
            chronometer: Chronometer::new(),
        })
    }

    /// How many transition-system events the walk traversed.
    pub const fn events_walked(&self) -> u64 {
        self.events_walked
    }

    /// How many synchronization rounds were committed.
    pub const fn rounds_committed(&self) -> u64 {
        self.rounds_committed
    }
}

impl Strategy for RandomExploration {
    fn name(&self) -> &str {
        "Random Exploration"
    }

    fn execute(
        &mut self,
        runner: &mut SimulationRunner,
        groups: &SharedGroups,
    ) -> Result<(), StrategyError> {
        if groups.is_finished(&self.group) {
            info!(group = %self.group, "Group already finished; skipping exploration");
            self.skipped = true;
            return Ok(());
        }

        let ts = runner
            .initial_state()
            .environment()
            .transition_system()
            .ok_or_else(|| StrategyError::InvalidEnvironment {
                reason: String::from(
                    "random exploration requires a transition-system coordinated environment",
                ),
            })?;

        let mut connector = SimulatorConnector::new(runner);
        connector.setup()?;
        let mut rng = rand::rng();

        for run in 0..self.runs {
            if run > 0 {
                connector.reset()?;
            }

            let mut state = ts.initial_state();
            let mut safeguards = TraceSafeguards::new();

            for _ in 0..self.iterations_per_run {
                let successors = {
                    let context = HarnessContext {
                        harness: &connector,
                    };
                    ts.successors(state, &context, &safeguards)?
                };
                if successors.is_empty() {
                    debug!(%state, "Walk reached a state with no admissible successor");
                    break;
                }

                let index = rng.random_range(0..successors.len());
                let Some((event, target)) = successors.into_iter().nth(index) else {
                    break;
                };

                ts.event_scheduled(&event, &mut safeguards);
                connector.schedule_step(&event)?;
                if event.is_commit() {
                    connector.step()?;
                    self.rounds_committed = self.rounds_committed.saturating_add(1);
                }

                self.events_walked = self.events_walked.saturating_add(1);
                state = target;
            }
        }

        Ok(())
    }

    fn report(&self) -> String {
        let mut s = String::from("Random Exploration strategy\n");
        s.push_str("======================================================\n");
        if self.skipped {
            s.push_str(&format!(
                "Skipped: group '{}' was already finished.\n",
                self.group
            ));
        } else {
            s.push_str(&format!(
                "Events walked = {}\nRounds committed = {}\n",
                self.events_walked, self.rounds_committed
            ));
        }
        s.push_str(&format!("Running time = {}\n", self.chronometer));
        s
    }

    fn chronometer(&self) -> &Chronometer {
        &self.chronometer
    }

    fn chronometer_mut(&mut self) -> &mut Chronometer {
        &mut self.chronometer
    }
}
