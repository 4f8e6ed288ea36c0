//! Combinatorial stimulus-delivery optimization.
//!
//! Given a stimulus, a group size `k`, and a numeric property, searches
//! for the sequence of `k` agents (repeats allowed) that maximizes the
//! property's value when the stimulus is delivered to them at the start
//! of the simulation. Each candidate sequence is scored by the mean
//! property value over `runs` repetitions of `iterations_per_run` steps,
//! with the run reset between candidates. Ties keep the first-found
//! maximum.

use tracing::{debug, info};

use crucible_engine::{RunError, SimulationRunner};
use crucible_types::{AgentId, ExecutionMode, PropertyId, StimulationStatus, Stimulus,
    StorageMode};

use crate::combinatorics::{CombinationError, CombinationIterator, RandomCombinationIterator};
use crate::strategy::{Chronometer, SharedGroups, Strategy, StrategyError};

/// How candidate target sequences are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSampling {
    /// Enumerate every length-`k` sequence deterministically.
    Exhaustive,
    /// Draw the given number of sequences uniformly with replacement.
    Random {
        /// How many candidate sequences to score.
        trials: usize,
    },
}

impl Default for TargetSampling {
    fn default() -> Self {
        Self::Random { trials: 200 }
    }
}

/// Searches for the best sequence of agents to stimulate.
#[derive(Debug)]
pub struct StimulusDeliveryOptimization {
    runs: u32,
    iterations_per_run: u32,
    stimulus: Stimulus,
    property: PropertyId,
    bearer: String,
    group_size: usize,
    sampling: TargetSampling,
    property_name: Option<String>,
    best: Option<(Vec<AgentId>, f64)>,
    chronometer: Chronometer,
}

impl StimulusDeliveryOptimization {
    /// Create the strategy.
    ///
    /// `property` must identify a numeric property of the snapshot, and
    /// `bearer` the name of the property bearer to score it against.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::InvalidParameter`] when a count or the
    /// group size is zero.
    pub fn new(
        runs: u32,
        iterations_per_run: u32,
        stimulus: Stimulus,
        property: PropertyId,
        bearer: impl Into<String>,
        group_size: usize,
    ) -> Result<Self, StrategyError> {
        if runs == 0 {
            return Err(StrategyError::InvalidParameter {
                strategy: "stimulus delivery optimization",
                parameter: "runs",
                reason: String::from("must be positive"),
            });
        }
        if iterations_per_run == 0 {
            return Err(StrategyError::InvalidParameter {
                strategy: "stimulus delivery optimization",
                parameter: "iterations_per_run",
                reason: String::from("must be positive"),
            });
        }
        if group_size == 0 {
            return Err(StrategyError::InvalidParameter {
                strategy: "stimulus delivery optimization",
                parameter: "group_size",
                reason: String::from("must be positive"),
            });
        }

        Ok(Self {
            runs,
            iterations_per_run,
            stimulus,
            property,
            bearer: bearer.into(),
            group_size,
            sampling: TargetSampling::default(),
            property_name: None,
            best: None,
            chronometer: Chronometer::new(),
        })
    }

    /// Use the given target-sampling mode instead of the default 200
    /// random trials.
    #[must_use]
    pub const fn with_sampling(mut self, sampling: TargetSampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// The best target sequence found and its mean property value.
    pub fn best(&self) -> Option<(&[AgentId], f64)> {
        self.best
            .as_ref()
            .map(|(target, value)| (target.as_slice(), *value))
    }

    /// Score one candidate target sequence.
    fn score_target(
        &self,
        runner: &mut SimulationRunner,
        target: &[AgentId],
        property_name: &str,
    ) -> Result<f64, StrategyError> {
        let mut mean = 0.0_f64;

        for _ in 0..self.runs {
            // Deliver the stimulus to the selected agents.
            let current = runner.current_state_mut().ok_or(RunError::NoRun)?;
            for agent_id in target {
                let agent = current.agents_mut().get_mut(*agent_id).ok_or(
                    crucible_model::PropertyError::MissingAgent(*agent_id),
                )?;
                agent
                    .body_mut()
                    .receive_stimulus(self.stimulus.clone(), StimulationStatus::Beginning);
            }

            // Simulate.
            runner.run_steps(u64::from(self.iterations_per_run))?;

            // Apply the property to the chosen bearer.
            let value = runner
                .current_state()
                .evaluate(self.property, &self.bearer)?
                .as_number(property_name)?;
            mean += value / f64::from(self.runs);
        }

        Ok(mean)
    }
}

impl Strategy for StimulusDeliveryOptimization {
    fn name(&self) -> &str {
        "Stimulus Delivery Optimization"
    }

    fn execute(
        &mut self,
        runner: &mut SimulationRunner,
        _groups: &SharedGroups,
    ) -> Result<(), StrategyError> {
        runner.setup_run(StorageMode::None, ExecutionMode::Exploration)?;

        let ids = runner.current_state().agents().ids();
        let property_name = runner
            .current_state()
            .property(self.property)
            .ok_or(crucible_model::PropertyError::UnknownProperty(self.property))?
            .name()
            .to_owned();

        let targets: Box<dyn Iterator<Item = Vec<AgentId>>> = match self.sampling {
            TargetSampling::Exhaustive => Box::new(
                CombinationIterator::new(ids, self.group_size).map_err(invalid_combination)?,
            ),
            TargetSampling::Random { trials } => Box::new(
                RandomCombinationIterator::new(ids, self.group_size, trials)
                    .map_err(invalid_combination)?,
            ),
        };

        for target in targets {
            // Refresh the initial state for this candidate.
            runner.reset_run()?;

            let value = self.score_target(runner, &target, &property_name)?;
            debug!(?target, value, "Scored target sequence");

            // Strict improvement keeps the first-found maximum on ties.
            if self.best.as_ref().is_none_or(|(_, best)| value > *best) {
                self.best = Some((target, value));
            }
        }

        if let Some((target, value)) = &self.best {
            info!(?target, value, "Best stimulation target found");
        }
        self.property_name = Some(property_name);
        Ok(())
    }

    fn report(&self) -> String {
        let mut s = String::from("Stimulus Delivery Optimization strategy\n");
        s.push_str("======================================================\n");

        match &self.best {
            Some((target, value)) => {
                s.push_str("Best sequence of agents to deliver the stimulus:\n");
                for agent_id in target {
                    s.push_str(&format!("  ID = {agent_id}\n"));
                }
                s.push_str("Optimized property:\n");
                if let Some(name) = &self.property_name {
                    s.push_str(&format!("  Property's name = {name}\n"));
                }
                s.push_str(&format!("  Property's value = {value}\n"));
            }
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

fn invalid_combination(source: CombinationError) -> StrategyError {
    StrategyError::InvalidParameter {
        strategy: "stimulus delivery optimization",
        parameter: "group_size",
        reason: source.to_string(),
    }
}
