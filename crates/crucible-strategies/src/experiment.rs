//! The experiment driver.
//!
//! An experiment is, essentially, a named collection of simulation
//! strategies to be executed sequentially against one runner. The driver
//! owns the shared finished-group set, times each strategy, and collects
//! the reports. A strategy failure stops the experiment; strategies that
//! completed before the failure still report their results.

use std::time::Duration;

use tracing::{error, info};

use crucible_engine::{SimulationRunner, VerificationAlgorithm};
use crucible_protocol::SimulationPurpose;
use crucible_types::{PropertyId, Stimulus};

use crate::exploration::RandomExploration;
use crate::optimization::StimulusDeliveryOptimization;
use crate::standard::StandardSimulation;
use crate::strategy::{SharedGroups, Strategy, StrategyError};
use crate::verification::PurposeVerification;

/// The outcome of one strategy within an experiment.
#[derive(Debug)]
pub struct StrategyOutcome {
    /// The strategy's name.
    pub name: String,
    /// The strategy's textual report (partial results on failure).
    pub report: String,
    /// How long the strategy ran.
    pub running_time: Duration,
    /// The failure that aborted the strategy, if any.
    pub error: Option<String>,
}

/// The collected results of one experiment execution.
#[derive(Debug, Default)]
pub struct ExperimentReport {
    /// The experiment's name.
    pub name: String,
    /// Per-strategy outcomes, in execution order.
    pub outcomes: Vec<StrategyOutcome>,
}

impl ExperimentReport {
    /// Whether every strategy completed.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.error.is_none())
    }
}

impl core::fmt::Display for ExperimentReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Experiment '{}'", self.name)?;
        for outcome in &self.outcomes {
            writeln!(f, "\n{}", outcome.report)?;
            if let Some(error) = &outcome.error {
                writeln!(f, "Error: {error}")?;
            }
        }
        Ok(())
    }
}

/// A named collection of simulation strategies.
pub struct Experiment {
    name: String,
    description: String,
    strategies: Vec<Box<dyn Strategy>>,
    groups: SharedGroups,
}

impl Experiment {
    /// Create an empty experiment.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            strategies: Vec::new(),
            groups: SharedGroups::new(),
        }
    }

    /// The experiment's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The experiment's description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The shared finished-group set of this experiment.
    pub const fn groups(&self) -> &SharedGroups {
        &self.groups
    }

    /// Add an already-built strategy.
    pub fn add_strategy(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
    }

    /// Add a standard simulation strategy.
    ///
    /// # Errors
    ///
    /// Propagates construction errors.
    pub fn add_standard_simulation(
        &mut self,
        runs: u32,
        iterations_per_run: u32,
    ) -> Result<(), StrategyError> {
        self.add_strategy(Box::new(StandardSimulation::new(runs, iterations_per_run)?));
        Ok(())
    }

    /// Add a random exploration strategy.
    ///
    /// # Errors
    ///
    /// Propagates construction errors.
    pub fn add_random_exploration(
        &mut self,
        runs: u32,
        iterations_per_run: u32,
        group: impl Into<String>,
    ) -> Result<(), StrategyError> {
        self.add_strategy(Box::new(RandomExploration::new(
            runs,
            iterations_per_run,
            group,
        )?));
        Ok(())
    }

    /// Add a simulation-purpose verification strategy.
    pub fn add_purpose_verification(
        &mut self,
        purpose: Box<dyn SimulationPurpose>,
        algorithm: Box<dyn VerificationAlgorithm>,
        group: impl Into<String>,
    ) {
        self.add_strategy(Box::new(PurposeVerification::new(purpose, algorithm, group)));
    }

    /// Add a stimulus-delivery optimization strategy.
    ///
    /// # Errors
    ///
    /// Propagates construction errors.
    #[allow(clippy::too_many_arguments)]
    pub fn add_stimulus_delivery_optimization(
        &mut self,
        runs: u32,
        iterations_per_run: u32,
        stimulus: Stimulus,
        property: PropertyId,
        bearer: impl Into<String>,
        group_size: usize,
    ) -> Result<(), StrategyError> {
        self.add_strategy(Box::new(StimulusDeliveryOptimization::new(
            runs,
            iterations_per_run,
            stimulus,
            property,
            bearer,
            group_size,
        )?));
        Ok(())
    }

    /// Execute every strategy sequentially against the runner.
    ///
    /// Returns the collected reports. On the first failure the experiment
    /// stops; the failing strategy's partial report and error are
    /// recorded, and the remaining strategies are not executed.
    pub fn run(&mut self, runner: &mut SimulationRunner) -> ExperimentReport {
        info!(experiment = %self.name, strategies = self.strategies.len(), "Experiment starting");

        let mut report = ExperimentReport {
            name: self.name.clone(),
            outcomes: Vec::with_capacity(self.strategies.len()),
        };

        for strategy in &mut self.strategies {
            info!(strategy = strategy.name(), "Running strategy");

            strategy.chronometer_mut().start();
            let result = strategy.execute(runner, &self.groups);
            strategy.chronometer_mut().stop();

            let failed = result.is_err();
            let outcome = StrategyOutcome {
                name: strategy.name().to_owned(),
                report: strategy.report(),
                running_time: strategy.chronometer().running_time(),
                error: result.err().map(|e| e.to_string()),
            };
            report.outcomes.push(outcome);

            if failed {
                error!(
                    experiment = %self.name,
                    strategy = report.outcomes.last().map_or("", |o| o.name.as_str()),
                    "Strategy failed; stopping the experiment"
                );
                break;
            }
        }

        info!(experiment = %self.name, success = report.is_success(), "Experiment finished");
        report
    }
}

impl core::fmt::Debug for Experiment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Experiment")
            .field("name", &self.name)
            .field("strategies", &self.strategies.len())
            .finish_non_exhaustive()
    }
}
