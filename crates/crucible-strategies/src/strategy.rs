//! The strategy capability and its shared support types.
//!
//! Strategies share a name, a chronometer, and -- for group-tagged
//! strategies -- the finished-group set owned by the experiment driver.
//! Once a verification strategy in a group succeeds, sibling strategies
//! in the same group execute as no-ops.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crucible_engine::{InvalidRequest, RunError, SimulationRunner};
use crucible_model::PropertyError;
use crucible_protocol::ProtocolError;

/// Errors raised by strategy construction and execution.
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    /// A constructor parameter was rejected.
    #[error("strategy '{strategy}' rejected parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The strategy being built.
        strategy: &'static str,
        /// The offending parameter.
        parameter: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The configured environment lacks a capability the strategy needs.
    #[error("invalid environment: {reason}")]
    InvalidEnvironment {
        /// The missing capability.
        reason: String,
    },

    /// A strategy that consumes its inputs was executed twice.
    #[error("strategy '{strategy}' was already executed")]
    AlreadyExecuted {
        /// The strategy's name.
        strategy: &'static str,
    },

    /// The runner failed.
    #[error("simulation run error: {source}")]
    Run {
        /// The underlying run error.
        #[from]
        source: RunError,
    },

    /// A property observation failed.
    #[error("property error: {source}")]
    Property {
        /// The underlying property error.
        #[from]
        source: PropertyError,
    },

    /// The protocol layer failed.
    #[error("protocol error: {source}")]
    Protocol {
        /// The underlying protocol error.
        #[from]
        source: ProtocolError,
    },

    /// The simulator rejected a connector request.
    #[error("simulator request error: {source}")]
    Request {
        /// The underlying request error.
        #[from]
        source: InvalidRequest,
    },
}

/// Wall-clock markers around a strategy's execution.
#[derive(Debug, Clone, Default)]
pub struct Chronometer {
    started_at: Option<DateTime<Utc>>,
    begun: Option<Instant>,
    elapsed: Option<Duration>,
}

impl Chronometer {
    /// Create a chronometer that has never run.
    pub const fn new() -> Self {
        Self {
            started_at: None,
            begun: None,
            elapsed: None,
        }
    }

    /// Mark the start of a measurement.
    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
        self.begun = Some(Instant::now());
        self.elapsed = None;
    }

    /// Mark the end of a measurement.
    pub fn stop(&mut self) {
        if let Some(begun) = self.begun.take() {
            self.elapsed = Some(begun.elapsed());
        }
    }

    /// When the measurement started, in wall-clock time.
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// The measured running time; zero if never stopped.
    pub fn running_time(&self) -> Duration {
        self.elapsed.unwrap_or(Duration::ZERO)
    }
}

impl core::fmt::Display for Chronometer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.3}s", self.running_time().as_secs_f64())
    }
}

/// The shared set of finished strategy groups.
///
/// Owned by the experiment driver and passed to every strategy execution.
/// Appended to only by verification strategies that reach success;
/// read-checked by every group-tagged strategy before executing. The
/// mutex is the mutual-exclusion discipline the set would need if
/// strategies were ever parallelized; today execution is sequential.
#[derive(Debug, Clone, Default)]
pub struct SharedGroups {
    groups: Arc<Mutex<BTreeSet<String>>>,
}

impl SharedGroups {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the named group has been finished.
    pub fn is_finished(&self, group: &str) -> bool {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(group)
    }

    /// Mark the named group as finished.
    pub fn mark_finished(&self, group: impl Into<String>) {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(group.into());
    }
}

/// A pluggable simulation strategy.
pub trait Strategy {
    /// The strategy's user-friendly name.
    fn name(&self) -> &str;

    /// Execute the strategy against the given runner.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError`] when execution fails; the experiment
    /// driver aborts on the first failure.
    fn execute(
        &mut self,
        runner: &mut SimulationRunner,
        groups: &SharedGroups,
    ) -> Result<(), StrategyError>;

    /// A textual description of the strategy's status and results.
    fn report(&self) -> String;

    /// The strategy's chronometer.
    fn chronometer(&self) -> &Chronometer;

    /// The strategy's chronometer, mutably.
    fn chronometer_mut(&mut self) -> &mut Chronometer;
}
