//! Error types for the execution engine.

use crucible_model::{EnvironmentError, PropertyError};
use crucible_types::StorageMode;

/// Errors raised by the run ledger and the stepper.
///
/// Ledger errors are structural invariant violations: they are never
/// retried, and the current run must be set up again to recover.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// An appended state's position was not the next one.
    #[error("state position {found} is not the next position {expected} of the run")]
    NonContiguous {
        /// The position the run would accept.
        expected: u64,
        /// The position the state carried.
        found: u64,
    },

    /// A restart target lies beyond the next position of the run.
    #[error("state position {found} cannot be greater than the current position + 1 ({limit})")]
    PositionAhead {
        /// The largest admissible position.
        limit: u64,
        /// The position the state carried.
        found: u64,
    },

    /// A position does not fit the address space of the trace.
    #[error("state position {position} does not fit in memory")]
    PositionOverflow {
        /// The offending position.
        position: u64,
    },

    /// A fossilized trace was requested from a run that stored nothing.
    #[error("cannot get a fossilized trace because states were not being stored")]
    NothingStored,

    /// A full trace was requested from a run that did not keep full
    /// snapshots.
    #[error("cannot get a full trace from a run in {mode} storage mode")]
    FullTraceUnavailable {
        /// The run's actual storage mode.
        mode: StorageMode,
    },

    /// `run_steps` was asked for zero steps.
    #[error("the number of steps to run must be positive")]
    NoSteps,

    /// A run was reset before ever being set up.
    #[error("the simulation run must already exist in order to be reset")]
    NoRun,

    /// A property observation failed during stepping or fossilization.
    #[error("property error: {source}")]
    Property {
        /// The underlying property error.
        #[from]
        source: PropertyError,
    },

    /// The environment failed during stepping.
    #[error("environment error: {source}")]
    Environment {
        /// The underlying environment error.
        #[from]
        source: EnvironmentError,
    },
}

/// The single error the simulator connector reports to the external
/// verification engine.
#[derive(Debug, thiserror::Error)]
#[error("invalid simulator request: {reason}")]
pub struct InvalidRequest {
    /// What went wrong, as reported to the engine.
    reason: String,
}

impl InvalidRequest {
    /// Create a request error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reported reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<RunError> for InvalidRequest {
    fn from(source: RunError) -> Self {
        Self::new(format!("there was an error during the simulation run: {source}"))
    }
}

impl From<PropertyError> for InvalidRequest {
    fn from(source: PropertyError) -> Self {
        Self::new(format!("a property was referenced incorrectly: {source}"))
    }
}

impl From<EnvironmentError> for InvalidRequest {
    fn from(source: EnvironmentError) -> Self {
        Self::new(format!("the environment rejected the request: {source}"))
    }
}
