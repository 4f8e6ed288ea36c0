//! The execution engine of the Crucible simulator.
//!
//! This crate owns the bookkeeping around simulation runs:
//!
//! - [`run`] -- the run ledger: a positioned, contiguous history of
//!   snapshots under a chosen storage mode
//! - [`runner`] -- the stepper that advances one snapshot to the next and
//!   supports re-entry to an arbitrary earlier position
//! - [`harness`] -- the contract an external verification algorithm drives
//!   a simulation through, and the algorithm contract itself
//! - [`connector`] -- the concrete harness over a [`SimulationRunner`]
//! - [`context`] -- the snapshot-backed synchronization context
//!
//! [`SimulationRunner`]: runner::SimulationRunner

pub mod connector;
pub mod context;
pub mod error;
pub mod harness;
pub mod run;
pub mod runner;

pub use connector::SimulatorConnector;
pub use context::SimulatorContext;
pub use error::{InvalidRequest, RunError};
pub use harness::{SimulatorHarness, VerificationAlgorithm};
pub use run::SimulationRun;
pub use runner::SimulationRunner;
