//! Simulation strategies and the experiment driver.
//!
//! A strategy is an algorithm that drives the stepper/runner (optionally
//! through the verification connector) to produce a textual result. An
//! experiment is a named collection of strategies executed sequentially.
//!
//! # Modules
//!
//! - [`strategy`] -- the [`Strategy`] capability, chronometer, shared
//!   finished-group set, and strategy errors
//! - [`standard`] -- plain simulation runs
//! - [`exploration`] -- bounded random walks over the transition system
//! - [`verification`] -- simulation-purpose verification
//! - [`optimization`] -- combinatorial stimulus-delivery optimization
//! - [`combinatorics`] -- the deterministic and random combination
//!   generators
//! - [`experiment`] -- the experiment driver and its report
//! - [`config`] -- experiment configuration loaded from YAML
//!
//! [`Strategy`]: strategy::Strategy

pub mod combinatorics;
pub mod config;
pub mod experiment;
pub mod exploration;
pub mod optimization;
pub mod standard;
pub mod strategy;
pub mod verification;

pub use combinatorics::{CombinationError, CombinationIterator, RandomCombinationIterator};
pub use config::{ConfigError, ExperimentConfig};
pub use experiment::{Experiment, ExperimentReport, StrategyOutcome};
pub use exploration::RandomExploration;
pub use optimization::{StimulusDeliveryOptimization, TargetSampling};
pub use standard::StandardSimulation;
pub use strategy::{Chronometer, SharedGroups, Strategy, StrategyError};
pub use verification::PurposeVerification;
