//! The state snapshot model of the Crucible simulator.
//!
//! A [`SimulationSnapshot`] captures one simulation instant: the
//! environment that coordinates the agents, the ordered agent roster, the
//! relations between agents, and the properties observing them. Snapshots
//! deep-clone structurally; the clone is the unit of time travel and of
//! verification state exploration.
//!
//! # Modules
//!
//! - [`agent`] -- agent controls, behaviors, and the roster
//! - [`relation`] -- id-keyed binary adjacency structures over agents
//! - [`property`] -- properties, property bearers, and built-in
//!   behaviorist observations
//! - [`environment`] -- the environment capability and its basic and
//!   coordinated implementations
//! - [`snapshot`] -- the snapshot itself and fossilization
//! - [`fossil`] -- the compact fossilized projection
//! - [`scenario`] -- the scenario and component-registry contracts
//!
//! [`SimulationSnapshot`]: snapshot::SimulationSnapshot

pub mod agent;
pub mod environment;
pub mod error;
pub mod fossil;
pub mod property;
pub mod relation;
pub mod scenario;
pub mod snapshot;

pub use agent::{AgentBehavior, AgentBody, AgentControl, AgentRoster, InertBehavior};
pub use environment::{BasicEnvironment, CoordinatedEnvironment, Environment};
pub use error::{EnvironmentError, InstantiationError, PropertyError};
pub use fossil::FossilizedState;
pub use property::{
    ActionEmitting, BearerKind, BearerRef, Property, PropertyBearer, PropertyFunction,
    PropertyValue, StimulationPhaseCount, StimulusInPhase,
};
pub use relation::Relation;
pub use scenario::{ComponentRegistry, Scenario};
pub use snapshot::SimulationSnapshot;
