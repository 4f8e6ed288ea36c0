//! The event-protocol layer of the Crucible simulator.
//!
//! The coordination between a simulation and an external transition-system
//! verification engine happens through a small vocabulary of events: agents
//! propose actions (inputs to the coordination structure), the environment
//! delivers stimulation phases (outputs of it), and a distinguished `commit`
//! event marks the boundary of each synchronization round.
//!
//! This crate owns the pure half of that protocol:
//!
//! - [`event`] -- [`ProtocolEvent`], directions, complementarity, and the
//!   reserved channel names
//! - [`translate`] -- rewriting the engine's raw transition labels into
//!   domain events
//! - [`safeguards`] -- the per-round trace safeguard sets
//! - [`restrict`] -- the restriction rules that drop inconsistent successor
//!   proposals, and the safeguard bookkeeping on scheduling
//! - [`ts`] -- the transition-source contract, verdicts, purposes, and
//!   verification bounds
//!
//! The runner-facing half (the concrete connector and context) lives in
//! `crucible-engine`, which knows about simulation snapshots.
//!
//! [`ProtocolEvent`]: event::ProtocolEvent

pub mod error;
pub mod event;
pub mod restrict;
pub mod safeguards;
pub mod translate;
pub mod ts;

pub use error::ProtocolError;
pub use event::{Direction, ProtocolEvent, channel};
pub use restrict::{ContextView, event_scheduled, restrict};
pub use safeguards::TraceSafeguards;
pub use translate::{RawLabel, translate};
pub use ts::{
    AgentTransitionSystem, Literal, SimulationPurpose, SyncRecord, TransitionSource, TsStateId,
    Verdict, VerificationBounds,
};
