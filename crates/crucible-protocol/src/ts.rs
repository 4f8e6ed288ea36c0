//! Transition-source contract and verification vocabulary.
//!
//! The external coordination/verification engine is a black box to the
//! simulator. It is consumed through two narrow surfaces:
//!
//! - [`TransitionSource`] -- the engine's transition relation over opaque
//!   state handles, emitting raw labels;
//! - [`AgentTransitionSystem`] -- the domain-facing wrapper that translates
//!   raw labels into protocol events and applies the restriction rules.
//!
//! The remaining types ([`Verdict`], [`SimulationPurpose`], [`SyncRecord`],
//! [`VerificationBounds`], [`Literal`]) form the vocabulary verification
//! algorithms speak when driving a simulation.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::event::ProtocolEvent;
use crate::restrict::{self, ContextView};
use crate::safeguards::TraceSafeguards;
use crate::translate::{RawLabel, translate};

/// An opaque handle to a state of the external transition system.
///
/// The engine owns the mapping from handles to whatever its states really
/// are; the simulator only threads handles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TsStateId(u64);

impl TsStateId {
    /// Wrap a raw state handle.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for TsStateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// The external engine's transition relation.
///
/// Implementations may intern new states on demand behind interior
/// mutability; enumeration must be deterministic for a given state.
pub trait TransitionSource: Send + Sync {
    /// The initial state of the transition system.
    fn initial_state(&self) -> TsStateId;

    /// The raw outgoing transitions of the given state.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Source`] when the engine cannot enumerate
    /// the state's successors.
    fn raw_successors(&self, state: TsStateId) -> Result<Vec<(RawLabel, TsStateId)>, ProtocolError>;
}

/// The domain-facing view of the external transition system.
///
/// Wraps a [`TransitionSource`] and exposes translated, restricted
/// successors. The wrapper is cheaply cloneable; the underlying source is
/// shared and immutable by contract.
#[derive(Clone)]
pub struct AgentTransitionSystem {
    source: Arc<dyn TransitionSource>,
}

impl AgentTransitionSystem {
    /// Wrap a transition source.
    pub fn new(source: Arc<dyn TransitionSource>) -> Self {
        Self { source }
    }

    /// The initial state of the transition system.
    pub fn initial_state(&self) -> TsStateId {
        self.source.initial_state()
    }

    /// The admissible successors of a state: raw transitions translated
    /// into protocol events, then filtered by the restriction rules
    /// against the given context and safeguards.
    ///
    /// # Errors
    ///
    /// Propagates [`ProtocolError`] from enumeration or translation.
    pub fn successors(
        &self,
        state: TsStateId,
        context: &dyn ContextView,
        safeguards: &TraceSafeguards,
    ) -> Result<Vec<(ProtocolEvent, TsStateId)>, ProtocolError> {
        let raw = self.source.raw_successors(state)?;
        let mut translated = Vec::with_capacity(raw.len());
        for (label, target) in &raw {
            translated.push((translate(label)?, *target));
        }
        Ok(restrict::restrict(context, translated, safeguards))
    }

    /// Update the safeguards after the given event is scheduled.
    pub fn event_scheduled(&self, event: &ProtocolEvent, safeguards: &mut TraceSafeguards) {
        restrict::event_scheduled(event, safeguards);
    }
}

impl core::fmt::Debug for AgentTransitionSystem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AgentTransitionSystem").finish_non_exhaustive()
    }
}

/// A propositional literal derived from a truth-valued property of the
/// current snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// The property name the literal stands for.
    pub name: String,
    /// Whether the property currently holds.
    pub positive: bool,
}

impl Literal {
    /// A literal asserting the named property holds.
    pub fn positive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positive: true,
        }
    }

    /// A literal asserting the named property does not hold.
    pub fn negative(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positive: false,
        }
    }
}

impl core::fmt::Display for Literal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.positive {
            write!(f, "{}", self.name)
        } else {
            write!(f, "!{}", self.name)
        }
    }
}

/// The outcome of a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The purpose was satisfied.
    Success,
    /// The purpose was refuted.
    Failure,
    /// The search ended without an answer (e.g. bounds exhausted).
    Inconclusive,
}

impl core::fmt::Display for Verdict {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
            Self::Inconclusive => write!(f, "INCONCLUSIVE"),
        }
    }
}

/// An externally defined goal automaton checked against the simulation's
/// transition system.
///
/// The simulator never inspects the purpose's structure; it only threads
/// the purpose through to the verification algorithm and names it in
/// reports.
pub trait SimulationPurpose: Send + Sync {
    /// A user-friendly name for the purpose.
    fn name(&self) -> &str;

    /// A user-friendly description of what the purpose states.
    fn description(&self) -> &str {
        ""
    }
}

/// One synchronization step of a verification trace.
///
/// Records which purpose event synchronized with which system event, at
/// what depth, and the propositional annotations that held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// The search depth of this step.
    pub depth: u64,
    /// The purpose-side event, if this step synchronized events.
    pub purpose_event: Option<ProtocolEvent>,
    /// The system-side event, if this step synchronized events.
    pub system_event: Option<ProtocolEvent>,
    /// The name of the purpose state reached.
    pub purpose_state: String,
    /// The literals that held at this step.
    pub literals: BTreeSet<Literal>,
}

impl core::fmt::Display for SyncRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[depth = {}]", self.depth)?;
        if let (Some(purpose), Some(system)) = (&self.purpose_event, &self.system_event) {
            let annotations: Vec<String> = self.literals.iter().map(ToString::to_string).collect();
            write!(
                f,
                " Events synch'd: <{purpose}, {system}>; Annotations: {{{}}}",
                annotations.join(", ")
            )?;
        }
        write!(f, " State (in purpose): {}", self.purpose_state)
    }
}

/// Bounds on a verification search, configured externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationBounds {
    /// The maximum search depth.
    pub max_depth: u64,
    /// The maximum number of synchronization steps, if bounded.
    pub max_sync_steps: Option<u64>,
}

impl Default for VerificationBounds {
    fn default() -> Self {
        Self {
            max_depth: 1_000,
            max_sync_steps: None,
        }
    }
}
