//! The snapshot-backed synchronization context.
//!
//! Search states of the external verification engine carry a context so
//! the protocol's restriction rules and the verification algorithms can
//! consult the simulation without touching it: per-agent action-emission
//! status, and the propositional literals derived from the truth-valued
//! properties of the current snapshot.

use std::collections::BTreeSet;

use crucible_model::{PropertyError, SimulationSnapshot};
use crucible_protocol::{ContextView, Literal};
use crucible_types::{ActionStatus, AgentAction, AgentId};

/// A read-only context over one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SimulatorContext<'a> {
    snapshot: &'a SimulationSnapshot,
}

impl<'a> SimulatorContext<'a> {
    /// Create a context over the given snapshot.
    pub const fn new(snapshot: &'a SimulationSnapshot) -> Self {
        Self { snapshot }
    }

    /// The currently-true and currently-false propositional literals of
    /// the snapshot.
    ///
    /// Only truth-valued properties contribute; text and numeric
    /// observations are not propositions.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] when an observation fails.
    pub fn literals(&self) -> Result<BTreeSet<Literal>, PropertyError> {
        let mut literals = BTreeSet::new();

        for bearer in self.snapshot.bearers() {
            let view = self.snapshot.resolve_bearer(bearer)?;
            for property_id in bearer.properties() {
                let Some(property) = self.snapshot.property(*property_id) else {
                    return Err(PropertyError::UnknownProperty(*property_id));
                };
                if let Some(truth) = property.value(view)?.as_truth() {
                    let literal = if truth {
                        Literal::positive(property.name())
                    } else {
                        Literal::negative(property.name())
                    };
                    literals.insert(literal);
                }
            }
        }

        Ok(literals)
    }
}

impl ContextView for SimulatorContext<'_> {
    fn action_status(&self, agent: AgentId, action: &AgentAction) -> Option<ActionStatus> {
        self.snapshot
            .agent(agent)
            .map(|control| control.body().action_status(action))
    }
}
