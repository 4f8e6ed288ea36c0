//! The action and stimulus vocabulary.
//!
//! Actions and stimuli are identified by name and immutable once created,
//! so the same value can be shared freely between agents, the environment,
//! and protocol events. Both types order and hash by name, which lets them
//! key the per-agent status maps and the trace safeguard sets.

use serde::{Deserialize, Serialize};

/// An action an agent can perform towards its environment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentAction(String);

impl AgentAction {
    /// Create an action with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The action's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AgentAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "action '{}'", self.0)
    }
}

impl From<&str> for AgentAction {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A stimulus the environment can apply to an agent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stimulus(String);

impl Stimulus {
    /// Create a stimulus with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The stimulus's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Stimulus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "stimulus '{}'", self.0)
    }
}

impl From<&str> for Stimulus {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
