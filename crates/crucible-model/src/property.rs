//! Properties, property bearers, and built-in observations.
//!
//! A [`Property`] computes an observation of a *property bearer* -- an
//! agent or the environment. Observations are text, numbers, or truth
//! values; truth-valued observations double as the propositional literals
//! the verification context exposes.

use serde::{Deserialize, Serialize};

use crucible_types::{AgentAction, AgentId, PropertyId, StimulationStatus, Stimulus};

use crate::agent::AgentControl;
use crate::environment::Environment;
use crate::error::{InstantiationError, PropertyError};

/// The value of a property at one instant.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// A free-form textual observation.
    Text(String),
    /// A numeric observation.
    Number(f64),
    /// A truth-valued observation (a propositional literal).
    Truth(bool),
}

impl PropertyValue {
    /// Render the value as a string, as stored in fossilized states.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
            Self::Truth(truth) => truth.to_string(),
        }
    }

    /// The value as a number.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NotNumeric`] for text and truth values;
    /// `property` names the offender in the error.
    pub fn as_number(&self, property: &str) -> Result<f64, PropertyError> {
        match self {
            Self::Number(number) => Ok(*number),
            Self::Text(_) | Self::Truth(_) => Err(PropertyError::NotNumeric {
                property: property.to_owned(),
            }),
        }
    }

    /// The value as a truth value, if it is one.
    pub const fn as_truth(&self) -> Option<bool> {
        match self {
            Self::Truth(truth) => Some(*truth),
            Self::Text(_) | Self::Number(_) => None,
        }
    }
}

/// A borrowed view of a property bearer.
#[derive(Clone, Copy)]
pub enum BearerRef<'a> {
    /// The bearer is an agent.
    Agent(&'a AgentControl),
    /// The bearer is the environment.
    Environment(&'a dyn Environment),
}

impl BearerRef<'_> {
    /// The bearer's name.
    pub fn name(&self) -> &str {
        match self {
            Self::Agent(agent) => agent.body().name(),
            Self::Environment(environment) => environment.name(),
        }
    }
}

/// The observation function of a property.
///
/// Implementations must be clone-boxable so snapshots can deep-clone.
pub trait PropertyFunction: Send + Sync + core::fmt::Debug {
    /// Compute the observation of the given bearer.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::IncompatibleBearer`] when the bearer is
    /// not of the kind this function observes.
    fn evaluate(&self, bearer: BearerRef<'_>) -> Result<PropertyValue, PropertyError>;

    /// Clone this function into a fresh box.
    fn clone_box(&self) -> Box<dyn PropertyFunction>;
}

impl Clone for Box<dyn PropertyFunction> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An id-keyed property instance.
#[derive(Debug, Clone)]
pub struct Property {
    id: PropertyId,
    name: String,
    function: Box<dyn PropertyFunction>,
}

impl Property {
    /// Create a property with the given observation function.
    pub fn new(
        id: PropertyId,
        name: impl Into<String>,
        function: Box<dyn PropertyFunction>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            function,
        }
    }

    /// The property's unique id.
    pub const fn id(&self) -> PropertyId {
        self.id
    }

    /// The property's user-friendly name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compute the observation of the given bearer.
    ///
    /// # Errors
    ///
    /// Propagates [`PropertyError`] from the observation function.
    pub fn value(&self, bearer: BearerRef<'_>) -> Result<PropertyValue, PropertyError> {
        self.function.evaluate(bearer)
    }

    /// Compute the observation rendered as a string.
    ///
    /// # Errors
    ///
    /// Propagates [`PropertyError`] from the observation function.
    pub fn value_as_string(&self, bearer: BearerRef<'_>) -> Result<String, PropertyError> {
        Ok(self.value(bearer)?.render())
    }
}

impl core::fmt::Display for Property {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Property '{}' ({})", self.name, self.id)
    }
}

/// What a property bearer stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BearerKind {
    /// The bearer is the agent with the given id.
    Agent(AgentId),
    /// The bearer is the environment.
    Environment,
}

/// A named bearer with the properties currently attached to it.
#[derive(Debug, Clone)]
pub struct PropertyBearer {
    name: String,
    kind: BearerKind,
    properties: Vec<PropertyId>,
}

impl PropertyBearer {
    /// Create a bearer with the given attached properties.
    pub fn new(name: impl Into<String>, kind: BearerKind, properties: Vec<PropertyId>) -> Self {
        Self {
            name: name.into(),
            kind,
            properties,
        }
    }

    /// The bearer's name, as used in fossilized keys.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the bearer stands for.
    pub const fn kind(&self) -> BearerKind {
        self.kind
    }

    /// The ids of the attached properties.
    pub fn properties(&self) -> &[PropertyId] {
        &self.properties
    }

    /// Attach another property.
    pub fn attach(&mut self, property: PropertyId) {
        if !self.properties.contains(&property) {
            self.properties.push(property);
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in behaviorist observations
// ---------------------------------------------------------------------------

/// Truth-valued: is the agent currently emitting the action?
#[derive(Debug, Clone)]
pub struct ActionEmitting {
    action: AgentAction,
}

impl ActionEmitting {
    /// Observe the emission of the given action.
    pub const fn new(action: AgentAction) -> Self {
        Self { action }
    }

    /// Parse from component parameters (`action`).
    ///
    /// # Errors
    ///
    /// Returns [`InstantiationError::MissingParameter`] without `action`.
    pub fn from_params(
        params: &std::collections::BTreeMap<String, String>,
    ) -> Result<Self, InstantiationError> {
        let action = params
            .get("action")
            .ok_or_else(|| InstantiationError::MissingParameter {
                component: String::from("action-emitting"),
                parameter: String::from("action"),
            })?;
        Ok(Self::new(AgentAction::new(action.clone())))
    }
}

impl PropertyFunction for ActionEmitting {
    fn evaluate(&self, bearer: BearerRef<'_>) -> Result<PropertyValue, PropertyError> {
        match bearer {
            BearerRef::Agent(agent) => Ok(PropertyValue::Truth(
                agent.body().action_status(&self.action) == crucible_types::ActionStatus::Emitting,
            )),
            BearerRef::Environment(_) => Err(PropertyError::IncompatibleBearer {
                property: format!("emitting({})", self.action.name()),
                bearer: bearer.name().to_owned(),
            }),
        }
    }

    fn clone_box(&self) -> Box<dyn PropertyFunction> {
        Box::new(self.clone())
    }
}

/// Truth-valued: is the stimulus currently in the given phase for the
/// agent?
#[derive(Debug, Clone)]
pub struct StimulusInPhase {
    stimulus: Stimulus,
    phase: StimulationStatus,
}

impl StimulusInPhase {
    /// Observe whether the stimulus sits in the phase.
    pub const fn new(stimulus: Stimulus, phase: StimulationStatus) -> Self {
        Self { stimulus, phase }
    }
}

impl PropertyFunction for StimulusInPhase {
    fn evaluate(&self, bearer: BearerRef<'_>) -> Result<PropertyValue, PropertyError> {
        match bearer {
            BearerRef::Agent(agent) => Ok(PropertyValue::Truth(
                agent.body().stimulation_status(&self.stimulus) == self.phase,
            )),
            BearerRef::Environment(_) => Err(PropertyError::IncompatibleBearer {
                property: format!("{}-is-{}", self.stimulus.name(), self.phase),
                bearer: bearer.name().to_owned(),
            }),
        }
    }

    fn clone_box(&self) -> Box<dyn PropertyFunction> {
        Box::new(self.clone())
    }
}

/// Numeric: how many of the agent's stimuli are currently in the given
/// phase?
#[derive(Debug, Clone)]
pub struct StimulationPhaseCount {
    phase: StimulationStatus,
}

impl StimulationPhaseCount {
    /// Count stimuli sitting in the given phase.
    pub const fn new(phase: StimulationStatus) -> Self {
        Self { phase }
    }
}

impl PropertyFunction for StimulationPhaseCount {
    fn evaluate(&self, bearer: BearerRef<'_>) -> Result<PropertyValue, PropertyError> {
        match bearer {
            BearerRef::Agent(agent) => {
                #[allow(clippy::cast_precision_loss)]
                let count = agent.body().stimuli_in_phase(self.phase).len() as f64;
                Ok(PropertyValue::Number(count))
            }
            BearerRef::Environment(_) => Err(PropertyError::IncompatibleBearer {
                property: format!("stimulation-count({})", self.phase),
                bearer: bearer.name().to_owned(),
            }),
        }
    }

    fn clone_box(&self) -> Box<dyn PropertyFunction> {
        Box::new(self.clone())
    }
}
