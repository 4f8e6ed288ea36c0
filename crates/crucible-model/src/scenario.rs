//! Scenario and component-registry contracts.
//!
//! A scenario defines abstractly the entities present in a simulation and
//! only turns them into component instances when the initial state is
//! created. Component construction goes through the [`ComponentRegistry`],
//! an explicit compiled-in manifest from component names to factory
//! functions taking typed parameter maps -- there is no runtime
//! introspection.

use std::collections::BTreeMap;

use crucible_types::StimulationStatus;

use crate::agent::{AgentBehavior, InertBehavior};
use crate::error::InstantiationError;
use crate::property::{
    ActionEmitting, PropertyFunction, StimulationPhaseCount, StimulusInPhase,
};
use crate::snapshot::SimulationSnapshot;

/// Named parameters for one component instantiation.
pub type ComponentParams = BTreeMap<String, String>;

/// Factory for agent behaviors.
pub type BehaviorFactory = fn(&ComponentParams) -> Result<Box<dyn AgentBehavior>, InstantiationError>;

/// Factory for property observation functions.
pub type PropertyFactory =
    fn(&ComponentParams) -> Result<Box<dyn PropertyFunction>, InstantiationError>;

/// The compiled-in component manifest.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    behaviors: BTreeMap<String, BehaviorFactory>,
    properties: BTreeMap<String, PropertyFactory>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            behaviors: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Create a registry with the built-in components registered.
    ///
    /// Behaviors: `inert`. Properties: `action-emitting` (parameter
    /// `action`), `stimulus-in-phase` (parameters `stimulus`, `phase`),
    /// `stimulation-phase-count` (parameter `phase`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_behavior("inert", |_| Ok(Box::new(InertBehavior)));
        registry.register_property("action-emitting", |params| {
            Ok(Box::new(ActionEmitting::from_params(params)?))
        });
        registry.register_property("stimulus-in-phase", make_stimulus_in_phase);
        registry.register_property("stimulation-phase-count", make_phase_count);
        registry
    }

    /// Register a behavior factory under the given name.
    pub fn register_behavior(&mut self, name: impl Into<String>, factory: BehaviorFactory) {
        self.behaviors.insert(name.into(), factory);
    }

    /// Register a property-function factory under the given name.
    pub fn register_property(&mut self, name: impl Into<String>, factory: PropertyFactory) {
        self.properties.insert(name.into(), factory);
    }

    /// Instantiate a behavior by component name.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiationError::UnknownComponent`] for unregistered
    /// names, or whatever the factory reports.
    pub fn create_behavior(
        &self,
        name: &str,
        params: &ComponentParams,
    ) -> Result<Box<dyn AgentBehavior>, InstantiationError> {
        let factory =
            self.behaviors
                .get(name)
                .ok_or_else(|| InstantiationError::UnknownComponent {
                    kind: "behavior",
                    name: name.to_owned(),
                })?;
        factory(params)
    }

    /// Instantiate a property function by component name.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiationError::UnknownComponent`] for unregistered
    /// names, or whatever the factory reports.
    pub fn create_property(
        &self,
        name: &str,
        params: &ComponentParams,
    ) -> Result<Box<dyn PropertyFunction>, InstantiationError> {
        let factory =
            self.properties
                .get(name)
                .ok_or_else(|| InstantiationError::UnknownComponent {
                    kind: "property",
                    name: name.to_owned(),
                })?;
        factory(params)
    }
}

/// A simulation scenario.
///
/// Scenario parsing is an external concern; the engine only needs the
/// resulting initial snapshot.
pub trait Scenario {
    /// A user-friendly name for the scenario.
    fn name(&self) -> &str;

    /// A user-friendly description of the scenario.
    fn description(&self) -> &str {
        ""
    }

    /// Build the initial simulation state, instantiating components
    /// through the registry.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiationError`] when a component cannot be built.
    fn create_initial_state(
        &self,
        registry: &ComponentRegistry,
    ) -> Result<SimulationSnapshot, InstantiationError>;
}

fn require<'a>(
    component: &str,
    params: &'a ComponentParams,
    key: &str,
) -> Result<&'a str, InstantiationError> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| InstantiationError::MissingParameter {
            component: component.to_owned(),
            parameter: key.to_owned(),
        })
}

fn parse_phase(component: &str, value: &str) -> Result<StimulationStatus, InstantiationError> {
    match value {
        "absent" => Ok(StimulationStatus::Absent),
        "beginning" => Ok(StimulationStatus::Beginning),
        "stable" => Ok(StimulationStatus::Stable),
        "ending" => Ok(StimulationStatus::Ending),
        other => Err(InstantiationError::InvalidParameter {
            component: component.to_owned(),
            parameter: String::from("phase"),
            reason: format!("'{other}' is not a stimulation phase"),
        }),
    }
}

fn make_stimulus_in_phase(
    params: &ComponentParams,
) -> Result<Box<dyn PropertyFunction>, InstantiationError> {
    let component = "stimulus-in-phase";
    let stimulus = require(component, params, "stimulus")?;
    let phase = parse_phase(component, require(component, params, "phase")?)?;
    Ok(Box::new(StimulusInPhase::new(
        crucible_types::Stimulus::new(stimulus),
        phase,
    )))
}

fn make_phase_count(
    params: &ComponentParams,
) -> Result<Box<dyn PropertyFunction>, InstantiationError> {
    let component = "stimulation-phase-count";
    let phase = parse_phase(component, require(component, params, "phase")?)?;
    Ok(Box::new(StimulationPhaseCount::new(phase)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ComponentParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn builtins_are_registered() {
        let registry = ComponentRegistry::with_builtins();
        assert!(registry.create_behavior("inert", &params(&[])).is_ok());
        assert!(
            registry
                .create_property("action-emitting", &params(&[("action", "wave")]))
                .is_ok()
        );
        assert!(
            registry
                .create_property(
                    "stimulus-in-phase",
                    &params(&[("stimulus", "light"), ("phase", "stable")])
                )
                .is_ok()
        );
    }

    #[test]
    fn unknown_component_is_rejected() {
        let registry = ComponentRegistry::with_builtins();
        assert!(matches!(
            registry.create_behavior("reflex", &params(&[])),
            Err(InstantiationError::UnknownComponent { .. })
        ));
    }

    #[test]
    fn missing_parameter_is_reported() {
        let registry = ComponentRegistry::with_builtins();
        assert!(matches!(
            registry.create_property("action-emitting", &params(&[])),
            Err(InstantiationError::MissingParameter { .. })
        ));
    }

    #[test]
    fn invalid_phase_is_reported() {
        let registry = ComponentRegistry::with_builtins();
        assert!(matches!(
            registry.create_property(
                "stimulation-phase-count",
                &params(&[("phase", "wobbling")])
            ),
            Err(InstantiationError::InvalidParameter { .. })
        ));
    }
}
