//! The simulation snapshot: one instant of a run.
//!
//! A snapshot bundles the environment, the ordered agent roster, the
//! relations, the properties, and the property bearers, together with its
//! position in the run. Cloning a snapshot is a structural deep copy --
//! the clone is the unit of time travel and of verification state
//! exploration, and must not alias mutable agent or relation state with
//! the original.

use std::collections::BTreeMap;

use crucible_types::{AgentId, PropertyId, RelationId};

use crate::agent::{AgentControl, AgentRoster};
use crate::environment::Environment;
use crate::error::PropertyError;
use crate::fossil::FossilizedState;
use crate::property::{BearerKind, BearerRef, Property, PropertyBearer, PropertyValue};
use crate::relation::Relation;

/// One simulation instant.
#[derive(Debug, Clone)]
pub struct SimulationSnapshot {
    /// The position of this state within a simulation run.
    position: u64,
    environment: Box<dyn Environment>,
    agents: AgentRoster,
    relations: Vec<Relation>,
    properties: Vec<Property>,
    bearers: Vec<PropertyBearer>,
}

impl SimulationSnapshot {
    /// Assemble a snapshot at position 0.
    pub fn new(
        environment: Box<dyn Environment>,
        agents: AgentRoster,
        relations: Vec<Relation>,
        properties: Vec<Property>,
        bearers: Vec<PropertyBearer>,
    ) -> Self {
        Self {
            position: 0,
            environment,
            agents,
            relations,
            properties,
            bearers,
        }
    }

    /// The snapshot's position within its run.
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Set the snapshot's position.
    pub const fn set_position(&mut self, position: u64) {
        self.position = position;
    }

    /// The environment.
    pub fn environment(&self) -> &dyn Environment {
        self.environment.as_ref()
    }

    /// The environment, mutably.
    pub fn environment_mut(&mut self) -> &mut dyn Environment {
        self.environment.as_mut()
    }

    /// The agent roster.
    pub const fn agents(&self) -> &AgentRoster {
        &self.agents
    }

    /// The agent roster, mutably.
    pub const fn agents_mut(&mut self) -> &mut AgentRoster {
        &mut self.agents
    }

    /// The environment and the roster, both mutably.
    ///
    /// The runner steps the environment against the roster; the two live
    /// in disjoint fields, so the split borrow is safe.
    pub const fn coordination_mut(&mut self) -> (&mut Box<dyn Environment>, &mut AgentRoster) {
        (&mut self.environment, &mut self.agents)
    }

    /// Look up an agent control by id.
    pub fn agent(&self, id: AgentId) -> Option<&AgentControl> {
        self.agents.get(id)
    }

    /// The relations of this instant.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Look up a relation by id.
    pub fn relation(&self, id: RelationId) -> Option<&Relation> {
        self.relations.iter().find(|r| r.id() == id)
    }

    /// The properties of this instant.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Look up a property by id.
    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.iter().find(|p| p.id() == id)
    }

    /// The property bearers of this instant.
    pub fn bearers(&self) -> &[PropertyBearer] {
        &self.bearers
    }

    /// Resolve a bearer to a borrowed view of what it stands for.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::MissingAgent`] when an agent bearer points
    /// outside the roster.
    pub fn resolve_bearer<'a>(
        &'a self,
        bearer: &PropertyBearer,
    ) -> Result<BearerRef<'a>, PropertyError> {
        match bearer.kind() {
            BearerKind::Agent(id) => self
                .agents
                .get(id)
                .map(BearerRef::Agent)
                .ok_or(PropertyError::MissingAgent(id)),
            BearerKind::Environment => Ok(BearerRef::Environment(self.environment.as_ref())),
        }
    }

    /// Evaluate a property against a named bearer.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] when the property or bearer is unknown or
    /// the evaluation itself fails.
    pub fn evaluate(
        &self,
        property: PropertyId,
        bearer_name: &str,
    ) -> Result<PropertyValue, PropertyError> {
        let bearer = self
            .bearers
            .iter()
            .find(|b| b.name() == bearer_name)
            .ok_or_else(|| PropertyError::UnknownBearer(bearer_name.to_owned()))?;
        let property = self
            .property(property)
            .ok_or(PropertyError::UnknownProperty(property))?;
        property.value(self.resolve_bearer(bearer)?)
    }

    /// Project this snapshot to its fossilized form.
    ///
    /// Every property attached to every bearer is observed and stored
    /// under `"<property-name>@<bearer-name>"`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError`] when a property reference dangles or an
    /// observation fails.
    pub fn fossilize(&self) -> Result<FossilizedState, PropertyError> {
        let mut values = BTreeMap::new();

        for bearer in &self.bearers {
            let view = self.resolve_bearer(bearer)?;
            for property_id in bearer.properties() {
                let property = self
                    .property(*property_id)
                    .ok_or(PropertyError::UnknownProperty(*property_id))?;
                values.insert(
                    format!("{}@{}", property.name(), bearer.name()),
                    property.value_as_string(view)?,
                );
            }
        }

        Ok(FossilizedState::new(values))
    }
}

impl core::fmt::Display for SimulationSnapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Agents after simulation:")?;
        for agent in self.agents.iter() {
            writeln!(f, "  {agent}")?;
        }

        writeln!(f, "\nProperties after simulation:")?;
        for property in &self.properties {
            writeln!(f, "  {property}")?;
        }

        writeln!(f, "\nProperties' values after simulation:")?;
        match self.fossilize() {
            Ok(fossil) => writeln!(f, "  {fossil}"),
            Err(_) => writeln!(
                f,
                "  Error: some property has been used in an inappropriate manner."
            ),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use crucible_types::{ActionStatus, AgentAction, StimulationStatus, Stimulus};

    use crate::agent::{AgentBody, InertBehavior};
    use crate::environment::BasicEnvironment;
    use crate::property::{ActionEmitting, StimulationPhaseCount};

    use super::*;

    fn snapshot() -> (SimulationSnapshot, AgentId, PropertyId) {
        let agent_id = AgentId::new();
        let mut roster = AgentRoster::new();
        roster
            .push(AgentControl::new(
                AgentBody::new(
                    agent_id,
                    "alpha",
                    BTreeSet::from([AgentAction::new("wave")]),
                    BTreeSet::from([Stimulus::new("light")]),
                ),
                Box::new(InertBehavior),
            ))
            .unwrap();

        let emitting_id = PropertyId::new();
        let count_id = PropertyId::new();
        let properties = vec![
            Property::new(
                emitting_id,
                "waving",
                Box::new(ActionEmitting::new(AgentAction::new("wave"))),
            ),
            Property::new(
                count_id,
                "stimulated",
                Box::new(StimulationPhaseCount::new(StimulationStatus::Beginning)),
            ),
        ];
        let bearers = vec![PropertyBearer::new(
            "alpha",
            BearerKind::Agent(agent_id),
            vec![emitting_id, count_id],
        )];

        let snapshot = SimulationSnapshot::new(
            Box::new(BasicEnvironment::new("env")),
            roster,
            Vec::new(),
            properties,
            bearers,
        );
        (snapshot, agent_id, count_id)
    }

    #[test]
    fn fossilize_keys_properties_by_bearer() {
        let (snapshot, _, _) = snapshot();
        let fossil = snapshot.fossilize().unwrap();
        assert_eq!(fossil.len(), 2);
        assert_eq!(fossil.get("waving@alpha"), Some("false"));
        assert_eq!(fossil.get("stimulated@alpha"), Some("0"));
    }

    #[test]
    fn fossilizing_twice_is_invariant() {
        let (snapshot, _, _) = snapshot();
        assert_eq!(snapshot.fossilize().unwrap(), snapshot.fossilize().unwrap());
    }

    #[test]
    fn clone_isolates_agent_state() {
        let (mut snapshot, agent_id, _) = snapshot();
        let clone = snapshot.clone();

        snapshot
            .agents_mut()
            .get_mut(agent_id)
            .unwrap()
            .body_mut()
            .set_action_status(AgentAction::new("wave"), ActionStatus::Emitting);

        assert_eq!(snapshot.fossilize().unwrap().get("waving@alpha"), Some("true"));
        assert_eq!(clone.fossilize().unwrap().get("waving@alpha"), Some("false"));
    }

    #[test]
    fn evaluate_resolves_property_and_bearer_by_name() {
        let (mut snapshot, agent_id, count_id) = snapshot();
        snapshot
            .agents_mut()
            .get_mut(agent_id)
            .unwrap()
            .body_mut()
            .receive_stimulus(Stimulus::new("light"), StimulationStatus::Beginning);

        let value = snapshot.evaluate(count_id, "alpha").unwrap();
        assert!((value.as_number("stimulated").unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn evaluate_rejects_unknown_bearer() {
        let (snapshot, _, count_id) = snapshot();
        assert!(matches!(
            snapshot.evaluate(count_id, "nobody"),
            Err(PropertyError::UnknownBearer(_))
        ));
    }

    #[test]
    fn position_roundtrip() {
        let (mut snapshot, _, _) = snapshot();
        assert_eq!(snapshot.position(), 0);
        snapshot.set_position(7);
        assert_eq!(snapshot.position(), 7);
    }
}
