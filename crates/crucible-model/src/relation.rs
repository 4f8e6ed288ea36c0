//! Binary adjacency structures over agents.
//!
//! A relation records directed (source, target) pairs of agent ids. The
//! stepper applies no per-step update to relations; they exist for
//! behaviors and properties to query.

use std::collections::{BTreeMap, BTreeSet};

use crucible_types::{AgentId, RelationId};

/// An id-keyed directed relation between agents.
#[derive(Debug, Clone)]
pub struct Relation {
    id: RelationId,
    name: String,
    description: String,
    ties: BTreeMap<AgentId, BTreeSet<AgentId>>,
}

impl Relation {
    /// Create an empty relation.
    pub fn new(id: RelationId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            ties: BTreeMap::new(),
        }
    }

    /// The relation's unique id.
    pub const fn id(&self) -> RelationId {
        self.id
    }

    /// The relation's user-friendly name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The relation's user-friendly description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Record the pair (a, b).
    pub fn add(&mut self, a: AgentId, b: AgentId) {
        self.ties.entry(a).or_default().insert(b);
    }

    /// Remove the pair (a, b), if present.
    pub fn remove(&mut self, a: AgentId, b: AgentId) {
        if let Some(targets) = self.ties.get_mut(&a) {
            targets.remove(&b);
            if targets.is_empty() {
                self.ties.remove(&a);
            }
        }
    }

    /// Whether the pair (a, b) is recorded.
    pub fn contains(&self, a: AgentId, b: AgentId) -> bool {
        self.ties.get(&a).is_some_and(|targets| targets.contains(&b))
    }

    /// The agents b such that (a, b) is recorded.
    pub fn relational_image(&self, a: AgentId) -> Vec<AgentId> {
        self.ties
            .get(&a)
            .map(|targets| targets.iter().copied().collect())
            .unwrap_or_default()
    }

    /// The agents a such that (a, b) is recorded.
    pub fn inverse_relational_image(&self, b: AgentId) -> Vec<AgentId> {
        self.ties
            .iter()
            .filter(|(_, targets)| targets.contains(&b))
            .map(|(a, _)| *a)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut relation = Relation::new(RelationId::new(), "knows", "");
        let (a, b) = (AgentId::new(), AgentId::new());
        relation.add(a, b);
        relation.add(a, b);
        assert_eq!(relation.relational_image(a).len(), 1);
    }

    #[test]
    fn images_are_directional() {
        let mut relation = Relation::new(RelationId::new(), "knows", "");
        let (a, b) = (AgentId::new(), AgentId::new());
        relation.add(a, b);
        assert!(relation.contains(a, b));
        assert!(!relation.contains(b, a));
        assert_eq!(relation.inverse_relational_image(b), vec![a]);
        assert!(relation.relational_image(b).is_empty());
    }

    #[test]
    fn remove_drops_the_pair() {
        let mut relation = Relation::new(RelationId::new(), "knows", "");
        let (a, b) = (AgentId::new(), AgentId::new());
        relation.add(a, b);
        relation.remove(a, b);
        assert!(!relation.contains(a, b));
        assert!(relation.relational_image(a).is_empty());
    }
}
