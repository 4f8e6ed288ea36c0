//! The compact, lossy projection of a snapshot.
//!
//! Fossilization keeps only the observed property values of one instant,
//! keyed `"<property-name>@<bearer-name>"`. Two fossilized states are
//! equal iff their key sets are identical and every corresponding value
//! matches; the sorted map makes the comparison order-independent and
//! linear after the `O(n log n)` insertion order is paid once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A fossilized simulation state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FossilizedState {
    values: BTreeMap<String, String>,
}

impl FossilizedState {
    /// Create a fossilized state from observed values.
    pub const fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    /// The observed value under the given `"property@bearer"` key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Iterate the observations in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// The number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no observations were kept.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl core::fmt::Display for FossilizedState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[")?;
        let mut first = true;
        for (key, value) in &self.values {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
            first = false;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fossil(pairs: &[(&str, &str)]) -> FossilizedState {
        FossilizedState::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        )
    }

    #[test]
    fn equality_is_order_independent() {
        let a = fossil(&[("x@alpha", "1"), ("y@alpha", "2")]);
        let b = fossil(&[("y@alpha", "2"), ("x@alpha", "1")]);
        assert_eq!(a, b);
    }

    #[test]
    fn differing_values_are_unequal() {
        let a = fossil(&[("x@alpha", "1")]);
        let b = fossil(&[("x@alpha", "2")]);
        assert_ne!(a, b);
    }

    #[test]
    fn differing_key_sets_are_unequal() {
        let a = fossil(&[("x@alpha", "1")]);
        let b = fossil(&[("x@alpha", "1"), ("y@alpha", "1")]);
        assert_ne!(a, b);
    }

    #[test]
    fn display_lists_observations() {
        let state = fossil(&[("x@alpha", "1")]);
        assert_eq!(state.to_string(), "[x@alpha: 1]");
    }
}
