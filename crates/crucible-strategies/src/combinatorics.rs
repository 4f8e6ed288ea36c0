//! Combination generators for target-sequence search.
//!
//! Both generators produce length-`k` sequences over a set of elements,
//! repeats allowed. [`CombinationIterator`] enumerates all of them in a
//! fixed lexicographic order; [`RandomCombinationIterator`] draws a fixed
//! number of sequences uniformly with replacement. Both are finite, lazy,
//! and non-restartable.

use rand::Rng;

/// Errors raised when a generator cannot be constructed.
#[derive(Debug, thiserror::Error)]
pub enum CombinationError {
    /// There are no elements to combine.
    #[error("the element sequence must not be empty")]
    NoElements,

    /// The combination size exceeds the number of elements.
    #[error("the combination size ({k}) must be at most the number of elements ({n})")]
    SizeTooLarge {
        /// The requested combination size.
        k: usize,
        /// The number of elements.
        n: usize,
    },

    /// The combination size is zero.
    #[error("the combination size must be positive")]
    ZeroSize,
}

/// Enumerates all length-`k` sequences over the elements.
///
/// Enumeration uses a pivot/backtrack scheme over an index vector: the
/// pivot scans from the rightmost position looking for an index it can
/// advance, resetting everything to its right; the sequence is exhausted
/// when the pivot moves past the leftmost position.
#[derive(Debug, Clone)]
pub struct CombinationIterator<T: Clone> {
    elements: Vec<T>,
    combination: Vec<usize>,
    done: bool,
}

impl<T: Clone> CombinationIterator<T> {
    /// Create an iterator over all length-`k` sequences of `elements`.
    ///
    /// # Errors
    ///
    /// Returns [`CombinationError`] for an empty element sequence, a zero
    /// size, or a size larger than the number of elements.
    pub fn new(elements: Vec<T>, k: usize) -> Result<Self, CombinationError> {
        if elements.is_empty() {
            return Err(CombinationError::NoElements);
        }
        if k == 0 {
            return Err(CombinationError::ZeroSize);
        }
        if k > elements.len() {
            return Err(CombinationError::SizeTooLarge {
                k,
                n: elements.len(),
            });
        }

        Ok(Self {
            elements,
            combination: vec![0; k],
            done: false,
        })
    }

    /// Advance the index vector to the next combination, or mark the
    /// iterator exhausted.
    fn advance(&mut self) {
        let n = self.elements.len();
        let mut pivot = self.combination.len();

        while let Some(slot) = pivot.checked_sub(1) {
            if let Some(value) = self.combination.get_mut(slot) {
                let next = value.saturating_add(1);
                if next < n {
                    *value = next;
                    return;
                }
                // This position wrapped; reset it and back the pivot up.
                *value = 0;
            }
            pivot = slot;
        }

        // The pivot moved past the leftmost position.
        self.done = true;
    }
}

impl<T: Clone> Iterator for CombinationIterator<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result: Vec<T> = self
            .combination
            .iter()
            .filter_map(|&index| self.elements.get(index).cloned())
            .collect();
        self.advance();
        Some(result)
    }
}

/// Draws a fixed number of length-`k` sequences, each element chosen
/// uniformly at random with replacement.
///
/// There is no uniqueness guarantee between trials.
#[derive(Debug, Clone)]
pub struct RandomCombinationIterator<T: Clone> {
    elements: Vec<T>,
    k: usize,
    trials: usize,
    generated: usize,
}

impl<T: Clone> RandomCombinationIterator<T> {
    /// Create an iterator producing `trials` random length-`k` sequences.
    ///
    /// # Errors
    ///
    /// Returns [`CombinationError`] for an empty element sequence or a
    /// zero size.
    pub fn new(elements: Vec<T>, k: usize, trials: usize) -> Result<Self, CombinationError> {
        if elements.is_empty() {
            return Err(CombinationError::NoElements);
        }
        if k == 0 {
            return Err(CombinationError::ZeroSize);
        }

        Ok(Self {
            elements,
            k,
            trials,
            generated: 0,
        })
    }
}

impl<T: Clone> Iterator for RandomCombinationIterator<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.generated >= self.trials {
            return None;
        }

        let mut rng = rand::rng();
        let mut result = Vec::with_capacity(self.k);
        for _ in 0..self.k {
            let index = rng.random_range(0..self.elements.len());
            result.push(self.elements.get(index)?.clone());
        }

        self.generated = self.generated.saturating_add(1);
        Some(result)
    }
}
