//! The run ledger: a positioned, contiguous history of snapshots.
//!
//! A [`SimulationRun`] records the successive states explored during one
//! simulation run, under one of three storage modes: full snapshots,
//! fossilized projections, or nothing at all (position tracking only).
//!
//! Contiguity invariant: an appended state's position must be exactly
//! `current_position + 1`. Restarting from an earlier state overwrites in
//! place; entries beyond the restart point are not eagerly deleted -- they
//! are overwritten as new states are appended.

use crucible_model::{FossilizedState, SimulationSnapshot};
use crucible_types::StorageMode;

use crate::error::RunError;

/// A simulation run containing the states that have been explored.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    mode: StorageMode,
    trace: Vec<SimulationSnapshot>,
    fossilized: Vec<FossilizedState>,
    current_position: Option<u64>,
}

impl SimulationRun {
    /// Create an empty run under the given storage mode.
    pub const fn new(mode: StorageMode) -> Self {
        Self {
            mode,
            trace: Vec::new(),
            fossilized: Vec::new(),
            current_position: None,
        }
    }

    /// The run's storage mode.
    pub const fn mode(&self) -> StorageMode {
        self.mode
    }

    /// The position of the most recently accepted state, if any state has
    /// been accepted yet.
    pub const fn current_position(&self) -> Option<u64> {
        self.current_position
    }

    /// The position the next appended state must carry.
    pub fn next_position(&self) -> u64 {
        self.current_position
            .map_or(0, |position| position.saturating_add(1))
    }

    /// Append a state to the run.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NonContiguous`] unless the state's position is
    /// exactly the next one, and propagates fossilization failures under
    /// [`StorageMode::Fossilized`].
    pub fn append(&mut self, state: SimulationSnapshot) -> Result<(), RunError> {
        let expected = self.next_position();
        if state.position() != expected {
            return Err(RunError::NonContiguous {
                expected,
                found: state.position(),
            });
        }

        self.store(state)?;
        self.current_position = Some(expected);
        Ok(())
    }

    /// Reconfigure the run so the given state becomes the current one.
    ///
    /// The state's position must already be present in the run or be the
    /// next one: appending when exactly next, overwriting in place
    /// otherwise. This keeps the run contiguous (no missing intermediary
    /// states).
    ///
    /// # Errors
    ///
    /// Returns [`RunError::PositionAhead`] when the position lies beyond
    /// the next one.
    pub fn restart_from(&mut self, state: SimulationSnapshot) -> Result<(), RunError> {
        let next = self.next_position();
        if state.position() > next {
            return Err(RunError::PositionAhead {
                limit: next,
                found: state.position(),
            });
        }

        let position = state.position();
        self.store(state)?;
        self.current_position = Some(position);
        Ok(())
    }

    /// Clear all stored information.
    pub fn clear(&mut self) {
        self.trace.clear();
        self.fossilized.clear();
        self.current_position = None;
    }

    /// The number of retained entries.
    pub const fn len(&self) -> usize {
        match self.mode {
            StorageMode::Full => self.trace.len(),
            StorageMode::Fossilized => self.fossilized.len(),
            StorageMode::None => 0,
        }
    }

    /// Whether the run retains no entries.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fossilized trace of the run.
    ///
    /// Under [`StorageMode::Full`] every stored snapshot is fossilized
    /// lazily, on demand.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NothingStored`] under [`StorageMode::None`],
    /// and propagates fossilization failures.
    pub fn fossilized_trace(&self) -> Result<Vec<FossilizedState>, RunError> {
        match self.mode {
            StorageMode::Full => {
                let mut fossils = Vec::with_capacity(self.trace.len());
                for state in &self.trace {
                    fossils.push(state.fossilize()?);
                }
                Ok(fossils)
            }
            StorageMode::Fossilized => Ok(self.fossilized.clone()),
            StorageMode::None => Err(RunError::NothingStored),
        }
    }

    /// The full trace of the run.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::FullTraceUnavailable`] unless the run stores
    /// full snapshots.
    pub fn trace(&self) -> Result<&[SimulationSnapshot], RunError> {
        if self.mode == StorageMode::Full {
            Ok(&self.trace)
        } else {
            Err(RunError::FullTraceUnavailable { mode: self.mode })
        }
    }

    /// Store a state at its own position, overwriting any stale entry a
    /// backtrack left behind.
    fn store(&mut self, state: SimulationSnapshot) -> Result<(), RunError> {
        let index = usize::try_from(state.position()).map_err(|_| RunError::PositionOverflow {
            position: state.position(),
        })?;

        match self.mode {
            StorageMode::Full => {
                if let Some(slot) = self.trace.get_mut(index) {
                    *slot = state;
                } else {
                    self.trace.push(state);
                }
            }
            StorageMode::Fossilized => {
                let fossil = state.fossilize()?;
                if let Some(slot) = self.fossilized.get_mut(index) {
                    *slot = fossil;
                } else {
                    self.fossilized.push(fossil);
                }
            }
            StorageMode::None => {}
        }
        Ok(())
    }
}
