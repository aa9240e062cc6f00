use std::collections::VecDeque;

use super::region::Region;

/// Maximum number of undo entries kept per page. Older entries are evicted
/// first-in-first-out, so an unbounded edit session cannot exhaust memory.
pub const MAX_DEPTH: usize = 50;

/// Bounded undo/redo stacks of full region-list snapshots for one page.
///
/// Every entry is a deep value copy: regions own their strings and carry no
/// shared mutable structure, so mutating the live list after a snapshot can
/// never corrupt history.
#[derive(Debug, Default)]
pub struct History {
    undo: VecDeque<Vec<Region>>,
    redo: Vec<Vec<Region>>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `current` as the state to return to on undo.
    ///
    /// Call immediately before any committed structural or attribute
    /// mutation. Starting a new edit forks the timeline, so the redo stack
    /// is cleared.
    pub fn snapshot(&mut self, current: &[Region]) {
        self.push_undo(current.to_vec());
        self.redo.clear();
    }

    /// Steps back once. Returns the state to make live, or `None` when
    /// there is nothing to undo. `current` is saved for redo.
    #[must_use]
    pub fn undo(&mut self, current: &[Region]) -> Option<Vec<Region>> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current.to_vec());
        Some(previous)
    }

    /// Steps forward once. Returns the state to make live, or `None` when
    /// there is nothing to redo. `current` is saved for undo.
    #[must_use]
    pub fn redo(&mut self, current: &[Region]) -> Option<Vec<Region>> {
        let next = self.redo.pop()?;
        self.push_undo(current.to_vec());
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_undo(&mut self, state: Vec<Region>) {
        if self.undo.len() >= MAX_DEPTH {
            self.undo.pop_front();
        }
        self.undo.push_back(state);
    }
}
