//! Snapshot-based undo/redo.

/// Default maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Undo and redo stacks of full-state snapshots.
///
/// Callers push the pre-mutation state with [`push`](Self::push) and hand
/// the current state to [`undo`](Self::undo)/[`redo`](Self::redo), which
/// return the state to restore. A snapshot lives on at most one stack.
#[derive(Debug, Clone)]
pub struct History<S> {
    undo_stack: Vec<S>,
    redo_stack: Vec<S>,
    limit: usize,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::with_limit(MAX_UNDO_HISTORY)
    }
}

impl<S> History<S> {
    /// Create a history keeping at most `limit` undo snapshots (minimum 1).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state before a mutation. Clears the redo stack.
    pub fn push(&mut self, snapshot: S) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        self.trim();
    }

    /// Step back: stores `current` for redo and returns the state to restore.
    /// Hands `current` back as `Err` when there is nothing to undo.
    pub fn undo(&mut self, current: S) -> Result<S, S> {
        let Some(snapshot) = self.undo_stack.pop() else {
            return Err(current);
        };
        self.redo_stack.push(current);
        Ok(snapshot)
    }

    /// Step forward: stores `current` for undo and returns the state to restore.
    /// Hands `current` back as `Err` when there is nothing to redo.
    pub fn redo(&mut self, current: S) -> Result<S, S> {
        let Some(snapshot) = self.redo_stack.pop() else {
            return Err(current);
        };
        self.undo_stack.push(current);
        self.trim();
        Ok(snapshot)
    }

    /// Roll back an [`undo`](Self::undo) whose restore could not be applied.
    /// Returns the state that was current before the undo.
    pub fn revert_undo(&mut self, restored: S) -> Result<S, S> {
        let Some(previous) = self.redo_stack.pop() else {
            return Err(restored);
        };
        self.undo_stack.push(restored);
        Ok(previous)
    }

    /// Roll back a [`redo`](Self::redo) whose restore could not be applied.
    pub fn revert_redo(&mut self, restored: S) -> Result<S, S> {
        let Some(previous) = self.undo_stack.pop() else {
            return Err(restored);
        };
        self.redo_stack.push(restored);
        Ok(previous)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Forget all snapshots.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.limit {
            let excess = self.undo_stack.len() - self.limit;
            self.undo_stack.drain(..excess);
        }
    }
}
