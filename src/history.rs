use std::collections::VecDeque;

use crate::snapshot::Snapshot;

pub const DEFAULT_HISTORY_LIMIT: usize = 40;

/// Bounded undo/redo history. Entries are PNG-encoded frames, so a mostly
/// blank board costs a few KB per entry instead of a full RGBA buffer.
pub struct FrameHistory {
    /// Frames that can be restored by undo, oldest first
    undo_stack: VecDeque<Snapshot>,
    /// Frames that can be restored by redo, filled only by undo
    redo_stack: Vec<Snapshot>,
    limit: usize,
}

impl Default for FrameHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl FrameHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state before a new action. Clears the redo stack.
    pub fn push(&mut self, frame: Snapshot) {
        self.push_bounded(frame);
        self.redo_stack.clear();
    }

    /// Put a loaded snapshot at the bottom of the history
    pub fn seed(&mut self, frame: Snapshot) {
        self.push_bounded(frame);
    }

    fn push_bounded(&mut self, frame: Snapshot) {
        self.undo_stack.push_back(frame);
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
    }

    /// Pop the most recent undo entry, moving `current` onto the redo stack.
    /// `None` if there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Pop the most recent redo entry, moving `current` back onto the undo
    /// stack. `None` if there is nothing to redo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.push_bounded(current);
        Some(next)
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

    /// Encoded bytes held by both stacks
    pub fn footprint(&self) -> usize {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(|frame| frame.png().len())
            .sum()
    }
}
