use std::collections::VecDeque;

use super::row::Row;

/// Deep copy of the line store and cursor taken before a destructive edit.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub rows: Vec<Row>,
    pub cx: usize,
    pub cy: usize,
}

/// Undo history. There is no redo; popping a snapshot discards it.
/// With a `max_size` the oldest snapshots are dropped once it is reached;
/// without one the history grows for the whole session.
#[derive(Debug, Clone)]
pub struct UndoStack {
    snapshots: VecDeque<Snapshot>,
    max_size: Option<usize>,
}

impl UndoStack {
    /// `limit` 0 keeps every snapshot.
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            max_size: (limit > 0).then_some(limit),
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push_back(snapshot);
        if let Some(max_size) = self.max_size {
            while self.snapshots.len() > max_size {
                self.snapshots.pop_front();
            }
        }
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
