//! Snapshot-based undo/redo over committed documents.

use crate::document::DesignDocument;

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Undo/redo stacks of whole-document snapshots.
///
/// Only committed states are recorded; transient gesture geometry never
/// reaches the history.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<DesignDocument>,
    redo_stack: Vec<DesignDocument>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_depth(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    /// Create a history keeping at most `max_depth` undo steps.
    #[must_use]
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the state *before* a committed change.
    ///
    /// Clears the redo stack; the oldest entry is dropped at capacity.
    pub fn record(&mut self, before: DesignDocument) {
        if self.undo_stack.len() == self.max_depth {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(before);
        self.redo_stack.clear();
    }

    /// Step back. `current` is pushed onto the redo stack.
    pub fn undo(&mut self, current: &DesignDocument) -> Option<DesignDocument> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    /// Step forward again. `current` is pushed onto the undo stack.
    pub fn redo(&mut self, current: &DesignDocument) -> Option<DesignDocument> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        Some(next)
    }

    /// Whether an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Canvas;
    use crate::element::Element;

    fn doc_with(n: usize) -> DesignDocument {
        let mut doc = DesignDocument::new(Canvas::new(10.0, 10.0));
        for i in 0..n {
            doc.add_element(Element::text(format!("line {i}"), "Arial", 0.5))
                .expect("add");
        }
        doc
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::default();
        let v0 = doc_with(0);
        let v1 = doc_with(1);
        history.record(v0.clone());

        let back = history.undo(&v1).expect("undo");
        assert_eq!(back, v0);
        assert!(history.can_redo());

        let forward = history.redo(&back).expect("redo");
        assert_eq!(forward, v1);
        assert!(history.can_undo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::default();
        history.record(doc_with(0));
        history.undo(&doc_with(1)).expect("undo");
        history.record(doc_with(2));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut history = History::with_depth(2);
        let oldest = doc_with(0);
        history.record(oldest.clone());
        history.record(doc_with(1));
        history.record(doc_with(2));
        let current = doc_with(3);
        let a = history.undo(&current).expect("undo");
        let b = history.undo(&a).expect("undo");
        assert_ne!(b, oldest);
        assert!(history.undo(&b).is_none());
    }
}
