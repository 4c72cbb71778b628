//! Layer ordering over the canonical element sequence.
//!
//! The element sequence is the only ordering: index 0 is painted first
//! (bottom), the last index is painted last (top). Layer panels list
//! elements top-first, so they work in *display* indices. Display indices
//! are translated to canonical ones exclusively through
//! [`display_to_canonical`]; every operation here takes canonical indices
//! and returns a new sequence, leaving the input untouched.

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult};

/// A reordering request in canonical index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum LayerOp {
    /// Swap with the element painted just above.
    MoveUp,
    /// Swap with the element painted just below.
    MoveDown,
    /// Move to the end of the sequence (topmost).
    BringToFront,
    /// Move to the start of the sequence (bottommost).
    SendToBack,
    /// Move to an arbitrary canonical index.
    MoveTo {
        /// Destination canonical index.
        to: usize,
    },
}

/// Map a top-first display index to its canonical index.
///
/// Returns `None` when `display_index` is out of range.
#[must_use]
pub fn display_to_canonical(len: usize, display_index: usize) -> Option<usize> {
    (display_index < len).then(|| len - 1 - display_index)
}

/// Map a canonical index to its top-first display index.
///
/// The projection is its own inverse.
#[must_use]
pub fn canonical_to_display(len: usize, canonical_index: usize) -> Option<usize> {
    display_to_canonical(len, canonical_index)
}

/// Iterate items top-first, yielding `(canonical_index, item)`.
pub fn display_order<T>(items: &[T]) -> impl Iterator<Item = (usize, &T)> {
    items.iter().enumerate().rev()
}

/// Apply a layer operation to a copy of `items`.
///
/// Operations that cannot move the item any further (moving the top item
/// up, for example) return an unchanged copy.
///
/// # Errors
///
/// Returns [`CanvasError::LayerIndexOutOfRange`] if `index` (or the
/// `MoveTo` destination) is outside the sequence.
pub fn apply<T: Clone>(items: &[T], index: usize, op: LayerOp) -> CanvasResult<Vec<T>> {
    let len = items.len();
    check_index(index, len)?;
    let to = match op {
        LayerOp::MoveUp => (index + 1).min(len - 1),
        LayerOp::MoveDown => index.saturating_sub(1),
        LayerOp::BringToFront => len - 1,
        LayerOp::SendToBack => 0,
        LayerOp::MoveTo { to } => {
            check_index(to, len)?;
            to
        }
    };
    tracing::debug!(?op, from = index, to, "reorder layer");
    Ok(reorder(items, index, to))
}

/// Apply a layer operation addressed by top-first display index.
///
/// # Errors
///
/// Returns [`CanvasError::LayerIndexOutOfRange`] if the display index is
/// outside the sequence.
pub fn apply_display<T: Clone>(items: &[T], display_index: usize, op: LayerOp) -> CanvasResult<Vec<T>> {
    let len = items.len();
    let index = display_to_canonical(len, display_index).ok_or(CanvasError::LayerIndexOutOfRange {
        index: display_index,
        len,
    })?;
    let op = match op {
        LayerOp::MoveTo { to } => LayerOp::MoveTo {
            to: display_to_canonical(len, to)
                .ok_or(CanvasError::LayerIndexOutOfRange { index: to, len })?,
        },
        other => other,
    };
    apply(items, index, op)
}

/// Move `items[from]` so it ends up at index `to`; everything between shifts by one.
fn reorder<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    let item = out.remove(from);
    out.insert(to, item);
    out
}

fn check_index(index: usize, len: usize) -> CanvasResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(CanvasError::LayerIndexOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_move_up_and_down() {
        let v = vec!['a', 'b', 'c'];
        assert_eq!(apply(&v, 0, LayerOp::MoveUp).expect("op"), vec!['b', 'a', 'c']);
        assert_eq!(apply(&v, 2, LayerOp::MoveDown).expect("op"), vec!['a', 'c', 'b']);
        // Already at the boundary.
        assert_eq!(apply(&v, 2, LayerOp::MoveUp).expect("op"), v);
        assert_eq!(apply(&v, 0, LayerOp::MoveDown).expect("op"), v);
    }

    #[test]
    fn test_front_and_back() {
        let v = vec!['a', 'b', 'c', 'd'];
        assert_eq!(apply(&v, 1, LayerOp::BringToFront).expect("op"), vec!['a', 'c', 'd', 'b']);
        assert_eq!(apply(&v, 2, LayerOp::SendToBack).expect("op"), vec!['c', 'a', 'b', 'd']);
    }

    #[test]
    fn test_input_not_mutated() {
        let v = vec![1, 2, 3];
        let out = apply(&v, 0, LayerOp::BringToFront).expect("op");
        assert_eq!(v, vec![1, 2, 3]);
        assert_eq!(out, vec![2, 3, 1]);
    }

    #[test]
    fn test_out_of_range() {
        let v = vec![1, 2];
        assert!(matches!(
            apply(&v, 2, LayerOp::MoveUp),
            Err(CanvasError::LayerIndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(apply(&v, 0, LayerOp::MoveTo { to: 5 }).is_err());
        assert!(apply::<i32>(&[], 0, LayerOp::SendToBack).is_err());
    }

    #[test]
    fn test_display_projection() {
        assert_eq!(display_to_canonical(4, 0), Some(3));
        assert_eq!(display_to_canonical(4, 3), Some(0));
        assert_eq!(display_to_canonical(4, 4), None);
        let v = vec!['a', 'b', 'c'];
        let listed: Vec<_> = display_order(&v).collect();
        assert_eq!(listed, vec![(2, &'c'), (1, &'b'), (0, &'a')]);
    }

    #[test]
    fn test_display_drag_to_top_of_list() {
        // Panel shows [c, b, a]; dragging `a` (display 2) to the top (display 0)
        // makes it the topmost layer.
        let v = vec!['a', 'b', 'c'];
        let out = apply_display(&v, 2, LayerOp::MoveTo { to: 0 }).expect("op");
        assert_eq!(out, vec!['b', 'c', 'a']);
    }

    #[test]
    fn test_display_move_up_means_toward_top() {
        let v = vec!['a', 'b', 'c'];
        // Display index 1 is `b`; moving it up in paint order puts it on top.
        let out = apply_display(&v, 1, LayerOp::MoveUp).expect("op");
        assert_eq!(out, vec!['a', 'c', 'b']);
    }

    proptest! {
        #[test]
        fn prop_ops_are_permutations(len in 1usize..12, idx in 0usize..12, to in 0usize..12, which in 0u8..5) {
            let idx = idx % len;
            let to = to % len;
            let items: Vec<usize> = (0..len).collect();
            let op = match which {
                0 => LayerOp::MoveUp,
                1 => LayerOp::MoveDown,
                2 => LayerOp::BringToFront,
                3 => LayerOp::SendToBack,
                _ => LayerOp::MoveTo { to },
            };
            let mut out = apply(&items, idx, op).expect("op");
            out.sort_unstable();
            prop_assert_eq!(out, items);
        }

        #[test]
        fn prop_projection_is_involution(len in 1usize..100, i in 0usize..100) {
            let i = i % len;
            let c = display_to_canonical(len, i).expect("in range");
            prop_assert_eq!(canonical_to_display(len, c), Some(i));
        }
    }
}
