/*!
 * # Selections
 *
 * Selections are expressed in the linear character address space of the
 * host text (Unicode scalar values, not bytes).
 *
 * - **`SelectionRange`** is what collaborators exchange: an `anchor` and a
 *   `target` in either order. The caret always renders at `target`.
 * - **`NormalizedSelection`** is the `[start, end)` view used for geometry.
 * - **`SelectionState`** is the per-collaborator state machine. Every
 *   consumer matches on all three variants instead of probing nullable
 *   fields.
 * - **`transform`** rebases offsets across a single insert or delete.
 */

pub mod transform;

use serde::{Deserialize, Serialize};

pub use transform::{transform_index_on_delete, transform_index_on_insert};

/// A selection described by its two endpoints.
///
/// `anchor` and `target` are unordered; `target` is where the caret renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionRange {
    pub anchor: usize,
    pub target: usize,
}

impl SelectionRange {
    pub fn new(anchor: usize, target: usize) -> Self {
        Self { anchor, target }
    }

    /// A collapsed selection (plain caret) at `at`
    pub fn collapsed(at: usize) -> Self {
        Self::new(at, at)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.target
    }

    pub fn normalize(&self) -> NormalizedSelection {
        NormalizedSelection {
            start: self.anchor.min(self.target),
            end: self.anchor.max(self.target),
        }
    }

    /// Rebase both endpoints across an insert of `inserted_len` characters
    pub fn transform_on_insert(&self, insert_at: usize, inserted_len: usize) -> Self {
        Self {
            anchor: transform_index_on_insert(self.anchor, insert_at, inserted_len),
            target: transform_index_on_insert(self.target, insert_at, inserted_len),
        }
    }

    /// Rebase both endpoints across a delete of `deleted_len` characters
    pub fn transform_on_delete(&self, delete_at: usize, deleted_len: usize) -> Self {
        Self {
            anchor: transform_index_on_delete(self.anchor, delete_at, deleted_len),
            target: transform_index_on_delete(self.target, delete_at, deleted_len),
        }
    }
}

/// `[start, end)` with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NormalizedSelection {
    pub start: usize,
    pub end: usize,
}

impl NormalizedSelection {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Per-collaborator selection state, driven solely by `set_selection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// No cursor and no highlight
    #[default]
    NoSelection,
    /// A caret with no highlighted rows
    CollapsedCursor { at: usize },
    /// A caret at `range.target` plus highlighted rows over the normalized range
    RangeSelection { range: SelectionRange },
}

impl SelectionState {
    pub fn from_selection(selection: Option<SelectionRange>) -> Self {
        match selection {
            None => SelectionState::NoSelection,
            Some(range) if range.is_collapsed() => SelectionState::CollapsedCursor {
                at: range.target,
            },
            Some(range) => SelectionState::RangeSelection { range },
        }
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        match *self {
            SelectionState::NoSelection => None,
            SelectionState::CollapsedCursor { at } => Some(SelectionRange::collapsed(at)),
            SelectionState::RangeSelection { range } => Some(range),
        }
    }

    /// Where the caret renders, if there is one
    pub fn cursor(&self) -> Option<usize> {
        self.selection().map(|range| range.target)
    }
}
