/*!
 * # Rendering Surface
 *
 * The overlay is drawn through the [`Renderer`] trait. The core decides
 * *what* is on screen (rows, cursors, tooltips, colors, visibility) and a
 * renderer decides *how*: DOM elements in a browser, styled cells in a
 * terminal, or a log of operations in tests ([`RecordingRenderer`]).
 *
 * Rows are owned by the collaborator that created them and addressed by an
 * opaque [`RowHandle`] the renderer hands out. [`reconcile`] keeps those
 * handles stable across recomputations.
 */

pub mod reconcile;
pub mod recording;

pub use reconcile::{ReconcileStats, RenderedRow, RowStyle, reconcile_rows};
pub use recording::{RecordingRenderer, RenderOp};

use crate::collaborator::{CollaboratorId, Color};
use crate::geometry::{CaretCoordinate, Row};
use crate::surface::{ScrollOffset, SurfaceBounds};

/// Opaque identity of a rendered row element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowHandle(pub u64);

/// The fields of a row that changed. `None` fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowPatch {
    pub top: Option<f32>,
    pub left: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl RowPatch {
    /// Patch turning `old` into `new`, or `None` when they are equal
    pub fn between(old: &Row, new: &Row) -> Option<Self> {
        let changed = |a: f32, b: f32| (a != b).then_some(b);
        let patch = Self {
            top: changed(old.top, new.top),
            left: changed(old.left, new.left),
            width: changed(old.width, new.width),
            height: changed(old.height, new.height),
        };
        (patch != Self::default()).then_some(patch)
    }

    pub fn apply(&self, row: &mut Row) {
        if let Some(top) = self.top {
            row.top = top;
        }
        if let Some(left) = self.left {
            row.left = left;
        }
        if let Some(width) = self.width {
            row.width = width;
        }
        if let Some(height) = self.height {
            row.height = height;
        }
    }
}

/// An overlay element that can be colored or hidden
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Cursor(CollaboratorId),
    Tooltip(CollaboratorId),
    Row(RowHandle),
}

/// Rendered sizes of a collaborator's cursor and tooltip
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementMetrics {
    pub cursor_width: f32,
    pub tooltip_width: f32,
    pub tooltip_height: f32,
}

/// Where a cursor and its tooltip go
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CursorPlacement {
    pub caret: CaretCoordinate,
    /// Left edge of the cursor element, centred on the caret
    pub cursor_left: f32,
    pub tooltip_top: f32,
    pub tooltip_left: f32,
}

pub trait Renderer {
    fn create_row(&mut self, owner: &CollaboratorId, row: &Row, color: &Color) -> RowHandle;

    fn update_row(&mut self, handle: RowHandle, patch: &RowPatch);

    fn remove_row(&mut self, handle: RowHandle);

    /// Add the cursor and its (hidden) tooltip for `owner`
    fn attach_cursor(&mut self, owner: &CollaboratorId, label: &str, color: &Color);

    fn detach_cursor(&mut self, owner: &CollaboratorId);

    fn position_cursor(&mut self, owner: &CollaboratorId, placement: &CursorPlacement);

    fn show_tooltip(&mut self, owner: &CollaboratorId);

    fn hide_tooltip(&mut self, owner: &CollaboratorId);

    fn set_color(&mut self, element: &Element, color: &Color);

    fn set_visible(&mut self, element: &Element, visible: bool);

    fn set_overlay_visible(&mut self, visible: bool);

    fn set_overlay_bounds(&mut self, bounds: SurfaceBounds);

    /// Offset of the overlay content, the negated host scroll position
    fn set_scroll_offset(&mut self, offset: ScrollOffset);

    fn element_metrics(&self, _owner: &CollaboratorId) -> ElementMetrics {
        ElementMetrics::default()
    }

    /// Remove the overlay itself. Called once, after every element is gone.
    fn dispose(&mut self) {}
}
