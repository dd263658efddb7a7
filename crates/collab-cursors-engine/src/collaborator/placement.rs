//! Cursor and tooltip placement inside the overlay.

use crate::geometry::CaretCoordinate;
use crate::render::{CursorPlacement, ElementMetrics};

/// What placement needs to know about the overlay
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayFrame {
    pub width: f32,
    /// Vertical offset of the overlay content (the negated scroll top)
    pub offset_top: f32,
}

/// Centre the cursor on the caret and keep its tooltip inside the overlay.
///
/// The tooltip sits above the caret unless that would bring it within
/// `margin` of the overlay top, in which case it drops below the caret. It
/// is left-aligned with the cursor unless that would cross the right edge
/// (minus `margin`), in which case it is right-aligned with the cursor.
pub fn place_cursor(
    caret: CaretCoordinate,
    metrics: ElementMetrics,
    frame: OverlayFrame,
    margin: f32,
) -> CursorPlacement {
    let cursor_left = caret.left - metrics.cursor_width / 2.0;

    let mut tooltip_top = caret.top - metrics.tooltip_height;
    if tooltip_top + frame.offset_top < margin {
        tooltip_top = caret.top + caret.height;
    }

    let mut tooltip_left = cursor_left;
    if tooltip_left + metrics.tooltip_width > frame.width - margin {
        tooltip_left = cursor_left + metrics.cursor_width - metrics.tooltip_width;
    }

    CursorPlacement {
        caret,
        cursor_left,
        tooltip_top,
        tooltip_left,
    }
}
