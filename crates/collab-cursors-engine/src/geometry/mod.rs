/*!
 * # Selection Geometry
 *
 * Maps a normalized character range to the rectangles that highlight it on
 * the host surface.
 *
 * The host owns layout. It answers one question through the
 * [`GeometryOracle`]: where does the caret sit for a given character index.
 * Everything else (line wrap detection, explicit newlines, full-width middle
 * blocks) is derived from those answers in [`rows`].
 *
 * Units are whatever the host measures in: pixels for a browser surface,
 * cells for a terminal.
 */

pub mod rows;

pub use rows::compute_rows;

/// Position of the caret in front of a single character index,
/// in surface-local units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaretCoordinate {
    pub top: f32,
    pub left: f32,
    pub height: f32,
}

/// One highlight rectangle covering part of a single visual line
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Row {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

/// Horizontal extent of the text area, used for rows that run to an edge
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceMetrics {
    /// Full scrollable width of the surface including padding
    pub scroll_width: f32,
    pub padding_left: f32,
    pub padding_right: f32,
}

impl SurfaceMetrics {
    pub fn padding_x(&self) -> f32 {
        self.padding_left + self.padding_right
    }
}

/// Host-provided layout oracle.
///
/// Treated as authoritative. A call may cost O(index), so callers ask once
/// per boundary index per recomputation.
pub trait GeometryOracle {
    fn caret_coordinates(&self, index: usize) -> CaretCoordinate;

    fn surface_metrics(&self) -> SurfaceMetrics;
}

/// Geometry oracle paired with the text it lays out
#[derive(Clone, Copy)]
pub struct Layout<'a> {
    pub geometry: &'a dyn GeometryOracle,
    pub text: &'a str,
}

impl<'a> Layout<'a> {
    pub fn new(geometry: &'a dyn GeometryOracle, text: &'a str) -> Self {
        Self { geometry, text }
    }
}
