//! Character range to visual rows.
//!
//! A range without explicit newlines is one logical line. If the caret at
//! its end sits lower than the caret at its start, the line wrapped and is
//! drawn as up to three rows: the tail of the first visual line, an optional
//! full-width block covering every fully selected visual line, and the head
//! of the last visual line.
//!
//! A range with newlines is walked one logical line at a time, each line
//! handled as above.

use super::{CaretCoordinate, GeometryOracle, Row, SurfaceMetrics};
use crate::selection::NormalizedSelection;

/// Compute the highlight rows for `selection`, ordered top to bottom and,
/// within a wrapped line, left to right.
pub fn compute_rows<G>(geometry: &G, text: &str, selection: NormalizedSelection) -> Vec<Row>
where
    G: GeometryOracle + ?Sized,
{
    RowBuilder::new(geometry, text, selection).build()
}

struct RowBuilder<'a, G: ?Sized> {
    geometry: &'a G,
    selection: NormalizedSelection,
    /// Character indices of every newline inside the selection
    newlines: Vec<usize>,
    start_coords: CaretCoordinate,
    end_coords: CaretCoordinate,
    line_height: f32,
    metrics: SurfaceMetrics,
    rows: Vec<Row>,
}

impl<'a, G> RowBuilder<'a, G>
where
    G: GeometryOracle + ?Sized,
{
    fn new(geometry: &'a G, text: &str, selection: NormalizedSelection) -> Self {
        let newlines = text
            .chars()
            .enumerate()
            .skip(selection.start)
            .take(selection.len())
            .filter_map(|(index, ch)| (ch == '\n').then_some(index))
            .collect();

        let start_coords = geometry.caret_coordinates(selection.start);
        let end_coords = geometry.caret_coordinates(selection.end);

        Self {
            geometry,
            selection,
            newlines,
            start_coords,
            end_coords,
            line_height: start_coords.height,
            metrics: geometry.surface_metrics(),
            rows: Vec::new(),
        }
    }

    fn build(mut self) -> Vec<Row> {
        if self.newlines.is_empty() {
            self.push_single_line(self.start_coords, self.end_coords);
        } else {
            self.push_multi_line();
        }
        self.rows
    }

    fn push_single_line(&mut self, start: CaretCoordinate, end: CaretCoordinate) {
        if start.top == end.top {
            self.rows.push(Row {
                top: start.top,
                left: start.left,
                width: end.left - start.left,
                height: self.line_height,
            });
        } else {
            self.push_wrapped_line(start, end);
        }
    }

    fn push_wrapped_line(&mut self, start: CaretCoordinate, end: CaretCoordinate) {
        let metrics = self.metrics;

        // First visual line runs to the right edge
        self.rows.push(Row {
            top: start.top,
            left: start.left,
            width: metrics.scroll_width - metrics.padding_right - start.left,
            height: self.line_height,
        });

        // Every fully covered visual line in between collapses into one block
        if end.top > start.top + self.line_height {
            self.rows.push(Row {
                top: start.top + self.line_height,
                left: metrics.padding_left,
                width: metrics.scroll_width - metrics.padding_x(),
                height: end.top - start.top - self.line_height,
            });
        }

        // Last visual line starts at the left edge
        self.rows.push(Row {
            top: end.top,
            left: metrics.padding_left,
            width: end.left - metrics.padding_left,
            height: self.line_height,
        });
    }

    fn push_multi_line(&mut self) {
        let end = self.selection.end;
        let end_coords = self.end_coords;
        let newlines = std::mem::take(&mut self.newlines);
        let mut pending_breaks = newlines.iter().copied().peekable();

        let mut current = self.start_coords;
        let mut index = self.selection.start;

        while current.top < end_coords.top && index <= end {
            while pending_breaks.next_if(|&at| at < index).is_some() {}
            let line_end = pending_breaks.peek().copied().unwrap_or(end).min(end);

            // The last logical line ends at `end`, whose caret is already known
            if line_end == end {
                self.push_single_line(current, end_coords);
                return;
            }

            // This logical line may itself wrap across several visual lines
            let line_end_coords = self.geometry.caret_coordinates(line_end);
            self.push_single_line(current, line_end_coords);

            index = line_end + 1;
            current = self.geometry.caret_coordinates(index);
        }

        if index < end {
            self.rows.push(Row {
                top: current.top,
                left: current.left,
                width: end_coords.left - current.left,
                height: self.line_height,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MonospaceSurface, TextSurface};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn row(top: f32, left: f32, width: f32, height: f32) -> Row {
        Row {
            top,
            left,
            width,
            height,
        }
    }

    fn rows_for(surface: &MonospaceSurface, start: usize, end: usize) -> Vec<Row> {
        compute_rows(surface, surface.value(), NormalizedSelection { start, end })
    }

    struct CountingOracle<'a> {
        inner: &'a MonospaceSurface,
        calls: Cell<usize>,
    }

    impl GeometryOracle for CountingOracle<'_> {
        fn caret_coordinates(&self, index: usize) -> CaretCoordinate {
            self.calls.set(self.calls.get() + 1);
            self.inner.caret_coordinates(index)
        }

        fn surface_metrics(&self) -> SurfaceMetrics {
            self.inner.surface_metrics()
        }
    }

    // ============ Single logical line ============

    #[test]
    fn test_single_row_selection() {
        let surface = MonospaceSurface::new("hello world", 20);
        assert_eq!(rows_for(&surface, 0, 5), vec![row(0.0, 0.0, 5.0, 1.0)]);
    }

    #[test]
    fn test_wrapped_line_with_middle_block() {
        let surface = MonospaceSurface::new(&"a".repeat(35), 10);
        assert_eq!(
            rows_for(&surface, 3, 32),
            vec![
                row(0.0, 3.0, 7.0, 1.0),
                row(1.0, 0.0, 10.0, 2.0),
                row(3.0, 0.0, 2.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_wrapped_line_across_two_visual_lines_has_no_middle_block() {
        let surface = MonospaceSurface::new(&"a".repeat(25), 10);
        assert_eq!(
            rows_for(&surface, 2, 15),
            vec![row(0.0, 2.0, 8.0, 1.0), row(1.0, 0.0, 5.0, 1.0)]
        );
    }

    #[test]
    fn test_wrapped_line_honours_padding() {
        let surface = MonospaceSurface::new(&"a".repeat(25), 10).with_padding(2.0, 3.0);
        assert_eq!(
            rows_for(&surface, 3, 22),
            vec![
                row(0.0, 5.0, 7.0, 1.0),
                row(1.0, 2.0, 10.0, 1.0),
                row(2.0, 2.0, 2.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_selection_ending_on_wrap_boundary() {
        let surface = MonospaceSurface::new(&"a".repeat(20), 10);
        assert_eq!(
            rows_for(&surface, 0, 20),
            vec![row(0.0, 0.0, 10.0, 1.0), row(1.0, 0.0, 10.0, 1.0)]
        );
    }

    #[test]
    fn test_single_line_queries_two_coordinates() {
        let surface = MonospaceSurface::new("hello world", 20);
        let oracle = CountingOracle {
            inner: &surface,
            calls: Cell::new(0),
        };
        compute_rows(&oracle, surface.value(), NormalizedSelection { start: 1, end: 4 });
        assert_eq!(oracle.calls.get(), 2);
    }

    // ============ Explicit newlines ============

    #[test]
    fn test_multi_line_selection() {
        let surface = MonospaceSurface::new("abc\ndefgh\nij", 20);
        assert_eq!(
            rows_for(&surface, 1, 11),
            vec![
                row(0.0, 1.0, 2.0, 1.0),
                row(1.0, 0.0, 5.0, 1.0),
                row(2.0, 0.0, 1.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_multi_line_selection_with_wrapped_line() {
        let surface = MonospaceSurface::new("abcdefg\nxy", 4);
        assert_eq!(
            rows_for(&surface, 1, 10),
            vec![
                row(0.0, 1.0, 3.0, 1.0),
                row(1.0, 0.0, 3.0, 1.0),
                row(2.0, 0.0, 2.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_last_line_reuses_end_coordinate() {
        // Two logical lines, the second wrapping onto three visual lines
        let surface = MonospaceSurface::new("abc\ndefghijkl", 4);
        let oracle = CountingOracle {
            inner: &surface,
            calls: Cell::new(0),
        };
        let rows = compute_rows(&oracle, surface.value(), NormalizedSelection { start: 0, end: 13 });

        // start, end, first line end, second line start
        assert_eq!(oracle.calls.get(), 4);
        assert_eq!(rows, rows_for(&surface, 0, 13));
        assert_eq!(rows.last(), Some(&row(3.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_selection_ending_just_after_newline() {
        let surface = MonospaceSurface::new("ab\ncd", 20);
        assert_eq!(rows_for(&surface, 0, 3), vec![row(0.0, 0.0, 2.0, 1.0)]);
    }

    #[test]
    fn test_empty_line_yields_zero_width_row() {
        let surface = MonospaceSurface::new("a\n\nb", 20);
        assert_eq!(
            rows_for(&surface, 0, 4),
            vec![
                row(0.0, 0.0, 1.0, 1.0),
                row(1.0, 0.0, 0.0, 1.0),
                row(2.0, 0.0, 1.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_rows_are_ordered_top_to_bottom() {
        let surface = MonospaceSurface::new("one two three\nfour five six seven\neight", 6);
        let rows = rows_for(&surface, 2, 38);
        assert!(rows.windows(2).all(|pair| pair[0].top <= pair[1].top));
    }
}
