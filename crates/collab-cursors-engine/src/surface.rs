//! Host text surface seam and a monospace implementation of it.
//!
//! A host surface is the single-writer text control the overlay sits on:
//! a browser textarea, a terminal text area, or a test double. The core
//! reads its selection and layout and writes its value and selection back
//! after remote edits.

use crate::geometry::{CaretCoordinate, GeometryOracle, SurfaceMetrics};

/// Position and size of the host surface, as the overlay tracks it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceBounds {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

/// Scroll position of the host surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub top: f32,
    pub left: f32,
}

pub trait TextSurface: GeometryOracle {
    fn value(&self) -> &str;

    fn set_value(&mut self, value: &str);

    /// Current `(selection_start, selection_end)`, `start <= end`
    fn selection(&self) -> (usize, usize);

    fn set_selection(&mut self, start: usize, end: usize);

    fn focus(&mut self) {}

    /// `None` when the host has no numeric line height (e.g. CSS `normal`)
    fn line_height(&self) -> Option<f32>;

    fn bounds(&self) -> SurfaceBounds;

    fn scroll_offset(&self) -> ScrollOffset {
        ScrollOffset::default()
    }
}

/// A character and the cell it occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub index: usize,
    pub line: usize,
    pub column: usize,
    pub ch: char,
}

/// An edit observed on the host surface, as a change detector reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEdit {
    Insert { index: usize, text: String },
    Delete { index: usize, length: usize },
}

/// Fixed-pitch surface laying text out on a grid of `columns` cells.
///
/// Explicit newlines start a new line; a character that would land past the
/// last column wraps to the next line. A caret directly after the last
/// column stays at the end of its line.
#[derive(Debug, Clone)]
pub struct MonospaceSurface {
    value: String,
    columns: usize,
    cell_width: f32,
    line_height: f32,
    padding_left: f32,
    padding_right: f32,
    selection: (usize, usize),
    bounds: SurfaceBounds,
    scroll: ScrollOffset,
    focused: bool,
}

impl MonospaceSurface {
    pub fn new(value: &str, columns: usize) -> Self {
        Self {
            value: value.to_string(),
            columns: columns.max(1),
            cell_width: 1.0,
            line_height: 1.0,
            padding_left: 0.0,
            padding_right: 0.0,
            selection: (0, 0),
            bounds: SurfaceBounds {
                top: 0.0,
                left: 0.0,
                width: columns as f32,
                height: 0.0,
            },
            scroll: ScrollOffset::default(),
            focused: false,
        }
    }

    pub fn with_cell_size(mut self, cell_width: f32, line_height: f32) -> Self {
        self.cell_width = cell_width;
        self.line_height = line_height;
        self
    }

    pub fn with_padding(mut self, left: f32, right: f32) -> Self {
        self.padding_left = left;
        self.padding_right = right;
        self
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_bounds(&mut self, bounds: SurfaceBounds) {
        self.bounds = bounds;
    }

    pub fn set_scroll_offset(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
    }

    pub fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Visual `(line, column)` of the caret in front of `index`
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        let mut line = 0;
        let mut column = 0;
        for ch in self.value.chars().take(index) {
            if ch == '\n' {
                line += 1;
                column = 0;
                continue;
            }
            if column == self.columns {
                line += 1;
                column = 0;
            }
            column += 1;
        }
        (line, column)
    }

    /// Every visible character with the cell it is drawn in
    pub fn glyphs(&self) -> Vec<Glyph> {
        let mut glyphs = Vec::with_capacity(self.value.len());
        let mut line = 0;
        let mut column = 0;
        for (index, ch) in self.value.chars().enumerate() {
            if ch == '\n' {
                line += 1;
                column = 0;
                continue;
            }
            if column == self.columns {
                line += 1;
                column = 0;
            }
            glyphs.push(Glyph {
                index,
                line,
                column,
                ch,
            });
            column += 1;
        }
        glyphs
    }

    /// Caret index closest to a `(line, column)` cell, for hit testing.
    /// Columns past the end of a line land on the line's last caret, lines
    /// past the end of the text on the end of the text.
    pub fn index_at(&self, line: usize, column: usize) -> usize {
        let mut best = None;
        let mut index = 0;
        let (mut at_line, mut at_column) = (0, 0);
        for ch in self.value.chars() {
            if at_line == line && (best.is_none() || at_column <= column) {
                best = Some(index);
            }
            if at_line > line {
                break;
            }
            if ch == '\n' {
                at_line += 1;
                at_column = 0;
            } else {
                if at_column == self.columns {
                    at_line += 1;
                    at_column = 0;
                }
                at_column += 1;
            }
            index += 1;
        }
        if at_line == line && (best.is_none() || at_column <= column) {
            best = Some(index);
        }
        best.unwrap_or(index)
    }

    /// Replace the current selection with `text`, the way a user typing
    /// into the control would. Returns the edits a change detector reports.
    pub fn type_text(&mut self, text: &str) -> Vec<HostEdit> {
        let (start, end) = self.selection;
        let mut edits = Vec::new();
        if end > start {
            self.splice(start, end, "");
            edits.push(HostEdit::Delete {
                index: start,
                length: end - start,
            });
        }
        if !text.is_empty() {
            self.splice(start, start, text);
            edits.push(HostEdit::Insert {
                index: start,
                text: text.to_string(),
            });
        }
        let caret = start + text.chars().count();
        self.selection = (caret, caret);
        edits
    }

    /// Delete the selection, or the character before a collapsed caret
    pub fn backspace(&mut self) -> Option<HostEdit> {
        let (start, end) = self.selection;
        let (from, to) = match (start, end) {
            (0, 0) => return None,
            (start, end) if start == end => (start - 1, end),
            range => range,
        };
        self.splice(from, to, "");
        self.selection = (from, from);
        Some(HostEdit::Delete {
            index: from,
            length: to - from,
        })
    }

    fn byte_offset(&self, index: usize) -> usize {
        self.value
            .char_indices()
            .nth(index)
            .map_or(self.value.len(), |(offset, _)| offset)
    }

    fn splice(&mut self, start: usize, end: usize, text: &str) {
        let from = self.byte_offset(start);
        let to = self.byte_offset(end);
        self.value.replace_range(from..to, text);
    }
}

impl GeometryOracle for MonospaceSurface {
    fn caret_coordinates(&self, index: usize) -> CaretCoordinate {
        let (line, column) = self.cell_of(index);
        CaretCoordinate {
            top: line as f32 * self.line_height,
            left: self.padding_left + column as f32 * self.cell_width,
            height: self.line_height,
        }
    }

    fn surface_metrics(&self) -> SurfaceMetrics {
        SurfaceMetrics {
            scroll_width: self.padding_left
                + self.columns as f32 * self.cell_width
                + self.padding_right,
            padding_left: self.padding_left,
            padding_right: self.padding_right,
        }
    }
}

impl TextSurface for MonospaceSurface {
    fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    fn selection(&self) -> (usize, usize) {
        self.selection
    }

    fn set_selection(&mut self, start: usize, end: usize) {
        self.selection = (start.min(end), start.max(end));
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn line_height(&self) -> Option<f32> {
        Some(self.line_height)
    }

    fn bounds(&self) -> SurfaceBounds {
        self.bounds
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }
}
