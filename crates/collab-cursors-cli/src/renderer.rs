//! Draws the collaborator overlay into a ratatui buffer.
//!
//! The engine talks to this renderer in text-area cell coordinates. It keeps
//! the live overlay model between frames and paints it over the text on
//! every draw.

use std::collections::{BTreeMap, HashMap};

use collab_cursors_engine::{
    CollaboratorId, Color, CursorPlacement, Element, ElementMetrics, Renderer, Row, RowHandle,
    RowPatch, ScrollOffset, SurfaceBounds,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{self, Modifier, Style},
};

struct OverlayRow {
    row: Row,
    color: Color,
    visible: bool,
}

struct OverlayCursor {
    label: String,
    color: Color,
    tooltip_color: Color,
    placement: Option<CursorPlacement>,
    visible: bool,
    tooltip_visible: bool,
}

#[derive(Default)]
pub struct TerminalRenderer {
    rows: BTreeMap<RowHandle, OverlayRow>,
    cursors: HashMap<CollaboratorId, OverlayCursor>,
    next_handle: u64,
    hidden: bool,
    offset: ScrollOffset,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint the overlay over the text already drawn in `area`
    pub fn draw(&self, buf: &mut Buffer, area: Rect) {
        if self.hidden {
            return;
        }

        for overlay in self.rows.values().filter(|overlay| overlay.visible) {
            let row = overlay.row;
            let top = row.top + self.offset.top;
            let left = row.left + self.offset.left;
            for dy in 0..cells(row.height) {
                for dx in 0..cells(row.width) {
                    if let Some(cell) = cell_in(area, left + dx as f32, top + dy as f32)
                        .and_then(|position| buf.cell_mut(position))
                    {
                        cell.set_bg(to_terminal(&overlay.color));
                    }
                }
            }
        }

        for cursor in self.cursors.values().filter(|cursor| cursor.visible) {
            let Some(placement) = cursor.placement else {
                continue;
            };
            let caret = placement.caret;
            if let Some(cell) = cell_in(
                area,
                caret.left + self.offset.left,
                caret.top + self.offset.top,
            )
            .and_then(|position| buf.cell_mut(position))
            {
                cell.set_bg(to_terminal(&cursor.color));
                cell.set_style(Style::default().add_modifier(Modifier::BOLD));
            }

            if cursor.tooltip_visible
                && let Some((x, y)) = cell_in(
                    area,
                    placement.tooltip_left + self.offset.left,
                    placement.tooltip_top + self.offset.top,
                )
            {
                let room = (area.x + area.width).saturating_sub(x) as usize;
                let tooltip_style = Style::default()
                    .bg(to_terminal(&cursor.tooltip_color))
                    .fg(style::Color::Black);
                buf.set_stringn(x, y, format!(" {} ", cursor.label), room, tooltip_style);
            }
        }
    }
}

fn cells(extent: f32) -> u16 {
    extent.max(0.0).round() as u16
}

/// Absolute buffer position of a text-area cell, if it is on screen
fn cell_in(area: Rect, left: f32, top: f32) -> Option<(u16, u16)> {
    let (left, top) = (left.round(), top.round());
    if left < 0.0 || top < 0.0 || left >= area.width as f32 || top >= area.height as f32 {
        return None;
    }
    Some((area.x + left as u16, area.y + top as u16))
}

fn to_terminal(color: &Color) -> style::Color {
    style::Color::Rgb(color.r, color.g, color.b)
}

impl Renderer for TerminalRenderer {
    fn create_row(&mut self, _owner: &CollaboratorId, row: &Row, color: &Color) -> RowHandle {
        let handle = RowHandle(self.next_handle);
        self.next_handle += 1;
        self.rows.insert(
            handle,
            OverlayRow {
                row: *row,
                color: color.clone(),
                visible: true,
            },
        );
        handle
    }

    fn update_row(&mut self, handle: RowHandle, patch: &RowPatch) {
        if let Some(overlay) = self.rows.get_mut(&handle) {
            patch.apply(&mut overlay.row);
        }
    }

    fn remove_row(&mut self, handle: RowHandle) {
        self.rows.remove(&handle);
    }

    fn attach_cursor(&mut self, owner: &CollaboratorId, label: &str, color: &Color) {
        self.cursors.insert(
            owner.clone(),
            OverlayCursor {
                label: label.to_string(),
                color: color.clone(),
                tooltip_color: color.clone(),
                placement: None,
                visible: true,
                tooltip_visible: false,
            },
        );
    }

    fn detach_cursor(&mut self, owner: &CollaboratorId) {
        self.cursors.remove(owner);
    }

    fn position_cursor(&mut self, owner: &CollaboratorId, placement: &CursorPlacement) {
        if let Some(cursor) = self.cursors.get_mut(owner) {
            cursor.placement = Some(*placement);
        }
    }

    fn show_tooltip(&mut self, owner: &CollaboratorId) {
        if let Some(cursor) = self.cursors.get_mut(owner) {
            cursor.tooltip_visible = true;
        }
    }

    fn hide_tooltip(&mut self, owner: &CollaboratorId) {
        if let Some(cursor) = self.cursors.get_mut(owner) {
            cursor.tooltip_visible = false;
        }
    }

    fn set_color(&mut self, element: &Element, color: &Color) {
        match element {
            Element::Cursor(owner) => {
                if let Some(cursor) = self.cursors.get_mut(owner) {
                    cursor.color = color.clone();
                }
            }
            Element::Tooltip(owner) => {
                if let Some(cursor) = self.cursors.get_mut(owner) {
                    cursor.tooltip_color = color.clone();
                }
            }
            Element::Row(handle) => {
                if let Some(overlay) = self.rows.get_mut(handle) {
                    overlay.color = color.clone();
                }
            }
        }
    }

    fn set_visible(&mut self, element: &Element, visible: bool) {
        match element {
            Element::Cursor(owner) => {
                if let Some(cursor) = self.cursors.get_mut(owner) {
                    cursor.visible = visible;
                }
            }
            Element::Tooltip(owner) => {
                if let Some(cursor) = self.cursors.get_mut(owner) {
                    cursor.tooltip_visible = visible;
                }
            }
            Element::Row(handle) => {
                if let Some(overlay) = self.rows.get_mut(handle) {
                    overlay.visible = visible;
                }
            }
        }
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        self.hidden = !visible;
    }

    // The overlay is drawn straight into the text area, so it always
    // shares its bounds.
    fn set_overlay_bounds(&mut self, _bounds: SurfaceBounds) {}

    fn set_scroll_offset(&mut self, offset: ScrollOffset) {
        self.offset = offset;
    }

    fn element_metrics(&self, owner: &CollaboratorId) -> ElementMetrics {
        let label_width = self
            .cursors
            .get(owner)
            .map_or(0, |cursor| cursor.label.chars().count());
        ElementMetrics {
            cursor_width: 0.0,
            tooltip_width: (label_width + 2) as f32,
            tooltip_height: 1.0,
        }
    }

    fn dispose(&mut self) {
        self.rows.clear();
        self.cursors.clear();
    }
}
