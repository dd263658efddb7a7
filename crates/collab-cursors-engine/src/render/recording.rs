//! Headless renderer that records every operation.
//!
//! Keeps a live model of the overlay (rows, cursors, tooltips, visibility)
//! next to the raw operation log, so tests can assert either on what is on
//! screen or on exactly which writes happened.

use std::collections::BTreeMap;

use super::{CursorPlacement, Element, ElementMetrics, Renderer, RowHandle, RowPatch};
use crate::collaborator::{CollaboratorId, Color};
use crate::geometry::Row;
use crate::surface::{ScrollOffset, SurfaceBounds};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    CreateRow {
        owner: CollaboratorId,
        handle: RowHandle,
        row: Row,
        color: Color,
    },
    UpdateRow {
        handle: RowHandle,
        patch: RowPatch,
    },
    RemoveRow {
        handle: RowHandle,
    },
    AttachCursor {
        owner: CollaboratorId,
        label: String,
        color: Color,
    },
    DetachCursor {
        owner: CollaboratorId,
    },
    PositionCursor {
        owner: CollaboratorId,
        placement: CursorPlacement,
    },
    ShowTooltip {
        owner: CollaboratorId,
    },
    HideTooltip {
        owner: CollaboratorId,
    },
    SetColor {
        element: Element,
        color: Color,
    },
    SetVisible {
        element: Element,
        visible: bool,
    },
    SetOverlayVisible {
        visible: bool,
    },
    SetOverlayBounds {
        bounds: SurfaceBounds,
    },
    SetScrollOffset {
        offset: ScrollOffset,
    },
    Dispose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    pub owner: CollaboratorId,
    pub row: Row,
    pub color: Color,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CursorRecord {
    pub label: String,
    pub color: Color,
    pub placement: Option<CursorPlacement>,
    pub visible: bool,
    pub tooltip_visible: bool,
    pub tooltip_color: Color,
}

#[derive(Debug)]
pub struct RecordingRenderer {
    ops: Vec<RenderOp>,
    rows: BTreeMap<RowHandle, RowRecord>,
    cursors: BTreeMap<CollaboratorId, CursorRecord>,
    next_handle: u64,
    metrics: ElementMetrics,
    overlay_visible: bool,
    bounds: SurfaceBounds,
    scroll: ScrollOffset,
    disposed: bool,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            rows: BTreeMap::new(),
            cursors: BTreeMap::new(),
            next_handle: 0,
            metrics: ElementMetrics::default(),
            overlay_visible: true,
            bounds: SurfaceBounds::default(),
            scroll: ScrollOffset::default(),
            disposed: false,
        }
    }

    /// Report these sizes for every cursor and tooltip
    pub fn with_metrics(mut self, metrics: ElementMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    /// Drain the operation log, keeping the live model
    pub fn take_ops(&mut self) -> Vec<RenderOp> {
        std::mem::take(&mut self.ops)
    }

    /// Rows currently owned by `owner`, top to bottom
    pub fn live_rows(&self, owner: &CollaboratorId) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .rows
            .values()
            .filter(|record| &record.owner == owner)
            .map(|record| record.row)
            .collect();
        rows.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.left.total_cmp(&b.left)));
        rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, handle: RowHandle) -> Option<&RowRecord> {
        self.rows.get(&handle)
    }

    pub fn row_visible(&self, handle: RowHandle) -> bool {
        self.rows.get(&handle).is_some_and(|record| record.visible)
    }

    pub fn cursor(&self, owner: &CollaboratorId) -> Option<&CursorRecord> {
        self.cursors.get(owner)
    }

    pub fn tooltip_visible(&self, owner: &CollaboratorId) -> bool {
        self.cursors
            .get(owner)
            .is_some_and(|cursor| cursor.tooltip_visible)
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn overlay_bounds(&self) -> SurfaceBounds {
        self.bounds
    }

    pub fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Renderer for RecordingRenderer {
    fn create_row(&mut self, owner: &CollaboratorId, row: &Row, color: &Color) -> RowHandle {
        let handle = RowHandle(self.next_handle);
        self.next_handle += 1;
        self.rows.insert(
            handle,
            RowRecord {
                owner: owner.clone(),
                row: *row,
                color: color.clone(),
                visible: true,
            },
        );
        self.ops.push(RenderOp::CreateRow {
            owner: owner.clone(),
            handle,
            row: *row,
            color: color.clone(),
        });
        handle
    }

    fn update_row(&mut self, handle: RowHandle, patch: &RowPatch) {
        if let Some(record) = self.rows.get_mut(&handle) {
            patch.apply(&mut record.row);
        }
        self.ops.push(RenderOp::UpdateRow {
            handle,
            patch: *patch,
        });
    }

    fn remove_row(&mut self, handle: RowHandle) {
        self.rows.remove(&handle);
        self.ops.push(RenderOp::RemoveRow { handle });
    }

    fn attach_cursor(&mut self, owner: &CollaboratorId, label: &str, color: &Color) {
        self.cursors.insert(
            owner.clone(),
            CursorRecord {
                label: label.to_string(),
                color: color.clone(),
                placement: None,
                visible: true,
                tooltip_visible: false,
                tooltip_color: color.clone(),
            },
        );
        self.ops.push(RenderOp::AttachCursor {
            owner: owner.clone(),
            label: label.to_string(),
            color: color.clone(),
        });
    }

    fn detach_cursor(&mut self, owner: &CollaboratorId) {
        self.cursors.remove(owner);
        self.ops.push(RenderOp::DetachCursor {
            owner: owner.clone(),
        });
    }

    fn position_cursor(&mut self, owner: &CollaboratorId, placement: &CursorPlacement) {
        if let Some(cursor) = self.cursors.get_mut(owner) {
            cursor.placement = Some(*placement);
        }
        self.ops.push(RenderOp::PositionCursor {
            owner: owner.clone(),
            placement: *placement,
        });
    }

    fn show_tooltip(&mut self, owner: &CollaboratorId) {
        if let Some(cursor) = self.cursors.get_mut(owner) {
            cursor.tooltip_visible = true;
        }
        self.ops.push(RenderOp::ShowTooltip {
            owner: owner.clone(),
        });
    }

    fn hide_tooltip(&mut self, owner: &CollaboratorId) {
        if let Some(cursor) = self.cursors.get_mut(owner) {
            cursor.tooltip_visible = false;
        }
        self.ops.push(RenderOp::HideTooltip {
            owner: owner.clone(),
        });
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
                if let Some(record) = self.rows.get_mut(handle) {
                    record.color = color.clone();
                }
            }
        }
        self.ops.push(RenderOp::SetColor {
            element: element.clone(),
            color: color.clone(),
        });
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
                if let Some(record) = self.rows.get_mut(handle) {
                    record.visible = visible;
                }
            }
        }
        self.ops.push(RenderOp::SetVisible {
            element: element.clone(),
            visible,
        });
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay_visible = visible;
        self.ops.push(RenderOp::SetOverlayVisible { visible });
    }

    fn set_overlay_bounds(&mut self, bounds: SurfaceBounds) {
        self.bounds = bounds;
        self.ops.push(RenderOp::SetOverlayBounds { bounds });
    }

    fn set_scroll_offset(&mut self, offset: ScrollOffset) {
        self.scroll = offset;
        self.ops.push(RenderOp::SetScrollOffset { offset });
    }

    fn element_metrics(&self, _owner: &CollaboratorId) -> ElementMetrics {
        self.metrics
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.ops.push(RenderOp::Dispose);
    }
}
