/*!
 * # Collaborators
 *
 * One [`CollaboratorState`] per remote collaborator. It owns everything the
 * collaborator has on screen: the cursor and its tooltip, the highlight
 * rows, and the pending tooltip hide.
 *
 * ## State machine
 *
 * The selection state starts as `NoSelection` and only `set_selection`
 * moves it:
 *
 * - `None` → `NoSelection`: cursor detached, rows released
 * - collapsed range → `CollapsedCursor`: cursor at `target`, rows released
 * - non-empty range → `RangeSelection`: cursor at `target`, rows recomputed
 *   over the normalized range and reconciled against the previous rows
 *
 * Every `set_selection` cancels a pending tooltip hide and hides the
 * tooltip, so a stale hide can never fire against a newer state. Rebasing
 * across an edit is not a new state: it moves the selection with the text
 * and leaves the tooltip and its pending hide alone.
 *
 * Color and visibility changes are valid in any state and never touch
 * geometry.
 */

pub mod handle;
pub mod placement;
pub mod timer;

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub use handle::CollaboratorHandle;
pub use placement::{OverlayFrame, place_cursor};
pub use timer::{Clock, ManualClock, SystemClock, TooltipTimer};

use crate::error::ConfigurationError;
use crate::geometry::{Layout, compute_rows};
use crate::render::{Element, RenderedRow, Renderer, RowStyle, reconcile_rows};
use crate::selection::{SelectionRange, SelectionState};

/// Unique identifier of a collaborator within one overlay
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollaboratorId(String);

impl CollaboratorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CollaboratorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CollaboratorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for CollaboratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque RGB color, written as `#rrggbb`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = ConfigurationError;

    /// Accepts `#rgb` and `#rrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Everything a collaborator operation needs from its surroundings
pub struct RenderContext<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub layout: Layout<'a>,
    pub frame: OverlayFrame,
    pub tooltip_margin: f32,
}

#[derive(Debug)]
pub struct CollaboratorState {
    id: CollaboratorId,
    label: String,
    color: Color,
    state: SelectionState,
    rows: Vec<RenderedRow>,
    cursor_attached: bool,
    cursor_visible: bool,
    selection_visible: bool,
    tooltip_visible: bool,
    tooltip_timer: TooltipTimer,
}

impl CollaboratorState {
    pub fn new(id: CollaboratorId, label: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            label: label.into(),
            color,
            state: SelectionState::NoSelection,
            rows: Vec::new(),
            cursor_attached: false,
            cursor_visible: true,
            selection_visible: true,
            tooltip_visible: false,
            tooltip_timer: TooltipTimer::default(),
        }
    }

    pub fn id(&self) -> &CollaboratorId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.state.selection()
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn is_tooltip_visible(&self) -> bool {
        self.tooltip_visible
    }

    pub fn tooltip_pending(&self) -> bool {
        self.tooltip_timer.is_pending()
    }

    pub fn set_selection(&mut self, ctx: &mut RenderContext<'_>, selection: Option<SelectionRange>) {
        self.hide_cursor_tooltip(ctx.renderer);
        self.state = SelectionState::from_selection(selection);
        self.refresh(ctx);
    }

    /// Move the selection across an edit. The tooltip keeps its timer.
    pub(crate) fn rebase(&mut self, ctx: &mut RenderContext<'_>, selection: SelectionRange) {
        self.state = SelectionState::from_selection(Some(selection));
        self.refresh(ctx);
    }

    pub fn clear_selection(&mut self, ctx: &mut RenderContext<'_>) {
        self.set_selection(ctx, None);
    }

    /// Recompute cursor placement and rows against the current layout
    pub fn refresh(&mut self, ctx: &mut RenderContext<'_>) {
        self.update_cursor(ctx);
        self.update_rows(ctx);
    }

    fn update_cursor(&mut self, ctx: &mut RenderContext<'_>) {
        let Some(at) = self.state.cursor() else {
            if self.cursor_attached {
                ctx.renderer.detach_cursor(&self.id);
                self.cursor_attached = false;
            }
            return;
        };

        if !self.cursor_attached {
            ctx.renderer.attach_cursor(&self.id, &self.label, &self.color);
            self.cursor_attached = true;
            if !self.cursor_visible {
                ctx.renderer
                    .set_visible(&Element::Cursor(self.id.clone()), false);
            }
            if self.tooltip_visible {
                ctx.renderer.show_tooltip(&self.id);
            }
        }

        let caret = ctx.layout.geometry.caret_coordinates(at);
        let metrics = ctx.renderer.element_metrics(&self.id);
        let placement = place_cursor(caret, metrics, ctx.frame, ctx.tooltip_margin);
        ctx.renderer.position_cursor(&self.id, &placement);
    }

    fn update_rows(&mut self, ctx: &mut RenderContext<'_>) {
        let next = match self.state {
            SelectionState::RangeSelection { range } => {
                compute_rows(ctx.layout.geometry, ctx.layout.text, range.normalize())
            }
            SelectionState::NoSelection | SelectionState::CollapsedCursor { .. } => Vec::new(),
        };

        let style = RowStyle {
            color: &self.color,
            visible: self.selection_visible,
        };
        reconcile_rows(ctx.renderer, &self.id, style, &mut self.rows, &next);
    }

    /// Recolor cursor, tooltip and every row without touching geometry
    pub fn set_color(&mut self, renderer: &mut dyn Renderer, color: Color) {
        self.color = color;
        if self.cursor_attached {
            renderer.set_color(&Element::Cursor(self.id.clone()), &self.color);
            renderer.set_color(&Element::Tooltip(self.id.clone()), &self.color);
        }
        for row in &self.rows {
            renderer.set_color(&Element::Row(row.handle), &self.color);
        }
    }

    pub fn show_cursor(&mut self, renderer: &mut dyn Renderer) {
        self.set_cursor_visible(renderer, true);
    }

    pub fn hide_cursor(&mut self, renderer: &mut dyn Renderer) {
        self.set_cursor_visible(renderer, false);
    }

    pub fn show_selection(&mut self, renderer: &mut dyn Renderer) {
        self.set_selection_visible(renderer, true);
    }

    pub fn hide_selection(&mut self, renderer: &mut dyn Renderer) {
        self.set_selection_visible(renderer, false);
    }

    /// Show cursor and selection. Idempotent.
    pub fn show(&mut self, renderer: &mut dyn Renderer) {
        self.show_cursor(renderer);
        self.show_selection(renderer);
    }

    /// Hide cursor and selection, keeping all state. Idempotent.
    pub fn hide(&mut self, renderer: &mut dyn Renderer) {
        self.hide_cursor(renderer);
        self.hide_selection(renderer);
    }

    fn set_cursor_visible(&mut self, renderer: &mut dyn Renderer, visible: bool) {
        if self.cursor_visible == visible {
            return;
        }
        self.cursor_visible = visible;
        if self.cursor_attached {
            renderer.set_visible(&Element::Cursor(self.id.clone()), visible);
        }
    }

    fn set_selection_visible(&mut self, renderer: &mut dyn Renderer, visible: bool) {
        if self.selection_visible == visible {
            return;
        }
        self.selection_visible = visible;
        for row in &self.rows {
            renderer.set_visible(&Element::Row(row.handle), visible);
        }
    }

    /// Show the tooltip until told otherwise, cancelling any pending hide
    pub fn show_cursor_tooltip(&mut self, renderer: &mut dyn Renderer) {
        self.tooltip_timer.cancel();
        if !self.tooltip_visible {
            self.tooltip_visible = true;
            if self.cursor_attached {
                renderer.show_tooltip(&self.id);
            }
        }
    }

    pub fn hide_cursor_tooltip(&mut self, renderer: &mut dyn Renderer) {
        self.tooltip_timer.cancel();
        if self.tooltip_visible {
            self.tooltip_visible = false;
            if self.cursor_attached {
                renderer.hide_tooltip(&self.id);
            }
        }
    }

    /// Show the tooltip now and hide it `duration` after the last call
    pub fn flash_cursor_tooltip(
        &mut self,
        renderer: &mut dyn Renderer,
        now: Instant,
        duration: Duration,
    ) {
        self.show_cursor_tooltip(renderer);
        self.tooltip_timer.arm(now, duration);
    }

    /// Run the pending tooltip hide if it is due. Returns whether it ran.
    pub fn poll_tooltip(&mut self, renderer: &mut dyn Renderer, now: Instant) -> bool {
        if !self.tooltip_timer.fire_if_due(now) {
            return false;
        }
        self.hide_cursor_tooltip(renderer);
        true
    }

    /// Drop every element this collaborator owns and cancel its timer
    pub fn release(&mut self, renderer: &mut dyn Renderer) {
        if self.tooltip_timer.cancel() {
            log::warn!("cancelled pending tooltip hide for {}", self.id);
        }
        for row in self.rows.drain(..) {
            renderer.remove_row(row.handle);
        }
        if self.cursor_attached {
            renderer.detach_cursor(&self.id);
            self.cursor_attached = false;
        }
        self.tooltip_visible = false;
        self.state = SelectionState::NoSelection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingRenderer, RenderOp};
    use crate::surface::{MonospaceSurface, TextSurface};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    struct Fixture {
        surface: MonospaceSurface,
        renderer: RecordingRenderer,
        collaborator: CollaboratorState,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            Self {
                surface: MonospaceSurface::new(text, 10),
                renderer: RecordingRenderer::new(),
                collaborator: CollaboratorState::new(
                    CollaboratorId::from("bob"),
                    "Bob",
                    Color::rgb(0, 128, 0),
                ),
            }
        }

        fn set_selection(&mut self, selection: Option<SelectionRange>) {
            let mut ctx = RenderContext {
                renderer: &mut self.renderer,
                layout: Layout::new(&self.surface, self.surface.value()),
                frame: OverlayFrame::default(),
                tooltip_margin: 5.0,
            };
            self.collaborator.set_selection(&mut ctx, selection);
        }

        fn id(&self) -> CollaboratorId {
            self.collaborator.id().clone()
        }
    }

    // ============ Colors ============

    #[rstest]
    #[case("#ff0000", Color::rgb(255, 0, 0))]
    #[case("#0a0B0c", Color::rgb(10, 11, 12))]
    #[case("#fa0", Color::rgb(255, 170, 0))]
    fn test_color_parses(#[case] input: &str, #[case] expected: Color) {
        assert_eq!(input.parse::<Color>().unwrap(), expected);
    }

    #[rstest]
    #[case("ff0000")]
    #[case("#ff00")]
    #[case("#gg0000")]
    #[case("#ééé")]
    fn test_invalid_color_is_rejected(#[case] input: &str) {
        assert_eq!(
            input.parse::<Color>(),
            Err(ConfigurationError::InvalidColor(input.to_string()))
        );
    }

    #[test]
    fn test_color_display_round_trips() {
        let color = Color::rgb(1, 2, 255);
        assert_eq!(color.to_string(), "#0102ff");
        assert_eq!(color.to_string().parse::<Color>().unwrap(), color);
    }

    // ============ State machine ============

    #[test]
    fn test_initial_state_is_no_selection() {
        let fixture = Fixture::new("hello");
        assert_eq!(fixture.collaborator.state(), &SelectionState::NoSelection);
        assert!(fixture.collaborator.rows().is_empty());
    }

    #[test]
    fn test_collapsed_selection_renders_cursor_without_rows() {
        let mut fixture = Fixture::new("hello world");
        fixture.set_selection(Some(SelectionRange::collapsed(3)));

        assert_eq!(
            fixture.collaborator.state(),
            &SelectionState::CollapsedCursor { at: 3 }
        );
        let cursor = fixture.renderer.cursor(&fixture.id()).unwrap();
        assert_eq!(cursor.placement.unwrap().caret.left, 3.0);
        assert_eq!(fixture.renderer.row_count(), 0);
    }

    #[test]
    fn test_range_selection_renders_cursor_at_target_and_rows() {
        let mut fixture = Fixture::new("hello world");
        fixture.set_selection(Some(SelectionRange::new(8, 2)));

        let cursor = fixture.renderer.cursor(&fixture.id()).unwrap();
        assert_eq!(cursor.placement.unwrap().caret.left, 2.0);
        assert_eq!(fixture.collaborator.rows().len(), 1);
        assert_eq!(fixture.collaborator.rows()[0].row.width, 6.0);
    }

    #[test]
    fn test_clearing_selection_detaches_cursor_and_releases_rows() {
        let mut fixture = Fixture::new("hello world");
        fixture.set_selection(Some(SelectionRange::new(0, 5)));
        fixture.set_selection(None);

        assert_eq!(fixture.collaborator.state(), &SelectionState::NoSelection);
        assert!(fixture.renderer.cursor(&fixture.id()).is_none());
        assert_eq!(fixture.renderer.row_count(), 0);
    }

    #[test]
    fn test_collapsing_range_releases_rows_but_keeps_cursor() {
        let mut fixture = Fixture::new("hello world");
        fixture.set_selection(Some(SelectionRange::new(0, 5)));
        fixture.set_selection(Some(SelectionRange::collapsed(5)));

        assert!(fixture.renderer.cursor(&fixture.id()).is_some());
        assert_eq!(fixture.renderer.row_count(), 0);
    }

    // ============ Color and visibility ============

    #[test]
    fn test_set_color_recolors_everything_without_geometry_changes() {
        let mut fixture = Fixture::new("hello world");
        fixture.set_selection(Some(SelectionRange::new(0, 5)));
        fixture.renderer.take_ops();

        let color = Color::rgb(9, 9, 9);
        fixture
            .collaborator
            .set_color(&mut fixture.renderer, color.clone());

        let ops = fixture.renderer.take_ops();
        assert_eq!(ops.len(), 3);
        assert!(
            ops.iter()
                .all(|op| matches!(op, RenderOp::SetColor { color: c, .. } if *c == color))
        );
    }

    #[test]
    fn test_hide_is_idempotent() {
        let mut fixture = Fixture::new("hello world");
        fixture.set_selection(Some(SelectionRange::new(0, 5)));
        fixture.renderer.take_ops();

        fixture.collaborator.hide(&mut fixture.renderer);
        let first = fixture.renderer.take_ops();
        fixture.collaborator.hide(&mut fixture.renderer);
        let second = fixture.renderer.take_ops();

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
    }

    #[test]
    fn test_rows_created_while_hidden_stay_hidden() {
        let mut fixture = Fixture::new("hello world");
        fixture.collaborator.hide_selection(&mut fixture.renderer);
        fixture.set_selection(Some(SelectionRange::new(0, 5)));

        let handle = fixture.collaborator.rows()[0].handle;
        assert!(!fixture.renderer.row_visible(handle));
    }

    // ============ Tooltip ============

    #[test]
    fn test_set_selection_cancels_pending_tooltip_hide() {
        let mut fixture = Fixture::new("hello world");
        fixture.set_selection(Some(SelectionRange::collapsed(1)));
        let clock = ManualClock::new();
        fixture.collaborator.flash_cursor_tooltip(
            &mut fixture.renderer,
            clock.now(),
            Duration::from_secs(2),
        );
        assert!(fixture.collaborator.tooltip_pending());

        fixture.set_selection(Some(SelectionRange::collapsed(2)));
        assert!(!fixture.collaborator.tooltip_pending());
        assert!(!fixture.renderer.tooltip_visible(&fixture.id()));
    }

    #[test]
    fn test_release_drops_every_element() {
        let mut fixture = Fixture::new("hello world");
        fixture.set_selection(Some(SelectionRange::new(0, 5)));
        fixture.collaborator.release(&mut fixture.renderer);

        assert_eq!(fixture.renderer.row_count(), 0);
        assert!(fixture.renderer.cursor(&fixture.id()).is_none());
        assert!(!fixture.collaborator.tooltip_pending());
    }
}
