//! Borrowed handle to one registered collaborator.

use std::time::{Duration, Instant};

use super::{CollaboratorId, CollaboratorState, Color, RenderContext};
use crate::selection::{SelectionRange, SelectionState};

/// A registered collaborator together with the renderer and layout it draws
/// against. Obtained from the registry; every change is rendered at once.
pub struct CollaboratorHandle<'a> {
    state: &'a mut CollaboratorState,
    ctx: RenderContext<'a>,
    now: Instant,
}

impl<'a> CollaboratorHandle<'a> {
    pub(crate) fn new(state: &'a mut CollaboratorState, ctx: RenderContext<'a>, now: Instant) -> Self {
        Self { state, ctx, now }
    }

    pub fn id(&self) -> &CollaboratorId {
        self.state.id()
    }

    pub fn label(&self) -> &str {
        self.state.label()
    }

    pub fn color(&self) -> &Color {
        self.state.color()
    }

    pub fn state(&self) -> &SelectionState {
        self.state.state()
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.state.selection()
    }

    pub fn set_selection(&mut self, selection: Option<SelectionRange>) {
        self.state.set_selection(&mut self.ctx, selection);
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection(&mut self.ctx);
    }

    pub fn set_color(&mut self, color: Color) {
        self.state.set_color(self.ctx.renderer, color);
    }

    pub fn show(&mut self) {
        self.state.show(self.ctx.renderer);
    }

    pub fn hide(&mut self) {
        self.state.hide(self.ctx.renderer);
    }

    pub fn show_cursor(&mut self) {
        self.state.show_cursor(self.ctx.renderer);
    }

    pub fn hide_cursor(&mut self) {
        self.state.hide_cursor(self.ctx.renderer);
    }

    pub fn show_selection(&mut self) {
        self.state.show_selection(self.ctx.renderer);
    }

    pub fn hide_selection(&mut self) {
        self.state.hide_selection(self.ctx.renderer);
    }

    pub fn show_cursor_tooltip(&mut self) {
        self.state.show_cursor_tooltip(self.ctx.renderer);
    }

    pub fn hide_cursor_tooltip(&mut self) {
        self.state.hide_cursor_tooltip(self.ctx.renderer);
    }

    /// Show the tooltip, hiding it `seconds` after the most recent call
    pub fn flash_cursor_tooltip(&mut self, seconds: f64) {
        let duration = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
        self.state
            .flash_cursor_tooltip(self.ctx.renderer, self.now, duration);
    }

    pub fn is_tooltip_visible(&self) -> bool {
        self.state.is_tooltip_visible()
    }

    pub fn refresh(&mut self) {
        self.state.refresh(&mut self.ctx);
    }
}
