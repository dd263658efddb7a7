/*!
 * # Selection Manager
 *
 * The collaborator registry. Owns the host surface, the renderer and every
 * [`CollaboratorState`], keyed by id in registration order.
 *
 * ## Edits
 *
 * `update_selections_on_insert` / `update_selections_on_delete` rebase every
 * collaborator across one edit before returning. Nothing else can run in
 * between, so an edit is never observed half-applied.
 *
 * ## Local selection
 *
 * The local user's selection is tracked as an `(anchor, target)` pair. Host
 * surfaces only report `(start, end)`, so the anchor is recovered from the
 * previous sample: if the old anchor is still one of the endpoints it stays
 * the anchor, otherwise the roles swap.
 *
 * ## Deferred work
 *
 * Nothing here sleeps. A selection check scheduled from an input event runs
 * on the next [`SelectionManager::run_deferred`] and tooltip hides run from
 * [`SelectionManager::poll_timers`].
 */

use indexmap::IndexMap;

use crate::collaborator::{
    Clock, CollaboratorHandle, CollaboratorId, CollaboratorState, Color, OverlayFrame,
    RenderContext, SystemClock,
};
use crate::error::{CollaboratorError, ConfigurationError};
use crate::geometry::Layout;
use crate::render::Renderer;
use crate::selection::SelectionRange;
use crate::surface::{ScrollOffset, SurfaceBounds, TextSurface};

/// Overlay tuning knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    /// Minimum distance a tooltip keeps from the overlay's top and right edges
    pub tooltip_margin: f32,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            tooltip_margin: 5.0,
        }
    }
}

pub type SelectionCallback = Box<dyn FnMut(SelectionRange)>;

pub struct SelectionManager<S: TextSurface, R: Renderer> {
    surface: S,
    renderer: R,
    collaborators: IndexMap<CollaboratorId, CollaboratorState>,
    options: OverlayOptions,
    local: SelectionRange,
    bounds: SurfaceBounds,
    offset: ScrollOffset,
    visible: bool,
    pointer_pressed: bool,
    selection_check_pending: bool,
    on_selection_changed: Option<SelectionCallback>,
    clock: Box<dyn Clock>,
}

impl<S: TextSurface, R: Renderer> SelectionManager<S, R> {
    pub fn new(surface: S, renderer: R) -> Result<Self, ConfigurationError> {
        Self::with_options(surface, renderer, OverlayOptions::default())
    }

    /// Fails when the surface cannot report a numeric line height
    pub fn with_options(
        surface: S,
        mut renderer: R,
        options: OverlayOptions,
    ) -> Result<Self, ConfigurationError> {
        match surface.line_height() {
            Some(height) if height.is_finite() => {}
            _ => return Err(ConfigurationError::NonNumericLineHeight),
        }

        let bounds = surface.bounds();
        renderer.set_overlay_bounds(bounds);
        let scroll = surface.scroll_offset();
        let offset = ScrollOffset {
            top: -scroll.top,
            left: -scroll.left,
        };
        renderer.set_scroll_offset(offset);

        let (start, end) = surface.selection();

        Ok(Self {
            surface,
            renderer,
            collaborators: IndexMap::new(),
            options,
            local: SelectionRange::new(start, end),
            bounds,
            offset,
            visible: true,
            pointer_pressed: false,
            selection_check_pending: false,
            on_selection_changed: None,
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.set_clock(Box::new(clock));
        self
    }

    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    /// Called with the new local selection whenever a sample differs from
    /// the recorded one
    pub fn set_selection_callback(&mut self, callback: impl FnMut(SelectionRange) + 'static) {
        self.on_selection_changed = Some(Box::new(callback));
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn options(&self) -> OverlayOptions {
        self.options
    }

    // ============ Registry ============

    pub fn add_collaborator(
        &mut self,
        id: impl Into<CollaboratorId>,
        label: impl Into<String>,
        color: Color,
        selection: Option<SelectionRange>,
    ) -> Result<CollaboratorHandle<'_>, CollaboratorError> {
        let id = id.into();
        if self.collaborators.contains_key(&id) {
            return Err(CollaboratorError::Duplicate(id));
        }
        log::debug!("adding collaborator {id}");

        self.collaborators.insert(
            id.clone(),
            CollaboratorState::new(id.clone(), label, color),
        );
        let mut handle = self.collaborator(&id)?;
        if selection.is_some() {
            handle.set_selection(selection);
        }
        Ok(handle)
    }

    pub fn collaborator(
        &mut self,
        id: &CollaboratorId,
    ) -> Result<CollaboratorHandle<'_>, CollaboratorError> {
        let now = self.clock.now();
        let frame = self.frame();
        let state = self
            .collaborators
            .get_mut(id)
            .ok_or_else(|| CollaboratorError::Unknown(id.clone()))?;
        let ctx = RenderContext {
            renderer: &mut self.renderer,
            layout: Layout::new(&self.surface, self.surface.value()),
            frame,
            tooltip_margin: self.options.tooltip_margin,
        };
        Ok(CollaboratorHandle::new(state, ctx, now))
    }

    /// Remove a collaborator, releasing its rows, cursor and pending timer
    pub fn remove_collaborator(&mut self, id: &CollaboratorId) -> Result<(), CollaboratorError> {
        let mut state = self
            .collaborators
            .shift_remove(id)
            .ok_or_else(|| CollaboratorError::Unknown(id.clone()))?;
        state.release(&mut self.renderer);
        log::debug!("removed collaborator {id}");
        Ok(())
    }

    pub fn contains(&self, id: &CollaboratorId) -> bool {
        self.collaborators.contains_key(id)
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &CollaboratorId> {
        self.collaborators.keys()
    }

    pub fn len(&self) -> usize {
        self.collaborators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collaborators.is_empty()
    }

    // ============ Edits ============

    /// Rebase every collaborator across an insert of `text` at `index`
    pub fn update_selections_on_insert(&mut self, index: usize, text: &str) {
        let inserted_len = text.chars().count();
        log::debug!("rebasing collaborators over insert of {inserted_len} at {index}");
        self.rebase_all(|range| range.transform_on_insert(index, inserted_len));
    }

    /// Rebase every collaborator across a delete of `length` chars at `index`
    pub fn update_selections_on_delete(&mut self, index: usize, length: usize) {
        log::debug!("rebasing collaborators over delete of {length} at {index}");
        self.rebase_all(|range| range.transform_on_delete(index, length));
    }

    fn rebase_all(&mut self, transform: impl Fn(SelectionRange) -> SelectionRange) {
        self.for_each_collaborator(|state, ctx| {
            if let Some(range) = state.selection() {
                state.rebase(ctx, transform(range));
            }
        });
    }

    fn for_each_collaborator(
        &mut self,
        mut f: impl FnMut(&mut CollaboratorState, &mut RenderContext<'_>),
    ) {
        let frame = self.frame();
        let mut ctx = RenderContext {
            renderer: &mut self.renderer,
            layout: Layout::new(&self.surface, self.surface.value()),
            frame,
            tooltip_margin: self.options.tooltip_margin,
        };
        for state in self.collaborators.values_mut() {
            f(state, &mut ctx);
        }
    }

    fn frame(&self) -> OverlayFrame {
        OverlayFrame {
            width: self.bounds.width,
            offset_top: self.offset.top,
        }
    }

    /// Recompute every collaborator against the current layout
    pub fn refresh(&mut self) {
        self.for_each_collaborator(|state, ctx| state.refresh(ctx));
    }

    // ============ Local selection ============

    pub fn get_selection(&self) -> SelectionRange {
        self.local
    }

    pub(crate) fn set_local_selection(&mut self, selection: SelectionRange) {
        self.local = selection;
    }

    /// Sample the surface one turn from now
    pub fn schedule_selection_check(&mut self) {
        self.selection_check_pending = true;
    }

    pub fn selection_check_pending(&self) -> bool {
        self.selection_check_pending
    }

    /// Run scheduled work. Returns whether anything ran.
    pub fn run_deferred(&mut self) -> bool {
        if !std::mem::take(&mut self.selection_check_pending) {
            return false;
        }
        self.check_selection();
        true
    }

    /// Sample the surface selection now. Returns the new selection if it
    /// changed.
    pub fn check_selection(&mut self) -> Option<SelectionRange> {
        let (start, end) = self.surface.selection();
        let sampled = if self.local.anchor == start {
            SelectionRange::new(start, end)
        } else {
            SelectionRange::new(end, start)
        };
        if sampled.normalize() == self.local.normalize() {
            return None;
        }

        log::debug!(
            "local selection changed to {}..{}",
            sampled.anchor,
            sampled.target
        );
        self.local = sampled;
        if let Some(callback) = self.on_selection_changed.as_mut() {
            callback(sampled);
        }
        Some(sampled)
    }

    // ============ Overlay ============

    /// Show the whole overlay. Idempotent.
    pub fn show(&mut self) {
        if !self.visible {
            self.visible = true;
            self.renderer.set_overlay_visible(true);
        }
    }

    /// Hide the whole overlay, keeping all state. Idempotent.
    pub fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.renderer.set_overlay_visible(false);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Copy the surface bounds to the overlay and re-lay everything out
    pub fn on_resize(&mut self) {
        self.bounds = self.surface.bounds();
        self.renderer.set_overlay_bounds(self.bounds);
        self.refresh();
    }

    /// Resize only if the surface moved or changed size
    pub fn check_resize(&mut self) -> bool {
        if self.surface.bounds() == self.bounds {
            return false;
        }
        self.on_resize();
        true
    }

    pub fn pointer_down(&mut self) {
        self.pointer_pressed = true;
        self.schedule_selection_check();
    }

    /// Only tracks while the pointer is pressed
    pub fn pointer_move(&mut self) {
        if !self.pointer_pressed {
            return;
        }
        self.check_resize();
        self.schedule_selection_check();
    }

    pub fn pointer_up(&mut self) {
        self.pointer_pressed = false;
        self.check_resize();
        self.schedule_selection_check();
    }

    /// Follow the host's scroll position
    pub fn on_scroll(&mut self) {
        let scroll = self.surface.scroll_offset();
        self.offset = ScrollOffset {
            top: -scroll.top,
            left: -scroll.left,
        };
        self.renderer.set_scroll_offset(self.offset);
    }

    // ============ Timers ============

    /// Run every tooltip hide that is due. Returns how many ran.
    pub fn poll_timers(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        for state in self.collaborators.values_mut() {
            if state.poll_tooltip(&mut self.renderer, now) {
                fired += 1;
            }
        }
        fired
    }

    /// Release every collaborator and the overlay, handing back the surface
    /// and renderer
    pub fn dispose(mut self) -> (S, R) {
        for (_, mut state) in self.collaborators.drain(..) {
            state.release(&mut self.renderer);
        }
        self.renderer.dispose();
        log::debug!("overlay disposed");
        (self.surface, self.renderer)
    }
}
