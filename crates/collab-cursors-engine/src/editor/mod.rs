/*!
 * # Collaborative Editor
 *
 * Glue between a host text surface, its change detector and the
 * [`SelectionManager`].
 *
 * Two kinds of edits arrive here:
 *
 * - **Local** edits, reported by the change detector through
 *   [`CollaborativeEditor::on_local_insert`] / [`CollaborativeEditor::on_local_delete`].
 *   The surface already shows them; the shadow buffer and every
 *   collaborator are brought up to date and the `on_insert` / `on_delete`
 *   callbacks fire so the edit can be sent to peers.
 * - **Remote** edits, applied with [`CollaborativeEditor::insert_text`] /
 *   [`CollaborativeEditor::delete_text`]. These are written to the surface,
 *   and the local user's own selection is rebased so their caret survives
 *   an edit they did not make.
 *
 * Either way exactly one edit is applied and rebased across every tracked
 * selection before the call returns.
 */

pub mod buffer;

pub use buffer::TextBuffer;

use crate::collaborator::{Clock, CollaboratorHandle, CollaboratorId, Color};
use crate::error::{CollaboratorError, ConfigurationError};
use crate::manager::{OverlayOptions, SelectionCallback, SelectionManager};
use crate::render::Renderer;
use crate::selection::SelectionRange;
use crate::surface::{HostEdit, TextSurface};

pub type InsertCallback = Box<dyn FnMut(usize, &str)>;
pub type DeleteCallback = Box<dyn FnMut(usize, usize)>;

pub struct CollaborativeEditor<S: TextSurface, R: Renderer> {
    manager: SelectionManager<S, R>,
    buffer: TextBuffer,
    on_insert: Option<InsertCallback>,
    on_delete: Option<DeleteCallback>,
}

impl<S: TextSurface, R: Renderer> CollaborativeEditor<S, R> {
    pub fn builder() -> EditorBuilder<S, R> {
        EditorBuilder::default()
    }

    /// Current shadow text
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn manager(&self) -> &SelectionManager<S, R> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut SelectionManager<S, R> {
        &mut self.manager
    }

    pub fn surface(&self) -> &S {
        self.manager.surface()
    }

    pub fn renderer(&self) -> &R {
        self.manager.renderer()
    }

    pub fn get_selection(&self) -> SelectionRange {
        self.manager.get_selection()
    }

    // ============ Remote edits ============

    /// Insert `text` at `index` on behalf of a peer
    pub fn insert_text(&mut self, index: usize, text: &str) {
        let local = self
            .manager
            .get_selection()
            .transform_on_insert(index, text.chars().count());
        self.buffer.insert(index, text);
        self.write_surface(local);
        self.manager.update_selections_on_insert(index, text);
    }

    /// Delete `length` characters at `index` on behalf of a peer
    pub fn delete_text(&mut self, index: usize, length: usize) {
        let local = self
            .manager
            .get_selection()
            .transform_on_delete(index, length);
        self.buffer.delete(index, length);
        self.write_surface(local);
        self.manager.update_selections_on_delete(index, length);
    }

    /// Replace the whole text. The local selection collapses to the start;
    /// collaborator selections are left as they are.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set(text);
        self.write_surface(SelectionRange::collapsed(0));
    }

    fn write_surface(&mut self, local: SelectionRange) {
        let text = self.buffer.to_string();
        let normalized = local.normalize();
        let surface = self.manager.surface_mut();
        surface.set_value(&text);
        surface.focus();
        surface.set_selection(normalized.start, normalized.end);
        self.manager.set_local_selection(local);
    }

    // ============ Local edits ============

    /// The change detector saw `text` inserted at `index`
    pub fn on_local_insert(&mut self, index: usize, text: &str) {
        self.buffer.insert(index, text);
        self.manager.update_selections_on_insert(index, text);
        if let Some(callback) = self.on_insert.as_mut() {
            callback(index, text);
        }
    }

    /// The change detector saw `length` characters deleted at `index`
    pub fn on_local_delete(&mut self, index: usize, length: usize) {
        self.buffer.delete(index, length);
        self.manager.update_selections_on_delete(index, length);
        if let Some(callback) = self.on_delete.as_mut() {
            callback(index, length);
        }
    }

    pub fn apply_host_edit(&mut self, edit: &HostEdit) {
        match edit {
            HostEdit::Insert { index, text } => self.on_local_insert(*index, text),
            HostEdit::Delete { index, length } => self.on_local_delete(*index, *length),
        }
    }

    // ============ Collaborators ============

    pub fn add_collaborator(
        &mut self,
        id: impl Into<CollaboratorId>,
        label: impl Into<String>,
        color: Color,
        selection: Option<SelectionRange>,
    ) -> Result<CollaboratorHandle<'_>, CollaboratorError> {
        self.manager.add_collaborator(id, label, color, selection)
    }

    pub fn collaborator(
        &mut self,
        id: &CollaboratorId,
    ) -> Result<CollaboratorHandle<'_>, CollaboratorError> {
        self.manager.collaborator(id)
    }

    pub fn remove_collaborator(&mut self, id: &CollaboratorId) -> Result<(), CollaboratorError> {
        self.manager.remove_collaborator(id)
    }

    // ============ Scheduling ============

    /// Run work deferred by the last batch of input events
    pub fn run_deferred(&mut self) -> bool {
        self.manager.run_deferred()
    }

    /// Fire due timers
    pub fn tick(&mut self) -> usize {
        self.manager.poll_timers()
    }

    pub fn dispose(self) -> (S, R) {
        self.manager.dispose()
    }
}

/// Builder for [`CollaborativeEditor`]. Surface and renderer are required.
pub struct EditorBuilder<S, R> {
    surface: Option<S>,
    renderer: Option<R>,
    options: OverlayOptions,
    clock: Option<Box<dyn Clock>>,
    on_insert: Option<InsertCallback>,
    on_delete: Option<DeleteCallback>,
    on_selection_changed: Option<SelectionCallback>,
}

impl<S, R> Default for EditorBuilder<S, R> {
    fn default() -> Self {
        Self {
            surface: None,
            renderer: None,
            options: OverlayOptions::default(),
            clock: None,
            on_insert: None,
            on_delete: None,
            on_selection_changed: None,
        }
    }
}

impl<S: TextSurface, R: Renderer> EditorBuilder<S, R> {
    pub fn surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn renderer(mut self, renderer: R) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn options(mut self, options: OverlayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn on_insert(mut self, callback: impl FnMut(usize, &str) + 'static) -> Self {
        self.on_insert = Some(Box::new(callback));
        self
    }

    pub fn on_delete(mut self, callback: impl FnMut(usize, usize) + 'static) -> Self {
        self.on_delete = Some(Box::new(callback));
        self
    }

    pub fn on_selection_changed(mut self, callback: impl FnMut(SelectionRange) + 'static) -> Self {
        self.on_selection_changed = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<CollaborativeEditor<S, R>, ConfigurationError> {
        let surface = self
            .surface
            .ok_or(ConfigurationError::MissingField("surface"))?;
        let renderer = self
            .renderer
            .ok_or(ConfigurationError::MissingField("renderer"))?;

        let buffer = TextBuffer::new(surface.value());
        let mut manager = SelectionManager::with_options(surface, renderer, self.options)?;
        if let Some(clock) = self.clock {
            manager.set_clock(clock);
        }
        if let Some(callback) = self.on_selection_changed {
            manager.set_selection_callback(callback);
        }

        Ok(CollaborativeEditor {
            manager,
            buffer,
            on_insert: self.on_insert,
            on_delete: self.on_delete,
        })
    }
}
