//! End-to-end editing scenarios driven through the public API with a
//! monospace surface, the recording renderer and a manual clock.

use collab_cursors_engine::{
    CollaborativeEditor, CollaboratorId, Color, ManualClock, MonospaceSurface, RecordingRenderer,
    SelectionRange,
};
use pretty_assertions::assert_eq;

type Editor = CollaborativeEditor<MonospaceSurface, RecordingRenderer>;

fn editor_with_clock(text: &str, clock: &ManualClock) -> Editor {
    CollaborativeEditor::builder()
        .surface(MonospaceSurface::new(text, 40))
        .renderer(RecordingRenderer::new())
        .clock(clock.clone())
        .build()
        .unwrap()
}

fn editor(text: &str) -> Editor {
    editor_with_clock(text, &ManualClock::new())
}

fn selected_text(text: &str, range: SelectionRange) -> String {
    let normalized = range.normalize();
    text.chars()
        .skip(normalized.start)
        .take(normalized.len())
        .collect()
}

fn selection_of(editor: &mut Editor, id: &str) -> Option<SelectionRange> {
    editor
        .collaborator(&CollaboratorId::from(id))
        .unwrap()
        .selection()
}

// ============ Index transforms through the editor ============

#[test]
fn test_local_insert_before_selection_keeps_selected_text() {
    let mut editor = editor("hello world");
    editor
        .add_collaborator("alice", "Alice", Color::rgb(255, 0, 0), Some(SelectionRange::new(0, 5)))
        .unwrap();

    editor.on_local_insert(0, "X ");

    let selection = selection_of(&mut editor, "alice").unwrap();
    assert_eq!(selection, SelectionRange::new(2, 7));
    assert_eq!(selected_text(&editor.text(), selection), "hello");
}

#[test]
fn test_local_delete_before_selection_shifts_it_back() {
    let mut editor = editor("hello world");
    editor
        .add_collaborator("alice", "Alice", Color::rgb(255, 0, 0), Some(SelectionRange::new(6, 11)))
        .unwrap();

    editor.on_local_delete(0, 6);

    let selection = selection_of(&mut editor, "alice").unwrap();
    assert_eq!(selection, SelectionRange::new(0, 5));
    assert_eq!(selected_text(&editor.text(), selection), "world");
}

#[test]
fn test_delete_between_two_selections() {
    let mut editor = editor("0123456789");
    editor
        .add_collaborator("one", "One", Color::rgb(255, 0, 0), Some(SelectionRange::new(0, 3)))
        .unwrap();
    editor
        .add_collaborator("two", "Two", Color::rgb(0, 0, 255), Some(SelectionRange::new(5, 8)))
        .unwrap();

    editor.on_local_delete(4, 2);

    assert_eq!(editor.text(), "01236789");
    assert_eq!(
        selection_of(&mut editor, "one"),
        Some(SelectionRange::new(0, 3))
    );
    // 5 was inside the deleted span and collapses onto the delete point
    assert_eq!(
        selection_of(&mut editor, "two"),
        Some(SelectionRange::new(4, 6))
    );
}

#[test]
fn test_remote_insert_moves_both_collaborators_and_local_caret() {
    let mut editor = editor("hello world");
    editor
        .add_collaborator("alice", "Alice", Color::rgb(255, 0, 0), Some(SelectionRange::new(8, 3)))
        .unwrap();

    editor.insert_text(0, ">> ");

    assert_eq!(editor.text(), ">> hello world");
    assert_eq!(
        selection_of(&mut editor, "alice"),
        Some(SelectionRange::new(11, 6))
    );
    assert_eq!(editor.get_selection(), SelectionRange::collapsed(3));
}

#[test]
fn test_edit_after_selection_leaves_it_alone() {
    let mut editor = editor("hello world");
    editor
        .add_collaborator("alice", "Alice", Color::rgb(255, 0, 0), Some(SelectionRange::new(0, 5)))
        .unwrap();

    editor.on_local_insert(6, "big ");
    editor.on_local_delete(5, 3);

    assert_eq!(
        selection_of(&mut editor, "alice"),
        Some(SelectionRange::new(0, 5))
    );
}

// ============ Tooltip timing ============

#[test]
fn test_second_flash_restarts_the_hide_timer() {
    let clock = ManualClock::new();
    let mut editor = editor_with_clock("hello world", &clock);
    let alice = CollaboratorId::from("alice");
    editor
        .add_collaborator(
            alice.clone(),
            "Alice",
            Color::rgb(255, 0, 0),
            Some(SelectionRange::collapsed(2)),
        )
        .unwrap()
        .flash_cursor_tooltip(2.0);

    clock.advance_secs(1.0);
    editor
        .collaborator(&alice)
        .unwrap()
        .flash_cursor_tooltip(2.0);

    clock.advance_secs(0.5);
    editor.tick();
    assert!(editor.renderer().tooltip_visible(&alice));

    clock.advance_secs(0.5);
    editor.tick();
    assert!(editor.renderer().tooltip_visible(&alice), "hidden at t=2s");

    clock.advance_secs(1.0);
    editor.tick();
    assert!(!editor.renderer().tooltip_visible(&alice));
    assert!(!editor.collaborator(&alice).unwrap().is_tooltip_visible());
}

#[test]
fn test_local_edit_keeps_flashed_tooltip_up() {
    let clock = ManualClock::new();
    let mut editor = editor_with_clock("hello world", &clock);
    let alice = CollaboratorId::from("alice");
    editor
        .add_collaborator(
            alice.clone(),
            "Alice",
            Color::rgb(255, 0, 0),
            Some(SelectionRange::collapsed(2)),
        )
        .unwrap()
        .flash_cursor_tooltip(2.0);

    clock.advance_secs(0.5);
    editor.on_local_insert(11, "!");

    clock.advance_secs(0.5);
    editor.tick();
    assert!(editor.renderer().tooltip_visible(&alice), "hidden at t=1s");

    clock.advance_secs(1.0);
    assert_eq!(editor.tick(), 1);
    assert!(!editor.renderer().tooltip_visible(&alice));
}

#[test]
fn test_remote_edit_moving_the_caret_keeps_pending_hide() {
    let clock = ManualClock::new();
    let mut editor = editor_with_clock("hello world", &clock);
    let alice = CollaboratorId::from("alice");
    editor
        .add_collaborator(
            alice.clone(),
            "Alice",
            Color::rgb(255, 0, 0),
            Some(SelectionRange::new(2, 7)),
        )
        .unwrap()
        .flash_cursor_tooltip(2.0);

    clock.advance_secs(1.0);
    editor.insert_text(0, ">> ");
    assert_eq!(selection_of(&mut editor, "alice"), Some(SelectionRange::new(5, 10)));
    assert!(editor.renderer().tooltip_visible(&alice));

    // A delete covering the whole range collapses it; the hide still fires
    editor.delete_text(3, 8);
    assert_eq!(selection_of(&mut editor, "alice"), Some(SelectionRange::collapsed(3)));
    assert!(editor.renderer().tooltip_visible(&alice));

    clock.advance_secs(1.0);
    assert_eq!(editor.tick(), 1);
    assert!(!editor.renderer().tooltip_visible(&alice));
}

#[test]
fn test_removing_collaborator_cancels_pending_hide() {
    let clock = ManualClock::new();
    let mut editor = editor_with_clock("hello", &clock);
    let alice = CollaboratorId::from("alice");
    editor
        .add_collaborator(alice.clone(), "Alice", Color::rgb(255, 0, 0), Some(SelectionRange::collapsed(1)))
        .unwrap()
        .flash_cursor_tooltip(1.0);

    editor.remove_collaborator(&alice).unwrap();
    clock.advance_secs(2.0);

    assert_eq!(editor.tick(), 0);
}

// ============ Teardown ============

#[test]
fn test_dispose_hands_back_surface_and_clean_renderer() {
    let mut editor = editor("hello\nworld");
    editor
        .add_collaborator("alice", "Alice", Color::rgb(255, 0, 0), Some(SelectionRange::new(2, 9)))
        .unwrap();
    assert_eq!(editor.renderer().row_count(), 2);

    let (surface, renderer) = editor.dispose();

    assert_eq!(surface.char_len(), 11);
    assert_eq!(renderer.row_count(), 0);
    assert!(renderer.is_disposed());
}
