//! Scripted remote collaborators.
//!
//! Each peer walks through the text on a fixed script: it moves its caret,
//! drags out a selection, types a word and deletes it again. Edits go
//! through the editor as remote edits, so the local caret and every other
//! peer are rebased exactly as they would be for a real collaborator.

use std::time::{Duration, Instant};

use anyhow::Result;
use collab_cursors_engine::{
    CollaborativeEditor, CollaboratorId, Renderer, SelectionRange, TextSurface,
};

const WORDS: [&str; 6] = [
    "quietly ", "maybe ", "indeed ", "again ", "soon ", "still ",
];

/// What a peer does on one step of its script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(usize),
    Extend(usize),
    Type(&'static str),
    Erase(usize),
}

/// The script for `peer` at `step`
pub fn action(peer: usize, step: u64) -> Action {
    let word = WORDS[(peer + step as usize / 8) % WORDS.len()];
    match step % 8 {
        0..=3 => Action::Move(peer + 1 + (step % 3) as usize),
        4 | 5 => Action::Extend(3),
        6 => Action::Type(word),
        _ => Action::Erase(word.chars().count()),
    }
}

pub struct Peer {
    id: CollaboratorId,
    /// Last word this peer typed, erased on the next erase step
    typed: Option<usize>,
}

pub struct Peers {
    peers: Vec<Peer>,
    step: u64,
    interval: Duration,
    last_step: Instant,
    tooltip_seconds: f64,
    paused: bool,
}

impl Peers {
    pub fn new(ids: Vec<CollaboratorId>, interval: Duration, tooltip_seconds: f64) -> Self {
        Self {
            peers: ids
                .into_iter()
                .map(|id| Peer { id, typed: None })
                .collect(),
            step: 0,
            interval,
            last_step: Instant::now(),
            tooltip_seconds,
            paused: false,
        }
    }

    pub fn toggle_paused(&mut self) {
        self.paused = !self.paused;
        log::info!("peers {}", if self.paused { "paused" } else { "resumed" });
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance every peer if its step is due
    pub fn tick<S: TextSurface, R: Renderer>(
        &mut self,
        editor: &mut CollaborativeEditor<S, R>,
        now: Instant,
    ) -> Result<()> {
        if self.paused || now.duration_since(self.last_step) < self.interval {
            return Ok(());
        }
        self.last_step = now;

        for (index, peer) in self.peers.iter_mut().enumerate() {
            peer.step(editor, action(index, self.step), self.tooltip_seconds)?;
        }
        self.step += 1;
        Ok(())
    }
}

impl Peer {
    fn step<S: TextSurface, R: Renderer>(
        &mut self,
        editor: &mut CollaborativeEditor<S, R>,
        action: Action,
        tooltip_seconds: f64,
    ) -> Result<()> {
        let len = editor.text().chars().count();
        let current = editor
            .collaborator(&self.id)?
            .selection()
            .unwrap_or(SelectionRange::collapsed(0));
        let caret = current.target.min(len);

        let next = match action {
            Action::Move(by) => {
                let at = if caret + by > len { 0 } else { caret + by };
                SelectionRange::collapsed(at)
            }
            Action::Extend(by) => {
                SelectionRange::new(current.anchor.min(len), (caret + by).min(len))
            }
            Action::Type(word) => {
                editor.insert_text(caret, word);
                self.typed = Some(word.chars().count());
                // Inserting at our own caret already pushed it past the word
                return Ok(());
            }
            Action::Erase(_) => {
                if let Some(typed) = self.typed.take()
                    && caret >= typed
                {
                    editor.delete_text(caret - typed, typed);
                }
                return Ok(());
            }
        };

        let mut handle = editor.collaborator(&self.id)?;
        handle.set_selection(Some(next));
        handle.flash_cursor_tooltip(tooltip_seconds);
        Ok(())
    }
}
