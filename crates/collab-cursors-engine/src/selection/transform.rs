//! Rebasing of character offsets across a single insert or delete.
//!
//! Edits are applied strictly one at a time in a single total order, so
//! these two functions are the whole rebase mechanism. There is no
//! composition of outstanding edits.

/// Rebase `index` across an insert of `inserted_len` characters at `insert_at`.
///
/// An insert exactly at `index` pushes the index forward: the insert is
/// treated as happening before an equal position.
pub fn transform_index_on_insert(index: usize, insert_at: usize, inserted_len: usize) -> usize {
    if insert_at <= index {
        index + inserted_len
    } else {
        index
    }
}

/// Rebase `index` across a delete of `deleted_len` characters at `delete_at`.
///
/// Positions strictly inside the deleted span collapse to `delete_at`.
pub fn transform_index_on_delete(index: usize, delete_at: usize, deleted_len: usize) -> usize {
    if index > delete_at {
        index - (index - delete_at).min(deleted_len)
    } else {
        index
    }
}
