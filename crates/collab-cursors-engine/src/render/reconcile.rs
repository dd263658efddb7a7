//! Row reconciliation.
//!
//! A collaborator dragging one end of a selection is the common case, so the
//! row list usually grows or shrinks at exactly one end. Comparing the first
//! rows tells which: if the first row is unchanged the change happened at
//! the tail, otherwise at the head. Rows are created or removed only at that
//! end, and the remaining aligned pairs get field-level patches.

use super::{Element, RowHandle, RowPatch, Renderer};
use crate::collaborator::{CollaboratorId, Color};
use crate::geometry::Row;

/// A row currently on screen, bound to the element that draws it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedRow {
    pub row: Row,
    pub handle: RowHandle,
}

/// How newly created rows should look
#[derive(Debug, Clone, Copy)]
pub struct RowStyle<'a> {
    pub color: &'a Color,
    pub visible: bool,
}

/// Element churn caused by one reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    pub created: usize,
    pub removed: usize,
    pub updated: usize,
}

/// Bring `rendered` in line with `next`, touching as few elements as possible.
///
/// Never creates or removes more than `|next.len() - rendered.len()|`
/// elements, and every row whose geometry is unchanged keeps its handle.
pub fn reconcile_rows<R>(
    renderer: &mut R,
    owner: &CollaboratorId,
    style: RowStyle<'_>,
    rendered: &mut Vec<RenderedRow>,
    next: &[Row],
) -> ReconcileStats
where
    R: Renderer + ?Sized,
{
    let mut stats = ReconcileStats::default();

    let Some(next_first) = next.first() else {
        stats.removed = rendered.len();
        for row in rendered.drain(..) {
            renderer.remove_row(row.handle);
        }
        return stats;
    };

    let create = |renderer: &mut R, row: &Row| {
        let handle = renderer.create_row(owner, row, style.color);
        if !style.visible {
            renderer.set_visible(&Element::Row(handle), false);
        }
        RenderedRow { row: *row, handle }
    };

    let first_unchanged = rendered
        .first()
        .is_none_or(|first| first.row == *next_first);

    if next.len() > rendered.len() {
        let count = next.len() - rendered.len();
        if first_unchanged {
            // Grew at the tail
            let existing = rendered.len();
            for row in &next[existing..] {
                let created = create(renderer, row);
                rendered.push(created);
            }
        } else {
            // Grew at the head
            let created: Vec<_> = next[..count]
                .iter()
                .map(|row| create(renderer, row))
                .collect();
            rendered.splice(0..0, created);
        }
        stats.created = count;
    } else if next.len() < rendered.len() {
        let count = rendered.len() - next.len();
        let removed: Vec<_> = if first_unchanged {
            let keep = rendered.len() - count;
            rendered.drain(keep..).collect()
        } else {
            rendered.drain(..count).collect()
        };
        for row in removed {
            renderer.remove_row(row.handle);
        }
        stats.removed = count;
    }

    for (current, row) in rendered.iter_mut().zip(next) {
        if let Some(patch) = RowPatch::between(&current.row, row) {
            renderer.update_row(current.handle, &patch);
            current.row = *row;
            stats.updated += 1;
        }
    }

    log::trace!(
        "reconciled rows for {owner}: +{} -{} ~{}",
        stats.created,
        stats.removed,
        stats.updated
    );

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingRenderer, RenderOp};
    use pretty_assertions::assert_eq;

    fn row(top: f32, left: f32, width: f32) -> Row {
        Row {
            top,
            left,
            width,
            height: 1.0,
        }
    }

    fn owner() -> CollaboratorId {
        CollaboratorId::from("alice")
    }

    fn style(color: &Color) -> RowStyle<'_> {
        RowStyle {
            color,
            visible: true,
        }
    }

    fn handles(rendered: &[RenderedRow]) -> Vec<RowHandle> {
        rendered.iter().map(|r| r.handle).collect()
    }

    fn setup(rows: &[Row]) -> (RecordingRenderer, Vec<RenderedRow>, Color) {
        let mut renderer = RecordingRenderer::new();
        let color = Color::rgb(255, 0, 0);
        let mut rendered = Vec::new();
        reconcile_rows(&mut renderer, &owner(), style(&color), &mut rendered, rows);
        renderer.take_ops();
        (renderer, rendered, color)
    }

    // ============ Fresh and empty ============

    #[test]
    fn test_fresh_list_creates_every_row() {
        let (renderer, rendered, _) = setup(&[row(0.0, 2.0, 8.0), row(1.0, 0.0, 3.0)]);
        assert_eq!(rendered.len(), 2);
        assert_eq!(renderer.live_rows(&owner()).len(), 2);
    }

    #[test]
    fn test_empty_next_releases_all_rows() {
        let (mut renderer, mut rendered, color) = setup(&[row(0.0, 2.0, 8.0), row(1.0, 0.0, 3.0)]);
        let stats = reconcile_rows(&mut renderer, &owner(), style(&color), &mut rendered, &[]);
        assert_eq!(stats.removed, 2);
        assert!(rendered.is_empty());
        assert!(renderer.live_rows(&owner()).is_empty());
    }

    // ============ Growth ============

    #[test]
    fn test_growth_at_tail_appends() {
        let (mut renderer, mut rendered, color) = setup(&[row(0.0, 2.0, 8.0)]);
        let before = handles(&rendered);

        let next = [row(0.0, 2.0, 8.0), row(1.0, 0.0, 4.0)];
        let stats = reconcile_rows(&mut renderer, &owner(), style(&color), &mut rendered, &next);

        assert_eq!(stats, ReconcileStats {
            created: 1,
            removed: 0,
            updated: 0
        });
        assert_eq!(rendered[0].handle, before[0]);
        assert_eq!(renderer.live_rows(&owner()), next.to_vec());
    }

    #[test]
    fn test_growth_at_head_prepends() {
        let (mut renderer, mut rendered, color) = setup(&[row(1.0, 0.0, 4.0)]);
        let before = handles(&rendered);

        let next = [row(0.0, 5.0, 5.0), row(1.0, 0.0, 4.0)];
        let stats = reconcile_rows(&mut renderer, &owner(), style(&color), &mut rendered, &next);

        assert_eq!(stats.created, 1);
        assert_eq!(stats.updated, 0);
        assert_eq!(rendered[1].handle, before[0]);
        assert_eq!(renderer.live_rows(&owner()), next.to_vec());
    }

    // ============ Shrink ============

    #[test]
    fn test_shrink_at_tail_removes_last_rows() {
        let (mut renderer, mut rendered, color) = setup(&[
            row(0.0, 2.0, 8.0),
            row(1.0, 0.0, 10.0),
            row(2.0, 0.0, 3.0),
        ]);
        let before = handles(&rendered);

        let next = [row(0.0, 2.0, 8.0)];
        let stats = reconcile_rows(&mut renderer, &owner(), style(&color), &mut rendered, &next);

        assert_eq!(stats.removed, 2);
        assert_eq!(handles(&rendered), vec![before[0]]);
        assert_eq!(
            renderer.take_ops(),
            vec![
                RenderOp::RemoveRow { handle: before[1] },
                RenderOp::RemoveRow { handle: before[2] },
            ]
        );
    }

    #[test]
    fn test_shrink_at_head_removes_first_rows() {
        let (mut renderer, mut rendered, color) = setup(&[
            row(0.0, 2.0, 8.0),
            row(1.0, 0.0, 10.0),
            row(2.0, 0.0, 3.0),
        ]);
        let before = handles(&rendered);

        let next = [row(1.0, 0.0, 10.0), row(2.0, 0.0, 3.0)];
        let stats = reconcile_rows(&mut renderer, &owner(), style(&color), &mut rendered, &next);

        assert_eq!(stats, ReconcileStats {
            created: 0,
            removed: 1,
            updated: 0
        });
        assert_eq!(handles(&rendered), before[1..].to_vec());
    }

    // ============ Field updates ============

    #[test]
    fn test_same_length_updates_only_changed_fields() {
        let (mut renderer, mut rendered, color) = setup(&[row(0.0, 2.0, 8.0), row(1.0, 0.0, 3.0)]);
        let before = handles(&rendered);

        let next = [row(0.0, 2.0, 8.0), row(1.0, 0.0, 6.0)];
        reconcile_rows(&mut renderer, &owner(), style(&color), &mut rendered, &next);

        assert_eq!(handles(&rendered), before);
        assert_eq!(
            renderer.take_ops(),
            vec![RenderOp::UpdateRow {
                handle: before[1],
                patch: RowPatch {
                    width: Some(6.0),
                    ..RowPatch::default()
                },
            }]
        );
    }

    #[test]
    fn test_hidden_style_hides_created_rows() {
        let mut renderer = RecordingRenderer::new();
        let color = Color::rgb(0, 0, 255);
        let mut rendered = Vec::new();
        reconcile_rows(
            &mut renderer,
            &owner(),
            RowStyle {
                color: &color,
                visible: false,
            },
            &mut rendered,
            &[row(0.0, 0.0, 1.0)],
        );
        assert!(!renderer.row_visible(rendered[0].handle));
    }

    #[test]
    fn test_churn_is_bounded_by_length_difference() {
        let (mut renderer, mut rendered, color) = setup(&[row(0.0, 2.0, 8.0)]);
        let next = [
            row(0.0, 1.0, 9.0),
            row(1.0, 0.0, 10.0),
            row(2.0, 0.0, 10.0),
            row(3.0, 0.0, 1.0),
        ];
        let stats = reconcile_rows(&mut renderer, &owner(), style(&color), &mut rendered, &next);
        assert_eq!(stats.created + stats.removed, 3);
    }
}
