//! Description lists in the body.
//!
//! A `descriptionlist` at body level becomes a borderless two-column table:
//! the bold term on the left, the definition on the right, one row per item.
//! Bullet and numbered lists are plain text and go through the inline walker.

use crate::error::CompositeResult;
use crate::format::TextFormat;
use crate::node::{Node, NodeKind};
use crate::shape::{Align, Column, TableShape};

use super::context::{Flow, Mode, WalkContext};
use super::inline::InlineWalker;
use super::pause::{PauseOutcome, PauseTracker};
use super::table::{BlockOutcome, RowCursor, into_shape};

/// Share of the content width given to the term column.
pub const TERM_RATIO: f32 = 0.3;

/// Build the table of a `descriptionlist` node.
pub fn build_description<'n>(
    ctx: &WalkContext<'_>,
    tracker: &mut PauseTracker,
    format: &TextFormat,
    node: &'n Node,
    mode: Mode,
) -> CompositeResult<BlockOutcome<'n>> {
    let mode = mode.gate(node, tracker);
    let items = node.children.iter().filter(|c| c.is(&NodeKind::Item)).count();
    let term_width = ctx.area.width * TERM_RATIO;
    let columns = vec![
        Column { align: Align::Left, width: term_width, fixed: true },
        Column { align: Align::Left, width: ctx.area.width - term_width, fixed: true },
    ];
    let mut table = TableShape::new(columns, items, format.current().font_size);

    let mut walker = InlineWalker::new(tracker, format.clone(), ctx.policy);
    let mut cursor: Option<RowCursor> = None;
    let mut paused_at = None;

    for child in &node.children {
        match &child.kind {
            NodeKind::Item => {
                let row = cursor.map_or(0, |c| c.row + 1);
                let item_mode = mode.gate(child, walker.tracker());
                let mut current = RowCursor { row, has_content: false };

                if item_mode.emits()
                    && !child.params.is_empty()
                    && let Some(cell) = table.cell_mut(row, 0)
                {
                    let mut term = format.current().clone();
                    term.bold = true;
                    cell.body.append(&child.params, &term, item_mode.is_hidden());
                    current.has_content = true;
                }

                let Some(cell) = table.cell_mut(row, 1) else {
                    continue;
                };
                let result = walker.walk(&mut cell.body, &child.children, item_mode);
                current.has_content |= walker.take_emitted();
                cursor = Some(current);
                if result == Flow::Paused {
                    paused_at = cursor;
                    break;
                }
            }
            NodeKind::Pause => {
                if walker.tracker().pause() == PauseOutcome::Stop {
                    // rows started so far are complete
                    let next = cursor.map_or(0, |c| c.row + 1);
                    paused_at = Some(RowCursor { row: next, has_content: false });
                    break;
                }
            }
            _ => log::warn!("{} outside of an item in a description list", child.kind),
        }
    }

    let deferred = walker.into_deferred();
    let flow = if paused_at.is_some() { Flow::Paused } else { Flow::Completed };
    Ok(BlockOutcome {
        shape: into_shape(table, paused_at, mode),
        flow,
        deferred,
    })
}
