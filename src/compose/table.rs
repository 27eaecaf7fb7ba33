//! Table builder.
//!
//! Builds a [`TableShape`] from a `tabular` node. The grid is sized from the
//! column specification and the number of row separators, then filled cell by
//! cell in document order. Cell content runs through the [`InlineWalker`] and
//! shares the walk's pause tracker, so a pause inside a cell interrupts the
//! table: rows after the interrupted one are deleted from the grid.

use crate::error::{CompositeError, CompositeResult};
use crate::format::TextFormat;
use crate::node::{Node, NodeKind};
use crate::shape::metrics::CELL_PADDING;
use crate::shape::{CLine, Column, Merge, Rect, Shape, ShapeKind, TableShape};

use super::context::{Deferred, Flow, Mode, WalkContext};
use super::inline::InlineWalker;
use super::pause::PauseTracker;
use super::tabular::TabularSpec;

/// Block built by a nested builder.
#[derive(Debug)]
pub struct BlockOutcome<'n> {
    /// Shape at the origin, `None` when omitted or empty
    pub shape: Option<Shape>,
    pub flow: Flow,
    pub deferred: Vec<Deferred<'n>>,
}

/// Where a grid walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RowCursor {
    pub row: usize,
    /// Text was emitted in `row`
    pub has_content: bool,
}

/// Build the shape of a `tabular` node.
pub fn build_table<'n>(
    ctx: &WalkContext<'_>,
    tracker: &mut PauseTracker,
    format: &TextFormat,
    node: &'n Node,
    mode: Mode,
) -> CompositeResult<BlockOutcome<'n>> {
    let mode = mode.gate(node, tracker);
    let spec = TabularSpec::parse(&node.params)?;
    if spec.columns.is_empty() {
        return Err(CompositeError::structural(format!(
            "table specification {:?} has no columns",
            node.params.as_str()
        )));
    }

    // a trailing `\\` counts as one more (empty) row
    let rows = node.children.iter().filter(|c| c.is(&NodeKind::TableRow)).count() + 1;
    let columns = column_widths(ctx, &spec);
    let last_col = columns.len() - 1;
    let mut table = TableShape::new(columns, rows, format.current().font_size);
    table.vertical_borders = spec.borders;

    let mut walker = InlineWalker::new(tracker, format.clone(), ctx.policy);
    let mut cursor = RowCursor { row: 0, has_content: false };
    let mut col = 0usize;
    let mut flow = Flow::Completed;

    for child in &node.children {
        match &child.kind {
            NodeKind::TableColumn => {
                col += 1;
                continue;
            }
            NodeKind::TableRow => {
                cursor = RowCursor { row: cursor.row + 1, has_content: false };
                col = 0;
                continue;
            }
            NodeKind::HLine => {
                table.hlines.insert(cursor.row);
                continue;
            }
            NodeKind::CLine => {
                if let Some(line) = parse_cline(child, cursor.row, last_col) {
                    table.clines.push(line);
                }
                continue;
            }
            _ => {}
        }

        if col > last_col {
            log::debug!("cell beyond column {last_col} in row {}, merged into the last one", cursor.row);
        }
        let at = col.min(last_col);

        if child.is(&NodeKind::MultiColumn) {
            let span = parse_span(child).clamp(1, last_col - at + 1);
            let (column, borders) = TabularSpec::parse_cell(&child.params)?;
            if let Some(cell) = table.cell_mut(cursor.row, at) {
                cell.align = Some(column.align);
                cell.borders = borders;
            }
            if span > 1 {
                table.merges.push(Merge { row: cursor.row, col: at, span });
            }
            col += span - 1;
        }

        let Some(cell) = table.cell_mut(cursor.row, at) else {
            continue;
        };
        let result = walker.walk(&mut cell.body, std::slice::from_ref(child), mode);
        cursor.has_content |= walker.take_emitted();
        if result == Flow::Paused {
            flow = Flow::Paused;
            break;
        }
    }

    let deferred = walker.into_deferred();
    table.fit_columns();
    let paused_at = (flow == Flow::Paused).then_some(cursor);
    Ok(BlockOutcome {
        shape: into_shape(table, paused_at, mode),
        flow,
        deferred,
    })
}

/// Truncate a grid interrupted at `paused_at` and wrap it in a shape.
///
/// The interrupted row stays when it already shows something.
pub(super) fn into_shape(mut table: TableShape, paused_at: Option<RowCursor>, mode: Mode) -> Option<Shape> {
    if let Some(cursor) = paused_at {
        let keep = cursor.row + usize::from(cursor.has_content);
        table.delete_trailing_rows(keep);
    }
    if !mode.emits() || table.row_count() == 0 {
        return None;
    }

    let bounds = Rect::new(0.0, 0.0, table.width(), table.height());
    Some(Shape::new(bounds, ShapeKind::Table(table)).with_hidden(mode.is_hidden()))
}

/// Fixed columns take their width plus padding, the others share the rest
/// of the content width.
fn column_widths(ctx: &WalkContext<'_>, spec: &TabularSpec) -> Vec<Column> {
    let fixed: Vec<Option<f32>> = spec
        .columns
        .iter()
        .map(|c| c.width.map(|w| w.to_points(&ctx.lengths) + 2.0 * CELL_PADDING))
        .collect();
    let used: f32 = fixed.iter().flatten().sum();
    let free = fixed.iter().filter(|w| w.is_none()).count();
    let share = if free > 0 {
        ((ctx.area.width - used) / free as f32).max(2.0 * CELL_PADDING)
    } else {
        0.0
    };

    spec.columns
        .iter()
        .zip(fixed)
        .map(|(c, width)| Column {
            align: c.align,
            width: width.unwrap_or(share),
            fixed: width.is_some(),
        })
        .collect()
}

/// Span of a `multicolumn` node, 1 when missing or malformed.
fn parse_span(node: &Node) -> usize {
    let span = node.payload.as_ref().and_then(|p| {
        p.as_number()
            .or_else(|| p.as_text().and_then(|t| t.trim().parse().ok()))
    });
    match span {
        Some(n) if n >= 1.0 && n.fract() == 0.0 => n as usize,
        _ => {
            log::debug!("malformed multicolumn span {:?}, using 1", node.payload);
            1
        }
    }
}

/// `\cline{a-b}` with 1-based inclusive columns.
fn parse_cline(node: &Node, row: usize, last_col: usize) -> Option<CLine> {
    let spec = node.content().unwrap_or_default();
    let parsed = spec.split_once('-').and_then(|(a, b)| {
        let from: usize = a.trim().parse().ok()?;
        let to: usize = b.trim().parse().ok()?;
        (from >= 1 && from <= to).then_some((from - 1, (to - 1).min(last_col)))
    });
    match parsed {
        Some((from, to)) if from <= last_col => Some(CLine { row, from, to }),
        _ => {
            log::debug!("ignoring malformed cline {spec:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::pause::PassState;
    use crate::node::Payload;
    use crate::resource::MemoryImageResolver;
    use crate::settings::Settings;
    use crate::shape::Align;

    fn sep() -> Node {
        Node::new(NodeKind::TableColumn)
    }

    fn row() -> Node {
        Node::new(NodeKind::TableRow)
    }

    /// R1..R5 rows of two cells, with a pause at the start of R3 or after
    /// its first cell.
    fn five_rows(pause_after_content: bool) -> Node {
        let mut table = Node::new(NodeKind::Tabular).with_params("|l|l|");
        for r in 1..=5 {
            if r == 3 && !pause_after_content {
                table.push(Node::new(NodeKind::Pause));
            }
            table.push(Node::text(format!("R{r}a")));
            if r == 3 && pause_after_content {
                table.push(Node::new(NodeKind::Pause));
            }
            table.push(sep());
            table.push(Node::text(format!("R{r}b")));
            if r < 5 {
                table.push(row());
            }
        }
        table
    }

    fn build(node: &Node, state: PassState) -> CompositeResult<(BlockOutcome<'_>, usize)> {
        let settings = Settings::default();
        let resolver = MemoryImageResolver::new();
        let ctx = WalkContext::new(&settings, &resolver, Rect::new(0.0, 0.0, 600.0, 400.0));
        let mut tracker = PauseTracker::new(state);
        let format = TextFormat::new(settings.font_size());
        let outcome = build_table(&ctx, &mut tracker, &format, node, Mode::Visible)?;
        Ok((outcome, tracker.max_pass()))
    }

    fn table<'a>(outcome: &'a BlockOutcome<'_>) -> &'a TableShape {
        outcome.shape.as_ref().and_then(|s| s.kind.as_table()).unwrap()
    }

    #[test]
    fn test_pause_before_row_content_truncates_row() {
        let node = five_rows(false);
        let (outcome, max) = build(&node, PassState::FIRST).unwrap();
        assert_eq!(outcome.flow, Flow::Paused);
        assert_eq!(max, 2);
        let grid = table(&outcome);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.declared_rows, 5);
    }

    #[test]
    fn test_pause_after_row_content_keeps_row() {
        let node = five_rows(true);
        let (outcome, _) = build(&node, PassState::FIRST).unwrap();
        let grid = table(&outcome);
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.cell(2, 0).unwrap().body.plain_text(), "R3a");
        assert!(grid.cell(2, 1).unwrap().body.is_blank());

        let (outcome, _) = build(&node, PassState { pass: 2, pause_counter: 1 }).unwrap();
        assert_eq!(outcome.flow, Flow::Completed);
        assert_eq!(table(&outcome).row_count(), 5);
    }

    #[test]
    fn test_whitespace_before_pause_is_not_content() {
        let node = Node::new(NodeKind::Tabular)
            .with_params("l")
            .child(Node::text("R1"))
            .child(row())
            .child(Node::text("\n  "))
            .child(Node::new(NodeKind::Pause))
            .child(Node::text("R2"));
        let (outcome, max) = build(&node, PassState::FIRST).unwrap();
        assert_eq!(outcome.flow, Flow::Paused);
        assert_eq!(max, 2);
        let grid = table(&outcome);
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.cell(0, 0).unwrap().body.plain_text(), "R1");

        let (outcome, _) = build(&node, PassState { pass: 2, pause_counter: 1 }).unwrap();
        assert_eq!(table(&outcome).row_count(), 2);
    }

    #[test]
    fn test_grid_borders_and_lines() {
        let node = Node::new(NodeKind::Tabular)
            .with_params("|c|p{2cm}")
            .child(Node::new(NodeKind::HLine))
            .child(Node::text("a"))
            .child(sep())
            .child(Node::text("b"))
            .child(row())
            .child(Node::new(NodeKind::CLine).with_content("1-2"))
            .child(Node::text("c"))
            .child(row());
        let (outcome, _) = build(&node, PassState::FIRST).unwrap();
        let grid = table(&outcome);

        // trailing separator adds an empty row
        assert_eq!(grid.row_count(), 3);
        assert!(grid.hlines.contains(&0));
        assert_eq!(grid.clines, vec![CLine { row: 1, from: 0, to: 1 }]);
        assert!(grid.vertical_borders.contains(&0) && grid.vertical_borders.contains(&1));
        assert!(grid.columns[1].fixed);
        // auto-fit: "a" / "c" at 22pt (11pt doubled) plus padding
        assert!((grid.columns[0].width - (11.0 + 2.0 * CELL_PADDING)).abs() < 1e-3);
        assert_eq!(grid.columns[0].align, Align::Center);
    }

    #[test]
    fn test_multicolumn_merges_and_overrides() {
        let node = Node::new(NodeKind::Tabular)
            .with_params("lll")
            .child(
                Node::new(NodeKind::MultiColumn)
                    .with_params("|c|")
                    .with_payload(Payload::Number(2.0))
                    .child(Node::text("wide")),
            )
            .child(sep())
            .child(Node::text("z"));
        let (outcome, _) = build(&node, PassState::FIRST).unwrap();
        let grid = table(&outcome);

        assert_eq!(grid.merges, vec![Merge { row: 0, col: 0, span: 2 }]);
        let cell = grid.cell(0, 0).unwrap();
        assert_eq!(cell.align, Some(Align::Center));
        assert_eq!(cell.borders.left, Some(true));
        assert_eq!(grid.cell(0, 2).unwrap().body.plain_text(), "z");
    }

    #[test]
    fn test_malformed_span_defaults_to_one() {
        let node = Node::new(NodeKind::Tabular).with_params("ll").child(
            Node::new(NodeKind::MultiColumn)
                .with_params("c")
                .with_content("x")
                .child(Node::text("a")),
        );
        let (outcome, _) = build(&node, PassState::FIRST).unwrap();
        assert!(table(&outcome).merges.is_empty());
    }

    #[test]
    fn test_structural_errors() {
        let bad = Node::new(NodeKind::Tabular).with_params("*{2}{*{2}{c}}");
        assert!(matches!(build(&bad, PassState::FIRST), Err(CompositeError::Structural(_))));

        let empty = Node::new(NodeKind::Tabular).with_params("|");
        assert!(matches!(build(&empty, PassState::FIRST), Err(CompositeError::Structural(_))));

        let bad_cell = Node::new(NodeKind::Tabular)
            .with_params("l")
            .child(Node::new(NodeKind::MultiColumn).with_params("p{oops}"));
        assert!(build(&bad_cell, PassState::FIRST).is_err());
    }

    #[test]
    fn test_gated_table_is_hidden_or_omitted() {
        let node = Node::new(NodeKind::Tabular)
            .with_params("l")
            .with_overlay("2-")
            .child(Node::text("a"));
        let (outcome, max) = build(&node, PassState::FIRST).unwrap();
        assert_eq!(max, 2);
        let shape = outcome.shape.unwrap();
        assert!(shape.hidden);
        assert!(shape.kind.as_table().unwrap().rows[0][0].body.is_hidden());

        let only = Node::new(NodeKind::Only)
            .with_overlay("2")
            .child(Node::new(NodeKind::Tabular).with_params("l"));
        let settings = Settings::default();
        let resolver = MemoryImageResolver::new();
        let ctx = WalkContext::new(&settings, &resolver, Rect::new(0.0, 0.0, 600.0, 400.0));
        let mut tracker = PauseTracker::new(PassState::FIRST);
        let format = TextFormat::new(22.0);
        let mode = Mode::Visible.gate(&only, &mut tracker);
        let outcome = build_table(&ctx, &mut tracker, &format, &only.children[0], mode).unwrap();
        assert!(outcome.shape.is_none());
    }
}
