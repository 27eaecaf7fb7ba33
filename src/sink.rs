//! Shape sinks.
//!
//! A sink turns composited passes into an output format: one output slide
//! per pass, shapes added through a minimal presentation API. The compositor
//! never talks to a sink directly; [`emit_slides`] replays finished slides.
//!
//! Tables are created with the row count of the complete table, then cut
//! back with [`ShapeSink::delete_trailing_rows`] when a pause interrupted
//! them, mirroring how presentation APIs build grids.

use std::path::Path;

use crate::compose::{ComposedSlide, Pass};
use crate::error::CompositeResult;
use crate::settings::SaveFormat;
use crate::shape::{Paragraph, Rect, Shape, ShapeKind, TableShape, TextRun};

/// Handle of an output slide.
pub type SlideId = usize;
/// Handle of a shape on an output slide.
pub type ShapeId = usize;

/// Cell edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderSide {
    Left,
    Right,
    Top,
    Bottom,
}

/// Consumer of composited shapes.
pub trait ShapeSink {
    /// Start the output slide of one pass.
    fn create_slide(&mut self, slide: &ComposedSlide, pass: &Pass) -> CompositeResult<SlideId>;

    /// Add an empty text shape.
    fn add_text_shape(&mut self, slide: SlideId, bounds: &Rect, hidden: bool) -> CompositeResult<ShapeId>;

    /// Start a paragraph in a text shape.
    fn begin_paragraph(&mut self, shape: ShapeId, paragraph: &Paragraph) -> CompositeResult<()>;

    /// Append a formatted run to the last paragraph.
    fn append_run(&mut self, shape: ShapeId, run: &TextRun) -> CompositeResult<()>;

    /// Add a picture.
    fn add_image_shape(
        &mut self,
        slide: SlideId,
        path: &Path,
        bounds: &Rect,
        hidden: bool,
    ) -> CompositeResult<ShapeId>;

    /// Add an empty `rows` x `cols` table.
    fn add_table_shape(
        &mut self,
        slide: SlideId,
        rows: usize,
        cols: usize,
        bounds: &Rect,
        hidden: bool,
    ) -> CompositeResult<ShapeId>;

    fn set_column_width(&mut self, table: ShapeId, col: usize, width: f32) -> CompositeResult<()>;

    fn cell_begin_paragraph(
        &mut self,
        table: ShapeId,
        row: usize,
        col: usize,
        paragraph: &Paragraph,
    ) -> CompositeResult<()>;

    fn cell_append_run(&mut self, table: ShapeId, row: usize, col: usize, run: &TextRun) -> CompositeResult<()>;

    fn set_cell_border(
        &mut self,
        table: ShapeId,
        row: usize,
        col: usize,
        side: BorderSide,
        visible: bool,
    ) -> CompositeResult<()>;

    /// Merge `span` cells of `row` starting at `col`.
    fn merge_cells(&mut self, table: ShapeId, row: usize, col: usize, span: usize) -> CompositeResult<()>;

    /// Delete rows from index `from` onward.
    fn delete_trailing_rows(&mut self, table: ShapeId, from: usize) -> CompositeResult<()>;

    /// Group shapes already added to a slide. Sinks without groups keep the
    /// members as they are.
    fn group_shapes(&mut self, slide: SlideId, members: &[ShapeId]) -> CompositeResult<Option<ShapeId>> {
        let _ = (slide, members);
        Ok(None)
    }

    /// Finish the output.
    fn finish(&mut self, format: SaveFormat) -> CompositeResult<()>;
}

// =============================================================================
// Emission
// =============================================================================

/// Replay composited slides into a sink and finish it.
pub fn emit_slides<S>(slides: &[ComposedSlide], format: SaveFormat, sink: &mut S) -> CompositeResult<()>
where
    S: ShapeSink + ?Sized,
{
    for slide in slides {
        emit_slide(slide, sink)?;
    }
    sink.finish(format)
}

/// Replay every pass of one slide.
pub fn emit_slide<S>(slide: &ComposedSlide, sink: &mut S) -> CompositeResult<()>
where
    S: ShapeSink + ?Sized,
{
    for pass in &slide.passes {
        let id = sink.create_slide(slide, pass)?;
        for shape in pass.all_shapes() {
            emit_shape(sink, id, shape).map_err(|err| err.in_slide(slide.index))?;
        }
    }
    Ok(())
}

fn emit_shape<S>(sink: &mut S, slide: SlideId, shape: &Shape) -> CompositeResult<ShapeId>
where
    S: ShapeSink + ?Sized,
{
    match &shape.kind {
        ShapeKind::Text(body) => {
            let id = sink.add_text_shape(slide, &shape.bounds, shape.hidden)?;
            body.paragraphs
                .iter()
                .try_for_each(|para| sink_paragraph(sink, id, para))?;
            Ok(id)
        }
        ShapeKind::Image(image) => sink.add_image_shape(slide, &image.path, &shape.bounds, shape.hidden),
        ShapeKind::Table(table) => emit_table(sink, slide, shape, table),
        ShapeKind::Group(members) => {
            let ids = members
                .iter()
                .map(|member| emit_shape(sink, slide, member))
                .collect::<CompositeResult<Vec<_>>>()?;
            let group = sink.group_shapes(slide, &ids)?;
            Ok(group.or_else(|| ids.first().copied()).unwrap_or_default())
        }
    }
}

fn sink_paragraph<S>(sink: &mut S, shape: ShapeId, para: &Paragraph) -> CompositeResult<()>
where
    S: ShapeSink + ?Sized,
{
    sink.begin_paragraph(shape, para)?;
    para.runs.iter().try_for_each(|run| sink.append_run(shape, run))
}

fn emit_table<S>(sink: &mut S, slide: SlideId, shape: &Shape, table: &TableShape) -> CompositeResult<ShapeId>
where
    S: ShapeSink + ?Sized,
{
    let cols = table.column_count();
    let rows = table.row_count();
    let id = sink.add_table_shape(slide, table.declared_rows, cols, &shape.bounds, shape.hidden)?;

    for (col, column) in table.columns.iter().enumerate() {
        sink.set_column_width(id, col, column.width)?;
    }

    for (r, cells) in table.rows.iter().enumerate() {
        for (c, cell) in cells.iter().enumerate() {
            if table.is_covered(r, c) {
                continue;
            }
            for para in &cell.body.paragraphs {
                sink.cell_begin_paragraph(id, r, c, para)?;
                for run in &para.runs {
                    sink.cell_append_run(id, r, c, run)?;
                }
            }

            let span = table.merge_at(r, c).map_or(1, |m| m.span);
            let left = cell.borders.left.unwrap_or_else(|| table.vertical_borders.contains(&c));
            let right = cell
                .borders
                .right
                .unwrap_or_else(|| table.vertical_borders.contains(&(c + span)));
            sink.set_cell_border(id, r, c, BorderSide::Left, left)?;
            sink.set_cell_border(id, r, c + span - 1, BorderSide::Right, right)?;
        }
    }

    // a line at index `i` is drawn above row `i`, below the last row past the end
    if rows > 0 {
        let edge = |line: usize| {
            if line < rows {
                (line, BorderSide::Top)
            } else {
                (rows - 1, BorderSide::Bottom)
            }
        };
        let mut hlines: Vec<_> = table.hlines.iter().copied().collect();
        hlines.sort_unstable();
        for line in hlines {
            let (row, side) = edge(line);
            for col in 0..cols {
                sink.set_cell_border(id, row, col, side, true)?;
            }
        }
        for cline in &table.clines {
            let (row, side) = edge(cline.row);
            for col in cline.from..=cline.to.min(cols.saturating_sub(1)) {
                sink.set_cell_border(id, row, col, side, true)?;
            }
        }
    }

    for merge in &table.merges {
        sink.merge_cells(id, merge.row, merge.col, merge.span)?;
    }
    if rows < table.declared_rows {
        sink.delete_trailing_rows(id, rows)?;
    }
    Ok(id)
}
