//! Markup rendering of composited decks.
//!
//! [`MarkupSink`] is a [`ShapeSink`] that keeps the emitted slides in memory
//! and serialises them to an XML-like string on [`finish`](ShapeSink::finish).
//! It is meant for debugging and tests, where comparing two renderings as
//! text is easier than inspecting a presentation file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use compact_str::CompactString;

use crate::compose::{ComposedSlide, Pass};
use crate::error::{CompositeError, CompositeResult};
use crate::settings::SaveFormat;
use crate::shape::{Align, Paragraph, Rect, TextRun};
use crate::sink::{BorderSide, ShapeId, ShapeSink, SlideId};

// =============================================================================
// MarkupConfig
// =============================================================================

/// Default attribute name for pass digests.
pub const DEFAULT_DIGEST_ATTR: &str = "digest";

/// Configuration for markup rendering.
#[derive(Debug, Clone)]
pub struct MarkupConfig {
    /// Emit a digest attribute on each slide
    pub emit_digests: bool,
    /// Indent nested elements, one per line
    pub pretty: bool,
}

impl MarkupConfig {
    /// Debugging config (digests, indented).
    pub const DEBUG: Self = Self {
        emit_digests: true,
        pretty: true,
    };

    /// Compact config (no digests, single line).
    pub const COMPACT: Self = Self {
        emit_digests: false,
        pretty: false,
    };
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self::DEBUG
    }
}

// =============================================================================
// In-memory model
// =============================================================================

#[derive(Debug, Default)]
struct ParagraphMarkup {
    level: u8,
    align: Align,
    bullet: Option<(CompactString, bool)>,
    runs: Vec<TextRun>,
}

impl ParagraphMarkup {
    fn new(paragraph: &Paragraph) -> Self {
        Self {
            level: paragraph.level,
            align: paragraph.align,
            bullet: paragraph.bullet.map(|b| (b.kind.label(), b.hidden)),
            runs: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct CellMarkup {
    paragraphs: Vec<ParagraphMarkup>,
    borders: Vec<BorderSide>,
    span: usize,
}

#[derive(Debug)]
enum ShapeBody {
    Text(Vec<ParagraphMarkup>),
    Image(PathBuf),
    Table {
        widths: Vec<f32>,
        rows: Vec<Vec<CellMarkup>>,
    },
    Group(Vec<ShapeId>),
}

#[derive(Debug)]
struct ShapeMarkup {
    slide: SlideId,
    bounds: Rect,
    hidden: bool,
    body: ShapeBody,
    /// Owned by a group
    grouped: bool,
}

#[derive(Debug)]
struct SlideMarkup {
    index: usize,
    pass: usize,
    digest: u64,
}

// =============================================================================
// MarkupSink
// =============================================================================

/// Sink rendering slides to markup.
#[derive(Debug, Default)]
pub struct MarkupSink {
    config: MarkupConfig,
    slides: Vec<SlideMarkup>,
    shapes: Vec<ShapeMarkup>,
    output: String,
}

impl MarkupSink {
    /// Create a sink with the default config.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: MarkupConfig) -> Self {
        self.config = config;
        self
    }

    /// Rendered markup; empty until [`finish`](ShapeSink::finish).
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consume the sink and return the markup.
    pub fn into_string(self) -> String {
        self.output
    }

    /// Number of output slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn shape_mut(&mut self, id: ShapeId) -> CompositeResult<&mut ShapeMarkup> {
        self.shapes.get_mut(id).ok_or_else(|| unknown("shape", id))
    }

    fn paragraphs_mut(&mut self, id: ShapeId) -> CompositeResult<&mut Vec<ParagraphMarkup>> {
        match &mut self.shape_mut(id)?.body {
            ShapeBody::Text(paragraphs) => Ok(paragraphs),
            _ => Err(unknown("text shape", id)),
        }
    }

    fn cell_mut(&mut self, id: ShapeId, row: usize, col: usize) -> CompositeResult<&mut CellMarkup> {
        match &mut self.shape_mut(id)?.body {
            ShapeBody::Table { rows, .. } => rows
                .get_mut(row)
                .and_then(|cells| cells.get_mut(col))
                .ok_or_else(|| unknown("table cell", format_args!("{row}:{col}"))),
            _ => Err(unknown("table", id)),
        }
    }

    fn add(&mut self, slide: SlideId, bounds: &Rect, hidden: bool, body: ShapeBody) -> CompositeResult<ShapeId> {
        if slide >= self.slides.len() {
            return Err(unknown("slide", slide));
        }
        self.shapes.push(ShapeMarkup {
            slide,
            bounds: *bounds,
            hidden,
            body,
            grouped: false,
        });
        Ok(self.shapes.len() - 1)
    }
}

fn unknown(what: &str, id: impl std::fmt::Display) -> CompositeError {
    CompositeError::sink(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("unknown {what} {id}"),
    ))
}

impl ShapeSink for MarkupSink {
    fn create_slide(&mut self, slide: &ComposedSlide, pass: &Pass) -> CompositeResult<SlideId> {
        self.slides.push(SlideMarkup {
            index: slide.index,
            pass: pass.number,
            digest: pass.digest(),
        });
        Ok(self.slides.len() - 1)
    }

    fn add_text_shape(&mut self, slide: SlideId, bounds: &Rect, hidden: bool) -> CompositeResult<ShapeId> {
        self.add(slide, bounds, hidden, ShapeBody::Text(Vec::new()))
    }

    fn begin_paragraph(&mut self, shape: ShapeId, paragraph: &Paragraph) -> CompositeResult<()> {
        self.paragraphs_mut(shape)?.push(ParagraphMarkup::new(paragraph));
        Ok(())
    }

    fn append_run(&mut self, shape: ShapeId, run: &TextRun) -> CompositeResult<()> {
        let paragraphs = self.paragraphs_mut(shape)?;
        if paragraphs.is_empty() {
            paragraphs.push(ParagraphMarkup::default());
        }
        if let Some(last) = paragraphs.last_mut() {
            last.runs.push(run.clone());
        }
        Ok(())
    }

    fn add_image_shape(&mut self, slide: SlideId, path: &Path, bounds: &Rect, hidden: bool) -> CompositeResult<ShapeId> {
        self.add(slide, bounds, hidden, ShapeBody::Image(path.to_path_buf()))
    }

    fn add_table_shape(
        &mut self,
        slide: SlideId,
        rows: usize,
        cols: usize,
        bounds: &Rect,
        hidden: bool,
    ) -> CompositeResult<ShapeId> {
        let grid = (0..rows)
            .map(|_| {
                (0..cols)
                    .map(|_| CellMarkup {
                        paragraphs: Vec::new(),
                        borders: Vec::new(),
                        span: 1,
                    })
                    .collect()
            })
            .collect();
        let body = ShapeBody::Table {
            widths: vec![0.0; cols],
            rows: grid,
        };
        self.add(slide, bounds, hidden, body)
    }

    fn set_column_width(&mut self, table: ShapeId, col: usize, width: f32) -> CompositeResult<()> {
        match &mut self.shape_mut(table)?.body {
            ShapeBody::Table { widths, .. } if col < widths.len() => {
                widths[col] = width;
                Ok(())
            }
            _ => Err(unknown("table column", col)),
        }
    }

    fn cell_begin_paragraph(&mut self, table: ShapeId, row: usize, col: usize, paragraph: &Paragraph) -> CompositeResult<()> {
        self.cell_mut(table, row, col)?
            .paragraphs
            .push(ParagraphMarkup::new(paragraph));
        Ok(())
    }

    fn cell_append_run(&mut self, table: ShapeId, row: usize, col: usize, run: &TextRun) -> CompositeResult<()> {
        let cell = self.cell_mut(table, row, col)?;
        if cell.paragraphs.is_empty() {
            cell.paragraphs.push(ParagraphMarkup::default());
        }
        if let Some(last) = cell.paragraphs.last_mut() {
            last.runs.push(run.clone());
        }
        Ok(())
    }

    fn set_cell_border(
        &mut self,
        table: ShapeId,
        row: usize,
        col: usize,
        side: BorderSide,
        visible: bool,
    ) -> CompositeResult<()> {
        let cell = self.cell_mut(table, row, col)?;
        cell.borders.retain(|&s| s != side);
        if visible {
            cell.borders.push(side);
        }
        Ok(())
    }

    fn merge_cells(&mut self, table: ShapeId, row: usize, col: usize, span: usize) -> CompositeResult<()> {
        self.cell_mut(table, row, col)?.span = span;
        Ok(())
    }

    fn delete_trailing_rows(&mut self, table: ShapeId, from: usize) -> CompositeResult<()> {
        match &mut self.shape_mut(table)?.body {
            ShapeBody::Table { rows, .. } => {
                rows.truncate(from);
                Ok(())
            }
            _ => Err(unknown("table", table)),
        }
    }

    fn group_shapes(&mut self, slide: SlideId, members: &[ShapeId]) -> CompositeResult<Option<ShapeId>> {
        let mut bounds: Option<Rect> = None;
        for &id in members {
            let member = self.shape_mut(id)?;
            member.grouped = true;
            bounds = Some(bounds.map_or(member.bounds, |b| b.union(&member.bounds)));
        }
        let bounds = bounds.unwrap_or_default();
        self.add(slide, &bounds, false, ShapeBody::Group(members.to_vec()))
            .map(Some)
    }

    fn finish(&mut self, format: SaveFormat) -> CompositeResult<()> {
        if format != SaveFormat::Markup {
            log::debug!("markup sink ignores save format {format:?}");
        }
        let mut out = Writer::new(self.config.pretty);
        out.open("deck", &[("slides", self.slides.len().to_string())]);
        for (id, slide) in self.slides.iter().enumerate() {
            let mut attrs = vec![("index", slide.index.to_string()), ("pass", slide.pass.to_string())];
            if self.config.emit_digests {
                attrs.push((DEFAULT_DIGEST_ATTR, format!("{:016x}", slide.digest)));
            }
            out.open("slide", &attrs);
            for (shape_id, shape) in self.shapes.iter().enumerate() {
                if shape.slide == id && !shape.grouped {
                    render_shape(&self.shapes, shape_id, &mut out);
                }
            }
            out.close("slide");
        }
        out.close("deck");
        self.output = out.finish();
        Ok(())
    }
}

// =============================================================================
// Serialisation
// =============================================================================

struct Writer {
    out: String,
    depth: usize,
    pretty: bool,
}

impl Writer {
    fn new(pretty: bool) -> Self {
        Self { out: String::new(), depth: 0, pretty }
    }

    fn line(&mut self) {
        if self.pretty {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            for _ in 0..self.depth {
                self.out.push_str("  ");
            }
        }
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, String)]) {
        self.line();
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            let _ = write!(self.out, " {key}=\"{}\"", escape_attr(value));
        }
    }

    fn open(&mut self, name: &str, attrs: &[(&str, String)]) {
        self.tag(name, attrs);
        self.out.push('>');
        self.depth += 1;
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, String)]) {
        self.tag(name, attrs);
        self.out.push_str(" />");
    }

    fn leaf(&mut self, name: &str, attrs: &[(&str, String)], text: &str) {
        self.tag(name, attrs);
        self.out.push('>');
        self.out.push_str(&escape_text(text));
        let _ = write!(self.out, "</{name}>");
    }

    fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line();
        let _ = write!(self.out, "</{name}>");
    }

    fn finish(self) -> String {
        self.out
    }
}

fn bounds_attrs(bounds: &Rect, hidden: bool) -> Vec<(&'static str, String)> {
    let mut attrs = vec![
        ("x", format!("{:.1}", bounds.left)),
        ("y", format!("{:.1}", bounds.top)),
        ("w", format!("{:.1}", bounds.width)),
        ("h", format!("{:.1}", bounds.height)),
    ];
    if hidden {
        attrs.push(("hidden", "true".to_string()));
    }
    attrs
}

fn render_shape(shapes: &[ShapeMarkup], id: ShapeId, out: &mut Writer) {
    let Some(shape) = shapes.get(id) else {
        return;
    };
    let attrs = bounds_attrs(&shape.bounds, shape.hidden);
    match &shape.body {
        ShapeBody::Text(paragraphs) => {
            out.open("text", &attrs);
            render_paragraphs(paragraphs, out);
            out.close("text");
        }
        ShapeBody::Image(path) => {
            let mut attrs = attrs;
            attrs.push(("src", path.display().to_string()));
            out.empty("image", &attrs);
        }
        ShapeBody::Table { widths, rows } => {
            let mut attrs = attrs;
            let widths: Vec<String> = widths.iter().map(|w| format!("{w:.1}")).collect();
            attrs.push(("columns", widths.join(" ")));
            out.open("table", &attrs);
            for cells in rows {
                out.open("row", &[]);
                for cell in cells {
                    let mut attrs = Vec::new();
                    if cell.span > 1 {
                        attrs.push(("span", cell.span.to_string()));
                    }
                    if !cell.borders.is_empty() {
                        let sides: Vec<&str> = cell.borders.iter().map(|s| side_name(*s)).collect();
                        attrs.push(("border", sides.join(" ")));
                    }
                    out.open("cell", &attrs);
                    render_paragraphs(&cell.paragraphs, out);
                    out.close("cell");
                }
                out.close("row");
            }
            out.close("table");
        }
        ShapeBody::Group(members) => {
            out.open("group", &attrs);
            for &member in members {
                render_shape(shapes, member, out);
            }
            out.close("group");
        }
    }
}

fn render_paragraphs(paragraphs: &[ParagraphMarkup], out: &mut Writer) {
    for para in paragraphs {
        let mut attrs = Vec::new();
        if para.level > 0 {
            attrs.push(("level", para.level.to_string()));
        }
        if para.align != Align::Left {
            attrs.push(("align", align_name(para.align).to_string()));
        }
        if let Some((label, hidden)) = &para.bullet {
            attrs.push(("bullet", label.to_string()));
            if *hidden {
                attrs.push(("bullet-hidden", "true".to_string()));
            }
        }
        out.open("p", &attrs);
        for run in &para.runs {
            out.leaf("run", &run_attrs(run), &run.text);
        }
        out.close("p");
    }
}

fn run_attrs(run: &TextRun) -> Vec<(&'static str, String)> {
    let format = &run.format;
    let mut attrs = vec![
        ("font", format.font_family.to_string()),
        ("size", format!("{:.1}", format.font_size)),
        ("color", format.color.to_hex()),
    ];
    let flags = [
        ("bold", format.bold),
        ("italic", format.italic),
        ("underline", format.underline),
        ("smallcaps", format.smallcaps),
        ("hidden", run.hidden),
    ];
    attrs.extend(
        flags
            .into_iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| (name, "true".to_string())),
    );
    attrs
}

fn align_name(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
    }
}

fn side_name(side: BorderSide) -> &'static str {
    match side {
        BorderSide::Left => "left",
        BorderSide::Right => "right",
        BorderSide::Top => "top",
        BorderSide::Bottom => "bottom",
    }
}

/// Escape markup special characters in text.
fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape attribute values.
fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

// =============================================================================
// Tests
// =============================================================================
