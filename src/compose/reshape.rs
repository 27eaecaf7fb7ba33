//! Flow layout of body shapes.
//!
//! Shapes are stacked top to bottom in the content area. Between two flow
//! boundaries (paragraph breaks), up to two consecutive shapes form a group
//! that is rearranged side by side when it fits:
//!
//! | first  | second | result                                              |
//! |--------|--------|-----------------------------------------------------|
//! | text   | float  | last text line moves beside the float               |
//! | float  | float  | floats side by side                                 |
//! | float  | text   | text starts beside the float, overflow goes below   |
//! | text   | text   | unchanged                                           |
//!
//! This only approximates wrapping around floats; overlap is still possible
//! with unusual sizes.

use smallvec::SmallVec;

use crate::shape::metrics::SHAPE_GAP;
use crate::shape::{Rect, Shape, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Text,
    Float,
    Other,
}

fn role(shape: &Shape) -> Role {
    match shape.kind {
        ShapeKind::Text(_) => Role::Text,
        ShapeKind::Image(_) | ShapeKind::Table(_) => Role::Float,
        ShapeKind::Group(_) => Role::Other,
    }
}

/// Stacks shapes in the content area and reshapes pairs.
#[derive(Debug)]
pub struct FlowLayout {
    area: Rect,
    /// Top of the next free row
    cursor: f32,
    group: SmallVec<[Shape; 2]>,
    placed: Vec<Shape>,
}

impl FlowLayout {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            cursor: area.top,
            group: SmallVec::new(),
            placed: Vec::new(),
        }
    }

    pub fn area(&self) -> &Rect {
        &self.area
    }

    /// Top of the next free row.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Add a shape below the previous ones.
    ///
    /// Text shapes take the full content width; floats keep their size.
    pub fn push(&mut self, mut shape: Shape) {
        let top = self.group.last().map_or(self.cursor, |s| s.bounds.bottom());
        shape.move_to(self.area.left, top);
        if role(&shape) == Role::Text {
            shape.bounds.width = self.area.width;
            shape.fit_height();
        }

        self.group.push(shape);
        if self.group.len() == 2 {
            self.reshape();
            self.flush();
        }
    }

    /// Close the current group.
    pub fn flush(&mut self) {
        for shape in self.group.drain(..) {
            self.cursor = self.cursor.max(shape.bounds.bottom());
            self.placed.push(shape);
        }
    }

    /// Place a shape on its own row, centred horizontally.
    pub fn place_block(&mut self, mut shape: Shape) {
        self.flush();
        let left = self.area.left + ((self.area.width - shape.bounds.width) / 2.0).max(0.0);
        shape.move_to(left, self.cursor);
        self.cursor = shape.bounds.bottom();
        self.placed.push(shape);
    }

    /// Close the layout and return the shapes in placement order.
    pub fn finish(mut self) -> Vec<Shape> {
        self.flush();
        self.placed
    }

    fn reshape(&mut self) {
        let area = self.area;
        let (head, tail) = self.group.split_at_mut(1);
        let (first, second) = (&mut head[0], &mut tail[0]);

        let extra = match (role(first), role(second)) {
            (Role::Text, Role::Float) => text_then_float(first, second, &area).map(|s| (1, s)),
            (Role::Float, Role::Float) => {
                float_pair(first, second, &area);
                None
            }
            (Role::Float, Role::Text) => float_then_text(first, second, &area).map(|s| (2, s)),
            _ => None,
        };

        if let Some((index, shape)) = extra {
            self.group.insert(index, shape);
        }
    }
}

/// Move the last line of `text` beside `float`, or the float beside a
/// single-line text. Returns the split-off line.
fn text_then_float(text: &mut Shape, float: &mut Shape, area: &Rect) -> Option<Shape> {
    let width = text.bounds.width;
    let ShapeKind::Text(body) = &mut text.kind else {
        return None;
    };
    let layout = body.layout(width);
    let last = *layout.lines.last()?;
    let beside = area.width - float.bounds.width - SHAPE_GAP;
    if last.width > beside {
        return None;
    }

    if layout.len() > 1 {
        let line = body.split_off(last.start);
        text.fit_height();
        let top = text.bounds.bottom();

        let mut shape = Shape::new(Rect::new(area.left, top, beside, 0.0), ShapeKind::Text(line));
        shape.fit_height();
        float.move_to(area.left + beside + SHAPE_GAP, top);
        log::trace!("reshape: last line beside float at {top}");
        Some(shape)
    } else {
        text.bounds.width = beside;
        text.fit_height();
        float.move_to(text.bounds.right() + SHAPE_GAP, text.bounds.top);
        None
    }
}

fn float_pair(first: &Shape, second: &mut Shape, area: &Rect) {
    if first.bounds.width + SHAPE_GAP + second.bounds.width <= area.width {
        second.move_to(first.bounds.right() + SHAPE_GAP, first.bounds.top);
    }
}

/// Start `text` beside `float` when its first word fits there. Lines below
/// the float's bottom move into a full-width shape under both.
fn float_then_text(float: &Shape, text: &mut Shape, area: &Rect) -> Option<Shape> {
    let beside = area.width - float.bounds.width - SHAPE_GAP;
    let ShapeKind::Text(body) = &mut text.kind else {
        return None;
    };
    let indent = body.paragraphs.first().map_or(0.0, |p| p.indent());
    if beside <= 0.0 || indent + body.first_word_width() > beside {
        return None;
    }

    let layout = body.layout(beside);
    let mut y = 0.0;
    let mut split = None;
    for (i, line) in layout.lines.iter().enumerate() {
        if i > 0 && y >= float.bounds.height {
            split = Some(line.start);
            break;
        }
        y += line.height;
    }
    let overflow = split.map(|pos| body.split_off(pos));

    text.move_to(float.bounds.right() + SHAPE_GAP, float.bounds.top);
    text.bounds.width = beside;
    text.fit_height();

    overflow.map(|rest| {
        let top = float.bounds.bottom().max(text.bounds.bottom());
        let mut shape = Shape::new(Rect::new(area.left, top, area.width, 0.0), ShapeKind::Text(rest));
        shape.fit_height();
        shape
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatSettings;
    use crate::shape::{ImageShape, TextBody};

    const AREA: Rect = Rect::new(0.0, 0.0, 600.0, 400.0);

    // 20pt text: 10pt per glyph, 24pt per line
    fn text(content: &str) -> Shape {
        let mut body = TextBody::new(20.0);
        body.append(content, &FormatSettings::new(20.0), false);
        Shape::new(Rect::default(), ShapeKind::Text(body))
    }

    fn image(width: f32, height: f32) -> Shape {
        Shape::new(
            Rect::new(0.0, 0.0, width, height),
            ShapeKind::Image(ImageShape { path: "x.png".into(), name: "x".into() }),
        )
    }

    fn plain(shape: &Shape) -> String {
        shape.text().map(TextBody::plain_text).unwrap_or_default()
    }

    #[test]
    fn test_single_line_text_then_float() {
        let mut flow = FlowLayout::new(AREA);
        flow.push(text("short"));
        flow.push(image(100.0, 80.0));
        let shapes = flow.finish();

        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].bounds.width, 600.0 - 100.0 - SHAPE_GAP);
        assert_eq!(shapes[1].bounds.top, 0.0);
        assert_eq!(shapes[1].bounds.left, shapes[0].bounds.right() + SHAPE_GAP);
    }

    #[test]
    fn test_multi_line_text_splits_last_line() {
        // 80 glyphs wrap into two lines at 600pt
        let words = ["aaaaaaaaa"; 8].join(" ");
        let mut flow = FlowLayout::new(AREA);
        flow.push(text(&words));
        flow.push(image(100.0, 50.0));
        let shapes = flow.finish();

        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[0].bounds.height, 24.0);
        assert!(plain(&shapes[1]).starts_with("aaaaaaaaa"));
        assert_eq!(shapes[1].bounds.top, 24.0);
        assert_eq!(shapes[2].bounds.top, 24.0);
        assert_eq!(format!("{} {}", plain(&shapes[0]).trim_end(), plain(&shapes[1])), words);
        assert!(shapes[1].text().is_some_and(|b| b.paragraphs[0].bullet.is_none()));
        assert_eq!(flow_bottom(&shapes), 74.0);
    }

    fn flow_bottom(shapes: &[Shape]) -> f32 {
        shapes.iter().map(|s| s.bounds.bottom()).fold(0.0, f32::max)
    }

    #[test]
    fn test_wide_float_stays_below() {
        let mut flow = FlowLayout::new(AREA);
        flow.push(text("short"));
        flow.push(image(590.0, 50.0));
        let shapes = flow.finish();
        assert_eq!(shapes[1].bounds.top, 24.0);
        assert_eq!(shapes[1].bounds.left, 0.0);
    }

    #[test]
    fn test_floats_side_by_side() {
        let mut flow = FlowLayout::new(AREA);
        flow.push(image(200.0, 50.0));
        flow.push(image(200.0, 80.0));
        let shapes = flow.finish();
        assert_eq!(shapes[1].bounds.top, 0.0);
        assert_eq!(shapes[1].bounds.left, 200.0 + SHAPE_GAP);
    }

    #[test]
    fn test_float_then_text_overflows_below() {
        let words = ["aaaa"; 40].join(" ");
        let mut flow = FlowLayout::new(AREA);
        flow.push(image(292.0, 40.0));
        flow.push(text(&words));
        flow.push(text("next"));
        let shapes = flow.finish();

        // beside: 300pt wide, two lines cover the 40pt float
        let beside = &shapes[1];
        assert_eq!(beside.bounds.left, 300.0);
        assert_eq!(beside.bounds.width, 300.0);
        assert_eq!(beside.bounds.height, 48.0);

        let below = &shapes[2];
        assert_eq!(below.bounds.left, 0.0);
        assert_eq!(below.bounds.top, 48.0);
        assert_eq!(below.bounds.width, 600.0);
        assert_eq!(shapes[3].bounds.top, below.bounds.bottom());
    }

    #[test]
    fn test_float_then_text_without_room() {
        let mut flow = FlowLayout::new(AREA);
        flow.push(image(560.0, 40.0));
        flow.push(text("longword"));
        let shapes = flow.finish();
        assert_eq!(shapes[1].bounds.top, 40.0);
        assert_eq!(shapes[1].bounds.left, 0.0);
    }

    #[test]
    fn test_text_pairs_stack_and_flush() {
        let mut flow = FlowLayout::new(AREA);
        flow.push(text("one"));
        flow.push(text("two"));
        assert_eq!(flow.cursor(), 48.0);
        flow.push(image(100.0, 10.0));
        flow.flush();
        assert_eq!(flow.cursor(), 58.0);

        let mut block = image(100.0, 30.0);
        block.kind = ShapeKind::Group(Vec::new());
        flow.place_block(block);
        let shapes = flow.finish();
        assert_eq!(shapes[1].bounds.top, 24.0);
        assert_eq!(shapes[3].bounds.left, 250.0);
        assert_eq!(shapes[3].bounds.top, 58.0);
    }
}
