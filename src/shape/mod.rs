//! Shapes produced by one pass.
//!
//! A pass is a list of positioned [`Shape`]s. Shapes are created fresh on
//! every pass and handed to a sink once the pass is complete.

pub mod metrics;
mod table;
mod text;

pub use table::{CLine, Cell, CellBorders, Column, Merge, TableShape};
pub use text::{Align, Bullet, BulletKind, Line, Paragraph, TextBody, TextLayout, TextPos, TextRun};

use std::path::PathBuf;

use compact_str::CompactString;

use crate::hash::{StableHash, StableHasher};
use crate::{impl_enum_accessors, impl_variant_names};

// =============================================================================
// Rect
// =============================================================================

/// Bounds in target points, origin at the slide's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create from position and size.
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Translate vertically.
    pub fn offset_y(&mut self, dy: f32) {
        self.top += dy;
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        Rect::new(
            left,
            top,
            self.right().max(other.right()) - left,
            self.bottom().max(other.bottom()) - top,
        )
    }
}

impl StableHash for Rect {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        hasher
            .update_f32(self.left)
            .update_f32(self.top)
            .update_f32(self.width)
            .update_f32(self.height)
    }
}

// =============================================================================
// Shape
// =============================================================================

/// Image shape content.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageShape {
    /// Resolved file
    pub path: PathBuf,
    /// Name as written in the document
    pub name: CompactString,
}

/// Shape payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Text(TextBody),
    Image(ImageShape),
    Table(TableShape),
    /// Shapes positioned together (title page)
    Group(Vec<Shape>),
}

impl ShapeKind {
    impl_enum_accessors!(text: TextBody, image: ImageShape, table: TableShape, group: Vec<Shape>);
    impl_variant_names!(name; Text => "text", Image => "image", Table => "table", Group => "group");
}

/// Positioned shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub bounds: Rect,
    pub kind: ShapeKind,
    /// Rendered with zero opacity (text shapes hide per run instead)
    pub hidden: bool,
}

impl Shape {
    /// Create a visible shape.
    pub fn new(bounds: Rect, kind: ShapeKind) -> Self {
        Self { bounds, kind, hidden: false }
    }

    /// Set the hidden flag.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Check if the shape floats (images and tables).
    pub fn is_float(&self) -> bool {
        matches!(self.kind, ShapeKind::Image(_) | ShapeKind::Table(_))
    }

    /// Text body of a text shape.
    pub fn text(&self) -> Option<&TextBody> {
        self.kind.as_text()
    }

    /// Move the shape (and group members) vertically.
    pub fn offset_y(&mut self, dy: f32) {
        self.offset(0.0, dy);
    }

    /// Translate the shape and its group members.
    pub fn offset(&mut self, dx: f32, dy: f32) {
        self.bounds.left += dx;
        self.bounds.offset_y(dy);
        if let ShapeKind::Group(members) = &mut self.kind {
            for member in members {
                member.offset(dx, dy);
            }
        }
    }

    /// Move the top-left corner to (`left`, `top`).
    pub fn move_to(&mut self, left: f32, top: f32) {
        self.offset(left - self.bounds.left, top - self.bounds.top);
    }

    /// Resize a text shape's height to its wrapped content.
    pub fn fit_height(&mut self) {
        if let ShapeKind::Text(body) = &self.kind {
            self.bounds.height = body.layout(self.bounds.width).height();
        }
    }
}

impl StableHash for Shape {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        let hasher = self
            .bounds
            .stable_hash(hasher.update_str(self.kind.name()))
            .update_bool(self.hidden);
        match &self.kind {
            ShapeKind::Text(body) => body.stable_hash(hasher),
            ShapeKind::Image(image) => hasher
                .update_str(&image.path.to_string_lossy())
                .update_str(&image.name),
            ShapeKind::Table(table) => table.stable_hash(hasher),
            ShapeKind::Group(shapes) => shapes.as_slice().stable_hash(hasher),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatSettings;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.right(), 40.0);
        assert_eq!(rect.bottom(), 60.0);
    }

    #[test]
    fn test_shape_accessors() {
        let mut shape = Shape::new(Rect::default(), ShapeKind::Text(TextBody::new(20.0)));
        assert!(shape.kind.is_text());
        assert!(!shape.is_float());
        assert_eq!(shape.kind.name(), "text");

        if let Some(body) = shape.kind.as_text_mut() {
            body.append("abc", &FormatSettings::new(20.0), false);
        }
        assert_eq!(shape.text().map(TextBody::plain_text).as_deref(), Some("abc"));

        let image = Shape::new(
            Rect::default(),
            ShapeKind::Image(ImageShape { path: "a.png".into(), name: "a".into() }),
        );
        assert!(image.is_float());
        assert!(image.kind.as_table().is_none());
    }

    #[test]
    fn test_group_offset() {
        let member = Shape::new(Rect::new(0.0, 10.0, 5.0, 5.0), ShapeKind::Text(TextBody::new(20.0)));
        let mut group = Shape::new(Rect::new(0.0, 10.0, 5.0, 5.0), ShapeKind::Group(vec![member]));
        group.offset_y(4.0);
        assert_eq!(group.bounds.top, 14.0);
        assert_eq!(group.kind.as_group().unwrap()[0].bounds.top, 14.0);

        group.move_to(3.0, 0.0);
        assert_eq!(group.kind.as_group().unwrap()[0].bounds, Rect::new(3.0, 0.0, 5.0, 5.0));

        let union = Rect::new(0.0, 0.0, 10.0, 10.0).union(&Rect::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(union, Rect::new(0.0, 0.0, 15.0, 15.0));
    }

    #[test]
    fn test_fit_height() {
        let mut body = TextBody::new(20.0);
        body.append("aaaa bbbb cccc", &FormatSettings::new(20.0), false);
        let mut shape = Shape::new(Rect::new(0.0, 0.0, 100.0, 0.0), ShapeKind::Text(body));
        shape.fit_height();
        assert!((shape.bounds.height - 48.0).abs() < 1e-3);
    }

    #[test]
    fn test_digest_tracks_visibility() {
        let shape = Shape::new(Rect::default(), ShapeKind::Text(TextBody::new(20.0)));
        let hidden = shape.clone().with_hidden(true);
        assert_eq!(shape.digest(), shape.clone().digest());
        assert_ne!(shape.digest(), hidden.digest());
    }
}
