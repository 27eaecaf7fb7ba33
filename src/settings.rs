//! Conversion settings.
//!
//! [`Settings`] is passed explicitly to the converter; nothing is read from
//! global state. Values are in Beamer points unless noted otherwise, and are
//! scaled to target points by [`Settings::scale`].

use crate::shape::Rect;
use crate::units::{LengthContext, PT_PER_CM};

/// Default base font size of a Beamer document (`11pt` class option).
pub const DEFAULT_FONT_SIZE: f32 = 11.0;
/// Default bound on passes per slide.
pub const DEFAULT_MAX_PASSES: usize = 256;

// =============================================================================
// SaveFormat
// =============================================================================

/// Target file format, forwarded to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SaveFormat {
    /// Whatever the sink considers native
    #[default]
    Default,
    /// Office Open XML presentation
    OpenXml,
    /// Legacy binary presentation
    Legacy,
    /// Portable document
    Pdf,
    /// Debug markup (see [`MarkupSink`](crate::render::MarkupSink))
    Markup,
}

impl SaveFormat {
    /// Usual file extension.
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Default | SaveFormat::OpenXml => "pptx",
            SaveFormat::Legacy => "ppt",
            SaveFormat::Pdf => "pdf",
            SaveFormat::Markup => "xml",
        }
    }
}

// =============================================================================
// Slide geometry
// =============================================================================

/// Slide layout in target points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideGeometry {
    pub width: f32,
    pub height: f32,
    /// Margin around the content, in Beamer points
    pub margin: f32,
    /// Height of the frame title band, in Beamer points
    pub title_height: f32,
}

impl Default for SlideGeometry {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 540.0,
            margin: PT_PER_CM,
            title_height: 28.0,
        }
    }
}

impl SlideGeometry {
    /// Frame title band.
    pub fn title_area(&self, scale: f32) -> Rect {
        let margin = self.margin * scale;
        Rect::new(
            margin,
            margin / 2.0,
            self.width - 2.0 * margin,
            self.title_height * scale,
        )
    }

    /// Content area below the title band (or the top margin).
    pub fn content_area(&self, scale: f32, with_title: bool) -> Rect {
        let margin = self.margin * scale;
        let top = if with_title {
            self.title_area(scale).bottom()
        } else {
            margin
        };
        Rect::new(
            margin,
            top,
            self.width - 2.0 * margin,
            (self.height - top - margin).max(0.0),
        )
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Conversion settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base font size in Beamer points
    pub base_font_size: f32,
    /// Double absolute lengths (the target slide is twice the Beamer page)
    pub adjust_size: bool,
    /// Inline nested blocks in titles and table cells as text; when off they
    /// are rendered after the main content and their pauses are ignored
    pub nested_as_text: bool,
    pub save_as: SaveFormat,
    /// Passes per slide before giving up
    pub max_passes: usize,
    pub geometry: SlideGeometry,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_font_size: DEFAULT_FONT_SIZE,
            adjust_size: true,
            nested_as_text: true,
            save_as: SaveFormat::Default,
            max_passes: DEFAULT_MAX_PASSES,
            geometry: SlideGeometry::default(),
        }
    }
}

impl Settings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_font_size(mut self, size: f32) -> Self {
        self.base_font_size = size;
        self
    }

    pub fn with_adjust_size(mut self, adjust: bool) -> Self {
        self.adjust_size = adjust;
        self
    }

    pub fn with_nested_as_text(mut self, nested_as_text: bool) -> Self {
        self.nested_as_text = nested_as_text;
        self
    }

    pub fn with_save_as(mut self, format: SaveFormat) -> Self {
        self.save_as = format;
        self
    }

    pub fn with_max_passes(mut self, max: usize) -> Self {
        self.max_passes = max.max(1);
        self
    }

    pub fn with_geometry(mut self, geometry: SlideGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Beamer point to target point factor.
    #[inline]
    pub fn scale(&self) -> f32 {
        if self.adjust_size { 2.0 } else { 1.0 }
    }

    /// Base font size in target points.
    #[inline]
    pub fn font_size(&self) -> f32 {
        self.base_font_size * self.scale()
    }

    /// Length context for content laid out in `area`.
    pub fn length_context(&self, area: &Rect) -> LengthContext {
        LengthContext {
            scale: self.scale(),
            em: self.font_size(),
            text_width: area.width,
            text_height: area.height,
        }
    }
}

// =============================================================================
// Slide options
// =============================================================================

/// Vertical placement of slide content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Options from the slide node's parameters (`[t]`, `[shrink,c]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlideOptions {
    pub align: VerticalAlign,
}

impl SlideOptions {
    /// Parse comma separated options; unknown ones are ignored, the last
    /// alignment wins.
    pub fn parse(params: &str) -> Self {
        let mut options = Self::default();
        for part in params.split(',').map(str::trim) {
            match part {
                "t" => options.align = VerticalAlign::Top,
                "c" => options.align = VerticalAlign::Center,
                "b" => options.align = VerticalAlign::Bottom,
                _ => {}
            }
        }
        options
    }
}
