//! Text formatting stack.
//!
//! Entering a style node saves the current [`FormatSettings`] and applies the
//! node's change; leaving it restores the saved settings. Walkers drive this
//! with a synthetic "pop" task so the stack stays balanced without recursion.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::hash::{StableHash, StableHasher};
use crate::node::{Node, NodeKind};

/// Default proportional font.
pub const DEFAULT_FONT: &str = "Calibri";
/// Font used for `\texttt`.
pub const MONOSPACE_FONT: &str = "Courier New";

// =============================================================================
// Color
// =============================================================================

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Beamer's default alert color.
    pub const ALERT: Color = Color::rgb(255, 0, 0);

    /// Create from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` notation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Look up an xcolor base color by name.
    pub fn named(name: &str) -> Option<Color> {
        let color = match name {
            "black" => Color::rgb(0, 0, 0),
            "white" => Color::rgb(255, 255, 255),
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 255, 0),
            "blue" => Color::rgb(0, 0, 255),
            "cyan" => Color::rgb(0, 255, 255),
            "magenta" => Color::rgb(255, 0, 255),
            "yellow" => Color::rgb(255, 255, 0),
            "gray" => Color::rgb(128, 128, 128),
            "darkgray" => Color::rgb(64, 64, 64),
            "lightgray" => Color::rgb(191, 191, 191),
            "brown" => Color::rgb(191, 128, 64),
            "lime" => Color::rgb(191, 255, 0),
            "olive" => Color::rgb(128, 128, 0),
            "orange" => Color::rgb(255, 128, 0),
            "pink" => Color::rgb(255, 191, 191),
            "purple" => Color::rgb(191, 0, 64),
            "teal" => Color::rgb(0, 128, 128),
            "violet" => Color::rgb(128, 0, 128),
            _ => return None,
        };
        Some(color)
    }

    /// Mix `pct` percent of `self` with `other`.
    pub fn mix(self, other: Color, pct: f32) -> Color {
        let t = (pct / 100.0).clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f32 * t + b as f32 * (1.0 - t)).round() as u8;
        Color::rgb(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }

    /// Parse a `\color[model]{spec}` pair.
    ///
    /// Without a model the spec is an xcolor expression (`red`, `blue!40`,
    /// `red!30!green`). Supported models: `rgb`, `RGB`, `HTML`, `gray`, `cmyk`.
    pub fn parse(model: &str, spec: &str) -> Option<Color> {
        let spec = spec.trim();
        let components = || -> Option<SmallVec<[f32; 4]>> {
            spec.split(',').map(|c| c.trim().parse::<f32>().ok()).collect()
        };
        let unit = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

        match model.trim() {
            "" => Self::parse_expression(spec),
            "rgb" => match components()?.as_slice() {
                [r, g, b] => Some(Color::rgb(unit(*r), unit(*g), unit(*b))),
                _ => None,
            },
            "RGB" => match components()?.as_slice() {
                [r, g, b] => Some(Color::rgb(
                    r.clamp(0.0, 255.0) as u8,
                    g.clamp(0.0, 255.0) as u8,
                    b.clamp(0.0, 255.0) as u8,
                )),
                _ => None,
            },
            "gray" => match components()?.as_slice() {
                [g] => Some(Color::rgb(unit(*g), unit(*g), unit(*g))),
                _ => None,
            },
            "cmyk" => match components()?.as_slice() {
                [c, m, y, k] => {
                    let k = 1.0 - k.clamp(0.0, 1.0);
                    Some(Color::rgb(
                        unit((1.0 - c) * k),
                        unit((1.0 - m) * k),
                        unit((1.0 - y) * k),
                    ))
                }
                _ => None,
            },
            "HTML" => {
                if spec.len() != 6 {
                    return None;
                }
                let value = u32::from_str_radix(spec, 16).ok()?;
                Some(Color::rgb(
                    (value >> 16) as u8,
                    (value >> 8) as u8,
                    value as u8,
                ))
            }
            _ => None,
        }
    }

    fn parse_expression(spec: &str) -> Option<Color> {
        let mut parts = spec.split('!').map(str::trim);
        let mut color = Color::named(parts.next()?)?;
        while let Some(pct) = parts.next() {
            let pct: f32 = pct.parse().ok()?;
            let other = match parts.next() {
                Some(name) => Color::named(name)?,
                None => Color::WHITE,
            };
            color = color.mix(other, pct);
        }
        Some(color)
    }
}

// =============================================================================
// FormatSettings
// =============================================================================

/// Character formatting of a text run.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSettings {
    pub font_family: CompactString,
    pub font_size: f32,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub smallcaps: bool,
}

impl FormatSettings {
    /// Default formatting at the given size.
    pub fn new(font_size: f32) -> Self {
        Self {
            font_family: CompactString::const_new(DEFAULT_FONT),
            font_size,
            color: Color::BLACK,
            bold: false,
            italic: false,
            underline: false,
            smallcaps: false,
        }
    }

    /// Check if the monospace font is selected.
    pub fn is_monospace(&self) -> bool {
        self.font_family == MONOSPACE_FONT
    }
}

impl StableHash for FormatSettings {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        hasher
            .update_str(&self.font_family)
            .update_f32(self.font_size)
            .update(&[self.color.r, self.color.g, self.color.b])
            .update_bool(self.bold)
            .update_bool(self.italic)
            .update_bool(self.underline)
            .update_bool(self.smallcaps)
    }
}

// =============================================================================
// TextFormat
// =============================================================================

/// Stack of nested formatting scopes.
#[derive(Debug, Clone)]
pub struct TextFormat {
    base_font_size: f32,
    stack: SmallVec<[FormatSettings; 8]>,
    current: FormatSettings,
}

impl TextFormat {
    /// Create a stack rooted at `base_font_size` (target points).
    pub fn new(base_font_size: f32) -> Self {
        Self {
            base_font_size,
            stack: SmallVec::new(),
            current: FormatSettings::new(base_font_size),
        }
    }

    /// Current formatting.
    pub fn current(&self) -> &FormatSettings {
        &self.current
    }

    /// Base font size.
    pub fn base_font_size(&self) -> f32 {
        self.base_font_size
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Open a scope for a style node.
    ///
    /// The scope is always opened so that [`leave`](Self::leave) stays
    /// balanced; the node's change is applied only when `apply` is set
    /// (style overlays gate the style, not the text).
    pub fn enter(&mut self, node: &Node, apply: bool) {
        self.stack.push(self.current.clone());
        if apply {
            self.modify(node);
        }
    }

    /// Close the innermost scope.
    pub fn leave(&mut self) {
        match self.stack.pop() {
            Some(saved) => self.current = saved,
            None => log::warn!("unbalanced format scope"),
        }
    }

    fn modify(&mut self, node: &Node) {
        let settings = &mut self.current;
        match &node.kind {
            NodeKind::Bold => settings.bold = true,
            NodeKind::Italic => settings.italic = true,
            NodeKind::Underline => settings.underline = true,
            NodeKind::SmallCaps => settings.smallcaps = true,
            NodeKind::Typewriter => settings.font_family = CompactString::const_new(MONOSPACE_FONT),
            NodeKind::Alert => settings.color = Color::ALERT,
            NodeKind::Color => {
                let spec = node.content().unwrap_or_default();
                match Color::parse(&node.params, spec) {
                    Some(color) => settings.color = color,
                    None => log::debug!("unknown color [{}]{{{spec}}}", node.params),
                }
            }
            NodeKind::Size(size) => settings.font_size = self.base_font_size * size.factor(),
            _ => {}
        }
    }
}
