//! Lengths and key/value parameters.
//!
//! Beamer lengths (`3cm`, `0.5\textwidth`, `12pt`) resolve to points on the
//! target slide. With "adjust size" enabled every absolute length is doubled,
//! the target slide being twice the size of the Beamer page.

use compact_str::CompactString;
use smallvec::SmallVec;

/// Points per inch.
pub const PT_PER_IN: f32 = 72.27;
/// Points per centimetre.
pub const PT_PER_CM: f32 = 28.4;
/// Points per millimetre.
pub const PT_PER_MM: f32 = 2.84;

/// Reference dimension for relative lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    TextWidth,
    TextHeight,
}

/// Parsed length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Absolute length in Beamer points
    Points(f32),
    /// Length in em (multiples of the base font size)
    Em(f32),
    /// Fraction of a reference dimension
    Relative(f32, Reference),
}

/// Dimensions needed to resolve a [`Length`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    /// Factor applied to absolute lengths (2.0 with "adjust size")
    pub scale: f32,
    /// Base font size in target points
    pub em: f32,
    /// Content area width in target points
    pub text_width: f32,
    /// Content area height in target points
    pub text_height: f32,
}

impl Length {
    /// Parse a length. Returns `None` for malformed input.
    pub fn parse(input: &str) -> Option<Length> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let split = input
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(input.len());
        let (number, unit) = input.split_at(split);
        let unit = unit.trim();

        let value = if number.is_empty() {
            // bare `\textwidth`
            1.0
        } else {
            number.parse::<f32>().ok()?
        };

        match unit {
            "in" => Some(Length::Points(value * PT_PER_IN)),
            "cm" => Some(Length::Points(value * PT_PER_CM)),
            "mm" => Some(Length::Points(value * PT_PER_MM)),
            "pt" | "" if !number.is_empty() => Some(Length::Points(value)),
            "bp" => Some(Length::Points(value * PT_PER_IN / 72.0)),
            "em" => Some(Length::Em(value)),
            "\\textwidth" | "\\linewidth" | "\\columnwidth" | "\\paperwidth" => {
                Some(Length::Relative(value, Reference::TextWidth))
            }
            "\\textheight" | "\\paperheight" => Some(Length::Relative(value, Reference::TextHeight)),
            _ => None,
        }
    }

    /// Resolve to target points.
    pub fn to_points(self, ctx: &LengthContext) -> f32 {
        match self {
            Length::Points(pt) => pt * ctx.scale,
            Length::Em(em) => em * ctx.em,
            Length::Relative(f, Reference::TextWidth) => f * ctx.text_width,
            Length::Relative(f, Reference::TextHeight) => f * ctx.text_height,
        }
    }
}

// =============================================================================
// Key/value parameters
// =============================================================================

/// Parsed `key=value` list (`width=3cm, keepaspectratio`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: SmallVec<[(CompactString, CompactString); 4]>,
}

impl Params {
    /// Parse a comma separated list; keys without value map to an empty string.
    pub fn parse(input: &str) -> Self {
        let entries = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((k, v)) => (CompactString::new(k.trim()), CompactString::new(v.trim())),
                None => (CompactString::new(part), CompactString::default()),
            })
            .collect();
        Self { entries }
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check if a key (flag) is present.
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Get a length value.
    pub fn length(&self, key: &str) -> Option<Length> {
        self.get(key).and_then(Length::parse)
    }

    /// Get a numeric value.
    pub fn number(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(|v| v.parse().ok())
    }
}
