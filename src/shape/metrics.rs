//! Approximate text metrics.
//!
//! Layout runs without a font backend, so glyph advances are estimated from
//! the font size. The numbers are tuned for Calibri / Courier New and only
//! need to be deterministic, not exact.

use crate::format::FormatSettings;

/// Average advance of a proportional glyph, in em.
pub const GLYPH_WIDTH_EM: f32 = 0.5;
/// Advance of a monospace glyph, in em.
pub const MONO_GLYPH_WIDTH_EM: f32 = 0.6;
/// Extra width of bold text.
pub const BOLD_FACTOR: f32 = 1.08;
/// Line height as a multiple of the font size.
pub const LINE_SPACING: f32 = 1.2;
/// Indentation per list level, in em.
pub const LEVEL_INDENT_EM: f32 = 1.5;
/// Hanging indent reserved for a bullet, in em.
pub const BULLET_INDENT_EM: f32 = 1.2;
/// Horizontal gap between shapes placed side by side.
pub const SHAPE_GAP: f32 = 8.0;
/// Inner padding of a table cell (each side).
pub const CELL_PADDING: f32 = 4.0;

/// Advance of one glyph in this format.
#[inline]
pub fn glyph_width(format: &FormatSettings) -> f32 {
    let em = if format.is_monospace() {
        MONO_GLYPH_WIDTH_EM
    } else {
        GLYPH_WIDTH_EM
    };
    let bold = if format.bold { BOLD_FACTOR } else { 1.0 };
    format.font_size * em * bold
}

/// Width of a string in this format.
#[inline]
pub fn text_width(text: &str, format: &FormatSettings) -> f32 {
    text.chars().count() as f32 * glyph_width(format)
}

/// Line height for a font size.
#[inline]
pub fn line_height(font_size: f32) -> f32 {
    font_size * LINE_SPACING
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FormatSettings, MONOSPACE_FONT};

    #[test]
    fn test_widths() {
        let mut format = FormatSettings::new(20.0);
        assert_eq!(text_width("abcd", &format), 40.0);

        format.font_family = MONOSPACE_FONT.into();
        assert!((text_width("ab", &format) - 24.0).abs() < 1e-4);

        assert!((line_height(10.0) - 12.0).abs() < 1e-4);
    }
}
