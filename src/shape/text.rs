//! Rich text bodies: paragraphs of formatted runs.
//!
//! A [`TextBody`] always holds at least one paragraph; text is appended to
//! the last one. [`TextBody::layout`] wraps the body at a given width using
//! the approximate metrics, and [`TextBody::split_off`] cuts it at a line
//! start, which is what the flow layout needs to move lines between shapes.

use compact_str::{CompactString, format_compact};

use crate::format::FormatSettings;
use crate::hash::{StableHash, StableHasher};

use super::metrics::{BULLET_INDENT_EM, LEVEL_INDENT_EM, glyph_width, line_height};

// =============================================================================
// Runs and paragraphs
// =============================================================================

/// Contiguous text with one format.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: CompactString,
    pub format: FormatSettings,
    /// Present for layout but rendered with zero opacity
    pub hidden: bool,
}

/// Bullet symbol or list number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletKind {
    Symbol(char),
    Number(u32),
}

impl BulletKind {
    /// Rendered label.
    pub fn label(self) -> CompactString {
        match self {
            BulletKind::Symbol(c) => CompactString::from(c.to_string()),
            BulletKind::Number(n) => format_compact!("{n}."),
        }
    }
}

/// Paragraph bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bullet {
    pub kind: BulletKind,
    pub hidden: bool,
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Paragraph of runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub bullet: Option<Bullet>,
    /// List nesting level (0 = outside lists)
    pub level: u8,
    pub align: Align,
    /// Font size used for empty lines
    pub size: f32,
}

impl Paragraph {
    /// Create an empty paragraph.
    pub fn new(size: f32) -> Self {
        Self {
            runs: Vec::new(),
            bullet: None,
            level: 0,
            align: Align::Left,
            size,
        }
    }

    /// Check if the paragraph has no text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    /// Concatenated text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Left indentation (level indent plus hanging bullet indent).
    pub fn indent(&self) -> f32 {
        let level = self.level as f32 * LEVEL_INDENT_EM * self.size;
        let bullet = if self.level > 0 || self.bullet.is_some() {
            BULLET_INDENT_EM * self.size
        } else {
            0.0
        };
        level + bullet
    }

    /// Append text, merging with the last run when the format matches.
    pub fn push_run(&mut self, text: &str, format: &FormatSettings, hidden: bool) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut()
            && last.hidden == hidden
            && &last.format == format
        {
            last.text.push_str(text);
            return;
        }
        self.runs.push(TextRun {
            text: CompactString::new(text),
            format: format.clone(),
            hidden,
        });
    }
}

// =============================================================================
// TextBody
// =============================================================================

/// Position of a character inside a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextPos {
    pub paragraph: usize,
    pub run: usize,
    /// Byte offset inside the run
    pub offset: usize,
}

/// One wrapped line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: TextPos,
    /// Used width including indentation, without trailing whitespace
    pub width: f32,
    pub height: f32,
}

/// Wrapped lines of a body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<Line>,
}

impl TextLayout {
    /// Total height.
    pub fn height(&self) -> f32 {
        self.lines.iter().map(|l| l.height).sum()
    }

    /// Widest line.
    pub fn max_width(&self) -> f32 {
        self.lines.iter().map(|l| l.width).fold(0.0, f32::max)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if there are no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Rich text content of a text shape or table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBody {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Copy)]
struct Word {
    start: TextPos,
    /// Width up to the last non-whitespace glyph
    core: f32,
    /// Width including trailing whitespace
    total: f32,
    size: f32,
}

impl TextBody {
    /// Create a body with one empty paragraph.
    pub fn new(size: f32) -> Self {
        Self {
            paragraphs: vec![Paragraph::new(size)],
        }
    }

    /// The paragraph receiving appended text.
    pub fn current(&mut self) -> &mut Paragraph {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::new(0.0));
        }
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    /// Check if nothing was written (no text, no bullets).
    pub fn is_blank(&self) -> bool {
        self.paragraphs
            .iter()
            .all(|p| p.is_empty() && p.bullet.is_none())
    }

    /// Check if every run is hidden.
    pub fn is_hidden(&self) -> bool {
        self.paragraphs
            .iter()
            .flat_map(|p| p.runs.iter())
            .all(|r| r.hidden)
    }

    /// Append text. Newlines start new paragraphs; a leading newline is
    /// dropped when the current paragraph is still empty.
    pub fn append(&mut self, text: &str, format: &FormatSettings, hidden: bool) {
        let text = if self.current().is_empty() {
            text.strip_prefix("\r\n")
                .or_else(|| text.strip_prefix('\n'))
                .unwrap_or(text)
        } else {
            text
        };

        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            self.current().push_run(first.trim_end_matches('\r'), format, hidden);
        }
        for piece in pieces {
            self.break_paragraph();
            self.current().push_run(piece.trim_end_matches('\r'), format, hidden);
        }
    }

    /// Start a new paragraph continuing the current list level.
    pub fn break_paragraph(&mut self) {
        let current = self.current();
        let mut next = Paragraph::new(current.size);
        next.level = current.level;
        next.align = current.align;
        self.paragraphs.push(next);
    }

    /// Start a paragraph with list formatting, reusing an untouched one.
    pub fn start_paragraph(&mut self, bullet: Option<Bullet>, level: u8, size: f32) {
        let current = self.current();
        if !(current.is_empty() && current.bullet.is_none()) {
            self.paragraphs.push(Paragraph::new(size));
        }
        let current = self.current();
        current.bullet = bullet;
        current.level = level;
        current.size = size;
    }

    /// Set the alignment of the current paragraph.
    pub fn set_align(&mut self, align: Align) {
        self.current().align = align;
    }

    /// Paragraph texts joined by newlines.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Width of the first word (without indentation), 0 if blank.
    pub fn first_word_width(&self) -> f32 {
        self.paragraphs
            .iter()
            .enumerate()
            .flat_map(|(pi, p)| Self::words(pi, p))
            .find(|w| w.core > 0.0)
            .map_or(0.0, |w| w.core)
    }

    /// Wrap the body at `width`.
    pub fn layout(&self, width: f32) -> TextLayout {
        let mut lines = Vec::new();

        for (pi, para) in self.paragraphs.iter().enumerate() {
            let indent = para.indent();
            let avail = (width - indent).max(0.0);
            let words = Self::words(pi, para);

            if words.is_empty() {
                lines.push(Line {
                    start: TextPos { paragraph: pi, run: 0, offset: 0 },
                    width: indent,
                    height: line_height(para.size),
                });
                continue;
            }

            let mut start = words[0].start;
            let mut total = 0.0_f32;
            let mut core = 0.0_f32;
            let mut size = 0.0_f32;
            let mut count = 0usize;

            for word in &words {
                if count > 0 && total + word.core > avail {
                    lines.push(Line {
                        start,
                        width: indent + core,
                        height: line_height(size),
                    });
                    start = word.start;
                    total = 0.0;
                    size = 0.0;
                    count = 0;
                }
                core = total + word.core;
                total += word.total;
                size = size.max(word.size);
                count += 1;
            }

            lines.push(Line {
                start,
                width: indent + core,
                height: line_height(size),
            });
        }

        TextLayout { lines }
    }

    /// Split the body at `pos`, keeping the head and returning the tail.
    ///
    /// A split inside a paragraph continues it in the tail without a bullet.
    pub fn split_off(&mut self, pos: TextPos) -> TextBody {
        if pos.paragraph >= self.paragraphs.len() {
            let size = self.paragraphs.last().map_or(0.0, |p| p.size);
            return TextBody::new(size);
        }

        if pos.run == 0 && pos.offset == 0 {
            let tail = self.paragraphs.split_off(pos.paragraph);
            if self.paragraphs.is_empty() {
                self.paragraphs.push(Paragraph::new(tail[0].size));
            }
            return TextBody { paragraphs: tail };
        }

        let rest = self.paragraphs.split_off(pos.paragraph + 1);
        let para = &mut self.paragraphs[pos.paragraph];
        let mut tail_runs = para.runs.split_off(pos.run.min(para.runs.len()));

        if pos.offset > 0 && !tail_runs.is_empty() {
            let first = &mut tail_runs[0];
            let offset = pos.offset.min(first.text.len());
            let head_text = CompactString::new(&first.text[..offset]);
            first.text = CompactString::new(&first.text[offset..]);
            para.runs.push(TextRun {
                text: head_text,
                format: first.format.clone(),
                hidden: first.hidden,
            });
        }

        let mut tail_para = Paragraph::new(para.size);
        tail_para.runs = tail_runs;
        tail_para.level = para.level;
        tail_para.align = para.align;

        let mut paragraphs = Vec::with_capacity(rest.len() + 1);
        paragraphs.push(tail_para);
        paragraphs.extend(rest);
        TextBody { paragraphs }
    }

    /// Mark every run and bullet hidden.
    pub fn hide(&mut self) {
        for para in &mut self.paragraphs {
            for run in &mut para.runs {
                run.hidden = true;
            }
            if let Some(bullet) = &mut para.bullet {
                bullet.hidden = true;
            }
        }
    }

    fn words(pi: usize, para: &Paragraph) -> Vec<Word> {
        let mut words = Vec::new();
        let mut current: Option<Word> = None;
        let mut trailing = false;

        for (ri, run) in para.runs.iter().enumerate() {
            let advance = glyph_width(&run.format);
            for (offset, ch) in run.text.char_indices() {
                let space = ch.is_whitespace();
                if current.is_none() || (trailing && !space) {
                    if let Some(word) = current.take() {
                        words.push(word);
                    }
                    current = Some(Word {
                        start: TextPos { paragraph: pi, run: ri, offset },
                        core: 0.0,
                        total: 0.0,
                        size: run.format.font_size,
                    });
                    trailing = false;
                }
                if let Some(word) = current.as_mut() {
                    word.total += advance;
                    if space {
                        trailing = true;
                    } else {
                        word.core = word.total;
                    }
                    word.size = word.size.max(run.format.font_size);
                }
            }
        }

        words.extend(current);
        words
    }
}

// =============================================================================
// Digest
// =============================================================================

impl StableHash for TextRun {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        self.format
            .stable_hash(hasher.update_str(&self.text))
            .update_bool(self.hidden)
    }
}

impl StableHash for Bullet {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        hasher.update_str(&self.kind.label()).update_bool(self.hidden)
    }
}

impl StableHash for Paragraph {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        let hasher = self.runs.as_slice().stable_hash(hasher);
        self.bullet
            .stable_hash(hasher)
            .update_usize(self.level as usize)
            .update_usize(self.align as usize)
            .update_f32(self.size)
    }
}

impl StableHash for TextBody {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        self.paragraphs.as_slice().stable_hash(hasher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt() -> FormatSettings {
        // 10pt glyph advance
        FormatSettings::new(20.0)
    }

    fn body(text: &str) -> TextBody {
        let mut body = TextBody::new(20.0);
        body.append(text, &fmt(), false);
        body
    }

    #[test]
    fn test_append_merges_runs() {
        let mut body = body("Hello ");
        body.append("World", &fmt(), false);
        assert_eq!(body.paragraphs.len(), 1);
        assert_eq!(body.paragraphs[0].runs.len(), 1);
        assert_eq!(body.plain_text(), "Hello World");

        body.append("!", &fmt(), true);
        assert_eq!(body.paragraphs[0].runs.len(), 2);
    }

    #[test]
    fn test_newlines_make_paragraphs() {
        let body = body("\nfirst\nsecond");
        assert_eq!(body.paragraphs.len(), 2);
        assert_eq!(body.plain_text(), "first\nsecond");
    }

    #[test]
    fn test_only_one_leading_blank_line_is_stripped() {
        let body = body("\n\nx");
        assert_eq!(body.paragraphs.len(), 2);
        assert_eq!(body.plain_text(), "\nx");
    }

    #[test]
    fn test_layout_wraps_words() {
        // "aaaa bbbb cccc" at 10pt per glyph: words are 40pt wide, 50 with space
        let body = body("aaaa bbbb cccc");
        let layout = body.layout(100.0);
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.lines[0].width, 90.0);
        assert_eq!(layout.lines[1].start, TextPos { paragraph: 0, run: 0, offset: 10 });
        assert_eq!(layout.lines[1].width, 40.0);
        assert!((layout.height() - 48.0).abs() < 1e-3);

        assert_eq!(body.layout(1000.0).len(), 1);
    }

    #[test]
    fn test_overlong_word_gets_its_own_line() {
        let body = body("aaaaaaaaaaaa b");
        let layout = body.layout(50.0);
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.lines[0].width, 120.0);
    }

    #[test]
    fn test_empty_paragraph_has_a_line() {
        let body = TextBody::new(20.0);
        let layout = body.layout(100.0);
        assert_eq!(layout.len(), 1);
        assert!(body.is_blank());
    }

    #[test]
    fn test_split_inside_paragraph() {
        let mut head = body("aaaa bbbb cccc");
        let layout = head.layout(100.0);
        let tail = head.split_off(layout.lines[1].start);
        assert_eq!(head.plain_text(), "aaaa bbbb ");
        assert_eq!(tail.plain_text(), "cccc");
        assert!(tail.paragraphs[0].bullet.is_none());
    }

    #[test]
    fn test_split_at_paragraph_start() {
        let mut head = body("one\ntwo");
        let tail = head.split_off(TextPos { paragraph: 1, run: 0, offset: 0 });
        assert_eq!(head.plain_text(), "one");
        assert_eq!(tail.plain_text(), "two");

        let mut all = body("x");
        let tail = all.split_off(TextPos::default());
        assert!(all.is_blank());
        assert_eq!(tail.plain_text(), "x");
    }

    #[test]
    fn test_start_paragraph_reuses_untouched() {
        let mut body = TextBody::new(20.0);
        let bullet = Bullet { kind: BulletKind::Symbol('•'), hidden: false };
        body.start_paragraph(Some(bullet), 1, 20.0);
        assert_eq!(body.paragraphs.len(), 1);
        body.append("A", &fmt(), false);
        body.start_paragraph(Some(bullet), 1, 20.0);
        assert_eq!(body.paragraphs.len(), 2);
        assert!(!body.is_blank());
    }

    #[test]
    fn test_first_word_width() {
        assert_eq!(body("  ab cd").first_word_width(), 20.0);
        assert_eq!(TextBody::new(20.0).first_word_width(), 0.0);
        assert_eq!(BulletKind::Number(3).label(), "3.");
    }
}
