//! Node kinds
//!
//! Closed vocabulary of node types produced by the upstream parser. Tags that
//! are not part of the vocabulary map to [`NodeKind::Unrecognized`] so that
//! omissions surface instead of being silently dropped.

use compact_str::CompactString;

/// Relative font size commands (`\tiny` … `\Huge`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontSize {
    Tiny,
    ScriptSize,
    FootnoteSize,
    Small,
    NormalSize,
    Large,
    Larger,
    Largest,
    Huge,
    Huger,
}

impl FontSize {
    /// Scale factor relative to the base font size.
    ///
    /// Factors follow the default LaTeX size ladder for an 11pt document.
    pub fn factor(self) -> f32 {
        match self {
            FontSize::Tiny => 1.0 / 2.0,
            FontSize::ScriptSize => 1.0 / 1.428_571_4,
            FontSize::FootnoteSize => 1.0 / 1.25,
            FontSize::Small => 1.0 / 1.111_111_1,
            FontSize::NormalSize => 1.0,
            FontSize::Large => 1.2,
            FontSize::Larger => 1.44,
            FontSize::Largest => 1.728,
            FontSize::Huge => 2.0736,
            FontSize::Huger => 2.48832,
        }
    }

    /// LaTeX command name.
    pub fn tag(self) -> &'static str {
        match self {
            FontSize::Tiny => "tiny",
            FontSize::ScriptSize => "scriptsize",
            FontSize::FootnoteSize => "footnotesize",
            FontSize::Small => "small",
            FontSize::NormalSize => "normalsize",
            FontSize::Large => "large",
            FontSize::Larger => "Large",
            FontSize::Largest => "LARGE",
            FontSize::Huge => "huge",
            FontSize::Huger => "Huge",
        }
    }
}

/// Type of a document node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // ─── structure ───
    Document,
    Preamble,
    Body,
    Slide,
    // ─── title page metadata ───
    Title,
    Author,
    Date,
    GraphicsPath,
    Path,
    // ─── section records ───
    Section,
    Subsection,
    Subsubsection,
    // ─── slide titles ───
    FrameTitle,
    FrameSubtitle,
    TitlePage,
    // ─── inline content ───
    Text,
    Paragraph,
    Pause,
    // ─── style scopes ───
    Bold,
    Italic,
    Underline,
    SmallCaps,
    Typewriter,
    Color,
    Alert,
    Size(FontSize),
    // ─── overlay-aware wrappers ───
    Uncover,
    Visible,
    Only,
    // ─── lists ───
    BulletList,
    NumberedList,
    DescriptionList,
    Item,
    // ─── floats ───
    Image,
    Tabular,
    TableColumn,
    TableRow,
    HLine,
    CLine,
    MultiColumn,
    /// Tag outside the known vocabulary
    Unrecognized(CompactString),
}

impl NodeKind {
    /// Map a parser tag to a node kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "document" => NodeKind::Document,
            "preambule" => NodeKind::Preamble,
            "body" => NodeKind::Body,
            "slide" => NodeKind::Slide,
            "title" => NodeKind::Title,
            "author" => NodeKind::Author,
            "date" => NodeKind::Date,
            "graphicspath" => NodeKind::GraphicsPath,
            "path" => NodeKind::Path,
            "section" => NodeKind::Section,
            "subsection" => NodeKind::Subsection,
            "subsubsection" => NodeKind::Subsubsection,
            "frametitle" => NodeKind::FrameTitle,
            "framesubtitle" => NodeKind::FrameSubtitle,
            "titlepage" | "maketitle" => NodeKind::TitlePage,
            "string" => NodeKind::Text,
            "paragraph" => NodeKind::Paragraph,
            "pause" => NodeKind::Pause,
            "bold" => NodeKind::Bold,
            "italic" => NodeKind::Italic,
            "underline" => NodeKind::Underline,
            "smallcaps" => NodeKind::SmallCaps,
            "typewriter" => NodeKind::Typewriter,
            "color" => NodeKind::Color,
            "alert" => NodeKind::Alert,
            "tiny" => NodeKind::Size(FontSize::Tiny),
            "scriptsize" => NodeKind::Size(FontSize::ScriptSize),
            "footnotesize" => NodeKind::Size(FontSize::FootnoteSize),
            "small" => NodeKind::Size(FontSize::Small),
            "normalsize" => NodeKind::Size(FontSize::NormalSize),
            "large" => NodeKind::Size(FontSize::Large),
            "Large" => NodeKind::Size(FontSize::Larger),
            "LARGE" => NodeKind::Size(FontSize::Largest),
            "huge" => NodeKind::Size(FontSize::Huge),
            "Huge" => NodeKind::Size(FontSize::Huger),
            "uncover" => NodeKind::Uncover,
            "visible" => NodeKind::Visible,
            "only" => NodeKind::Only,
            "bulletlist" => NodeKind::BulletList,
            "numberedlist" => NodeKind::NumberedList,
            "descriptionlist" => NodeKind::DescriptionList,
            "item" => NodeKind::Item,
            "image" => NodeKind::Image,
            "tabular" | "table" => NodeKind::Tabular,
            "tablecolumn" => NodeKind::TableColumn,
            "tablerow" => NodeKind::TableRow,
            "hline" => NodeKind::HLine,
            "cline" => NodeKind::CLine,
            "multicolumn" => NodeKind::MultiColumn,
            other => NodeKind::Unrecognized(CompactString::new(other)),
        }
    }

    /// Canonical parser tag.
    pub fn tag(&self) -> &str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Preamble => "preambule",
            NodeKind::Body => "body",
            NodeKind::Slide => "slide",
            NodeKind::Title => "title",
            NodeKind::Author => "author",
            NodeKind::Date => "date",
            NodeKind::GraphicsPath => "graphicspath",
            NodeKind::Path => "path",
            NodeKind::Section => "section",
            NodeKind::Subsection => "subsection",
            NodeKind::Subsubsection => "subsubsection",
            NodeKind::FrameTitle => "frametitle",
            NodeKind::FrameSubtitle => "framesubtitle",
            NodeKind::TitlePage => "titlepage",
            NodeKind::Text => "string",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Pause => "pause",
            NodeKind::Bold => "bold",
            NodeKind::Italic => "italic",
            NodeKind::Underline => "underline",
            NodeKind::SmallCaps => "smallcaps",
            NodeKind::Typewriter => "typewriter",
            NodeKind::Color => "color",
            NodeKind::Alert => "alert",
            NodeKind::Size(size) => size.tag(),
            NodeKind::Uncover => "uncover",
            NodeKind::Visible => "visible",
            NodeKind::Only => "only",
            NodeKind::BulletList => "bulletlist",
            NodeKind::NumberedList => "numberedlist",
            NodeKind::DescriptionList => "descriptionlist",
            NodeKind::Item => "item",
            NodeKind::Image => "image",
            NodeKind::Tabular => "tabular",
            NodeKind::TableColumn => "tablecolumn",
            NodeKind::TableRow => "tablerow",
            NodeKind::HLine => "hline",
            NodeKind::CLine => "cline",
            NodeKind::MultiColumn => "multicolumn",
            NodeKind::Unrecognized(tag) => tag,
        }
    }

    /// Style scope: pushes text formatting for its subtree.
    pub fn is_style(&self) -> bool {
        matches!(
            self,
            NodeKind::Bold
                | NodeKind::Italic
                | NodeKind::Underline
                | NodeKind::SmallCaps
                | NodeKind::Typewriter
                | NodeKind::Color
                | NodeKind::Alert
                | NodeKind::Size(_)
        )
    }

    /// List environment.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            NodeKind::BulletList | NodeKind::NumberedList | NodeKind::DescriptionList
        )
    }

    /// Block content that cannot live inside a text run.
    pub fn is_block(&self) -> bool {
        self.is_list() || matches!(self, NodeKind::Image | NodeKind::Tabular | NodeKind::TitlePage)
    }

    /// Title-page metadata key.
    pub fn is_title_setting(&self) -> bool {
        matches!(self, NodeKind::Title | NodeKind::Author | NodeKind::Date)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for tag in [
            "preambule", "body", "slide", "string", "pause", "bold", "Large", "LARGE",
            "bulletlist", "item", "tabular", "multicolumn", "uncover",
        ] {
            assert_eq!(NodeKind::from_tag(tag).tag(), tag);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(NodeKind::from_tag("maketitle"), NodeKind::TitlePage);
        assert_eq!(NodeKind::from_tag("table"), NodeKind::Tabular);
    }

    #[test]
    fn test_unrecognized_is_explicit() {
        let kind = NodeKind::from_tag("footnote");
        assert_eq!(kind, NodeKind::Unrecognized("footnote".into()));
        assert_eq!(kind.to_string(), "footnote");
        assert!(!kind.is_style());
    }

    #[test]
    fn test_classification() {
        assert!(NodeKind::Size(FontSize::Tiny).is_style());
        assert!(NodeKind::DescriptionList.is_list());
        assert!(NodeKind::Image.is_block());
        assert!(!NodeKind::Text.is_block());
        assert!(FontSize::Huger.factor() > FontSize::Huge.factor());
    }
}
