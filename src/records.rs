//! Per-document records collected outside the slides.
//!
//! - [`FrameTitleRecord`]: frame title and subtitle of one slide
//! - [`SectionRecord`]: section headings and the slide they precede
//! - [`TitlePageSettings`] / [`PreambleSettings`]: title page metadata and
//!   image search paths

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::error::{CompositeError, CompositeResult};
use crate::node::{Node, NodeKind};
use crate::overlay::Overlay;
use crate::units::Length;

// =============================================================================
// FrameTitleRecord
// =============================================================================

/// Frame title of one slide.
#[derive(Debug, Clone, Default)]
pub struct FrameTitleRecord {
    pub title: Vec<Node>,
    pub title_overlay: Overlay,
    pub subtitle: Option<Vec<Node>>,
    pub subtitle_overlay: Overlay,
}

/// Frame titles keyed by 1-based slide index.
pub type FrameTitleTable = FxHashMap<usize, FrameTitleRecord>;

impl FrameTitleRecord {
    /// Create a record with a title.
    pub fn new(title: Vec<Node>) -> Self {
        Self {
            title,
            ..Self::default()
        }
    }

    pub fn with_title_overlay(mut self, spec: &str) -> Self {
        self.title_overlay = Overlay::new(spec);
        self
    }

    pub fn with_subtitle(mut self, subtitle: Vec<Node>) -> Self {
        self.subtitle = Some(subtitle);
        self
    }

    pub fn with_subtitle_overlay(mut self, spec: &str) -> Self {
        self.subtitle_overlay = Overlay::new(spec);
        self
    }

    /// Build a record from `frametitle` / `framesubtitle` children of a slide.
    pub fn from_slide(slide: &Node) -> Option<Self> {
        let title = slide.first_child(&NodeKind::FrameTitle);
        let subtitle = slide.first_child(&NodeKind::FrameSubtitle);
        if title.is_none() && subtitle.is_none() {
            return None;
        }

        let mut record = Self::default();
        if let Some(title) = title {
            record.title = title.children.clone();
            record.title_overlay = title.overlay.clone();
        }
        if let Some(subtitle) = subtitle {
            record.subtitle = Some(subtitle.children.clone());
            record.subtitle_overlay = subtitle.overlay.clone();
        }
        Some(record)
    }
}

// =============================================================================
// SectionRecord
// =============================================================================

/// Section level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionLevel {
    Section,
    Subsection,
    Subsubsection,
}

impl SectionLevel {
    /// Level of a section node.
    pub fn of(kind: &NodeKind) -> Option<SectionLevel> {
        match kind {
            NodeKind::Section => Some(SectionLevel::Section),
            NodeKind::Subsection => Some(SectionLevel::Subsection),
            NodeKind::Subsubsection => Some(SectionLevel::Subsubsection),
            _ => None,
        }
    }
}

/// Section heading preceding a slide.
#[derive(Debug, Clone)]
pub struct SectionRecord {
    /// 1-based index of the next slide
    pub slide: usize,
    pub level: SectionLevel,
    pub content: Vec<Node>,
}

impl SectionRecord {
    /// Heading text.
    pub fn title(&self) -> String {
        self.content.iter().map(Node::text_content).collect()
    }
}

// =============================================================================
// Title page and preamble
// =============================================================================

/// Title page metadata (`\title`, `\author`, `\date`).
#[derive(Debug, Clone, Default)]
pub struct TitlePageSettings {
    pub title: Option<Vec<Node>>,
    pub author: Option<Vec<Node>>,
    pub date: Option<Vec<Node>>,
}

impl TitlePageSettings {
    /// Store the content of a title setting node; returns false for other kinds.
    pub fn apply(&mut self, node: &Node) -> bool {
        let slot = match node.kind {
            NodeKind::Title => &mut self.title,
            NodeKind::Author => &mut self.author,
            NodeKind::Date => &mut self.date,
            _ => return false,
        };
        *slot = Some(node.children.clone());
        true
    }

    /// Check if nothing is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.date.is_none()
    }
}

/// Values read from the `preambule` node.
#[derive(Debug, Clone, Default)]
pub struct PreambleSettings {
    pub title_page: TitlePageSettings,
    /// Image search paths in declaration order, without duplicates
    pub graphics_paths: Vec<PathBuf>,
    /// Base font size from the class options (`11pt`), in Beamer points
    pub font_size: Option<f32>,
}

impl PreambleSettings {
    /// Parse a preamble node.
    pub fn parse(preamble: &Node) -> CompositeResult<Self> {
        if !preamble.is(&NodeKind::Preamble) {
            return Err(CompositeError::MissingNode("preambule"));
        }

        let mut settings = Self {
            font_size: preamble
                .params
                .split(',')
                .filter_map(Length::parse)
                .find_map(|length| match length {
                    Length::Points(pt) if pt > 0.0 => Some(pt),
                    _ => None,
                }),
            ..Self::default()
        };

        for node in &preamble.children {
            if settings.title_page.apply(node) {
                continue;
            }
            if node.is(&NodeKind::GraphicsPath) {
                for path in node.children.iter().filter(|c| c.is(&NodeKind::Path)) {
                    let Some(path) = path.content().filter(|p| !p.is_empty()) else {
                        continue;
                    };
                    let path = PathBuf::from(path);
                    if !settings.graphics_paths.contains(&path) {
                        settings.graphics_paths.push(path);
                    }
                }
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_title_from_slide() {
        let slide = Node::new(NodeKind::Slide)
            .child(Node::new(NodeKind::FrameTitle).with_overlay("2-").child("Intro".into()))
            .child(Node::text("body"));
        let record = FrameTitleRecord::from_slide(&slide).unwrap();
        assert_eq!(record.title.len(), 1);
        assert!(!record.title_overlay.is_visible(1));
        assert!(record.subtitle.is_none());

        assert!(FrameTitleRecord::from_slide(&Node::new(NodeKind::Slide)).is_none());
    }

    #[test]
    fn test_section_title() {
        let record = SectionRecord {
            slide: 1,
            level: SectionLevel::Section,
            content: vec![Node::text("Intro"), Node::new(NodeKind::Bold).child(" part".into())],
        };
        assert_eq!(record.title(), "Intro part");
        assert_eq!(SectionLevel::of(&NodeKind::Subsection), Some(SectionLevel::Subsection));
        assert_eq!(SectionLevel::of(&NodeKind::Slide), None);
    }

    #[test]
    fn test_preamble_parsing() {
        let preamble = Node::new(NodeKind::Preamble)
            .with_params("12pt,t")
            .child(Node::new(NodeKind::Title).child("Talk".into()))
            .child(
                Node::new(NodeKind::GraphicsPath)
                    .child(Node::new(NodeKind::Path).with_content("img/"))
                    .child(Node::new(NodeKind::Path).with_content(""))
                    .child(Node::new(NodeKind::Path).with_content("img/")),
            );
        let settings = PreambleSettings::parse(&preamble).unwrap();
        assert!(settings.title_page.title.is_some());
        assert!(settings.title_page.author.is_none());
        assert_eq!(settings.graphics_paths, vec![PathBuf::from("img/")]);
        assert_eq!(settings.font_size, Some(12.0));
    }

    #[test]
    fn test_preamble_rejects_other_nodes() {
        assert!(matches!(
            PreambleSettings::parse(&Node::new(NodeKind::Body)),
            Err(CompositeError::MissingNode("preambule"))
        ));
    }
}
