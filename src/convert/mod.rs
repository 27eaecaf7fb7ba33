//! Document conversion.
//!
//! [`Converter`] ties the pipeline together: it reads the preamble, scans the
//! body for title overrides, section headings and slides, composites every
//! slide and returns a [`Deck`]. Emitting the deck into a sink is a separate
//! step ([`Deck::emit_into`]) so one composition can feed several sinks.
//!
//! # Example
//!
//! ```
//! use beamer_passes::convert::Converter;
//! use beamer_passes::node::{Document, Node, NodeKind};
//! use beamer_passes::render::MarkupSink;
//! use beamer_passes::resource::MemoryImageResolver;
//! use std::sync::Arc;
//!
//! let body = Node::new(NodeKind::Body).child(
//!     Node::new(NodeKind::Slide)
//!         .child(Node::text("Hello"))
//!         .child(Node::new(NodeKind::Pause))
//!         .child(Node::text(" World")),
//! );
//! let doc = Document::from_parts(Node::new(NodeKind::Preamble), body);
//!
//! let mut sink = MarkupSink::new();
//! let deck = Converter::new()
//!     .with_resolver(Arc::new(MemoryImageResolver::new()))
//!     .convert_into(&doc, &mut sink)
//!     .unwrap();
//!
//! assert_eq!(deck.stats().passes, 2);
//! assert_eq!(sink.slide_count(), 2);
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::compose::{ComposedSlide, PassCompositor, SlideJob};
use crate::error::{CompositeError, CompositeResult};
use crate::node::{Document, NodeKind};
use crate::records::{FrameTitleTable, PreambleSettings, SectionLevel, SectionRecord};
use crate::resource::{FsImageResolver, ImageResolver};
use crate::settings::{SaveFormat, Settings};
use crate::sink::{ShapeSink, emit_slides};

/// Progress reported once the document has been prepared.
pub const BASIC_PROGRESS: u8 = 20;

// =============================================================================
// Progress
// =============================================================================

/// Receives conversion progress in percent.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, percent: u8);
}

impl<F> ProgressReporter for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        self(percent)
    }
}

/// Percent after `done` of `total` slides.
fn slide_progress(done: usize, total: usize) -> u8 {
    let span = usize::from(100 - BASIC_PROGRESS);
    let step = span * done / total.max(1);
    (usize::from(BASIC_PROGRESS) + step).min(100) as u8
}

// =============================================================================
// Deck
// =============================================================================

/// Composited presentation.
#[derive(Debug, Clone)]
pub struct Deck {
    pub slides: Vec<ComposedSlide>,
    pub sections: Vec<SectionRecord>,
    pub save_as: SaveFormat,
}

/// Deck summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeckStats {
    pub slides: usize,
    pub passes: usize,
    pub shapes: usize,
    pub sections: usize,
}

impl Deck {
    pub fn stats(&self) -> DeckStats {
        let passes = self.slides.iter().flat_map(|slide| &slide.passes);
        DeckStats {
            slides: self.slides.len(),
            passes: self.slides.iter().map(ComposedSlide::pass_count).sum(),
            shapes: passes.map(|pass| pass.all_shapes().count()).sum(),
            sections: self.sections.len(),
        }
    }

    /// Replay every pass into `sink` and finish it with the deck's format.
    pub fn emit_into<S>(&self, sink: &mut S) -> CompositeResult<()>
    where
        S: ShapeSink + ?Sized,
    {
        emit_slides(&self.slides, self.save_as, sink)
    }
}

// =============================================================================
// Converter
// =============================================================================

/// Converts a parsed document into a deck.
pub struct Converter {
    settings: Settings,
    frame_titles: FrameTitleTable,
    resolver: Option<Arc<dyn ImageResolver>>,
    progress: Option<Box<dyn ProgressReporter>>,
    base_dir: PathBuf,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            frame_titles: FrameTitleTable::default(),
            resolver: None,
            progress: None,
            base_dir: PathBuf::from("."),
        }
    }
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Frame titles keyed by 1-based slide index. They take precedence over
    /// `frametitle` nodes inside the slides.
    pub fn with_frame_titles(mut self, titles: FrameTitleTable) -> Self {
        self.frame_titles = titles;
        self
    }

    /// Replace the file system resolver built from the preamble.
    pub fn with_resolver(mut self, resolver: Arc<dyn ImageResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_progress(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.progress = Some(Box::new(reporter));
        self
    }

    /// Directory relative image names and graphics paths resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn report(&self, percent: u8) {
        if let Some(progress) = &self.progress {
            progress.report(percent);
        }
    }

    /// Composite every slide of `doc`.
    pub fn convert(&self, doc: &Document) -> CompositeResult<Deck> {
        let preamble = PreambleSettings::parse(doc.preamble()?)?;
        let body = doc.body()?;

        let mut settings = self.settings.clone();
        if let Some(size) = preamble.font_size {
            settings = settings.with_base_font_size(size);
        }

        let resolver: Arc<dyn ImageResolver> = match &self.resolver {
            Some(resolver) => Arc::clone(resolver),
            None => Arc::new(
                FsImageResolver::new(&self.base_dir).with_search_paths(preamble.graphics_paths.iter().cloned()),
            ),
        };

        let mut title_page = preamble.title_page;
        let mut sections = Vec::new();
        let mut jobs = Vec::new();

        for node in &body.children {
            if node.is(&NodeKind::Slide) {
                let index = jobs.len() + 1;
                let mut job = SlideJob::new(index, node).with_title_page(title_page.clone());
                if let Some(record) = self.frame_titles.get(&index) {
                    job = job.with_frame_title(record.clone());
                }
                jobs.push(job);
            } else if let Some(level) = SectionLevel::of(&node.kind) {
                sections.push(SectionRecord {
                    slide: jobs.len() + 1,
                    level,
                    content: node.children.clone(),
                });
            } else if !title_page.apply(node) {
                log::debug!("skipping {:?} between slides", node.kind);
            }
        }

        if jobs.is_empty() {
            return Err(CompositeError::EmptyPresentation);
        }
        self.report(BASIC_PROGRESS);

        let compositor = PassCompositor::new(&settings, resolver.as_ref());
        let total = jobs.len();
        let done = AtomicUsize::new(0);
        let compose = |job: &SlideJob<'_>| {
            let slide = compositor.compose(job).map_err(|err| err.in_slide(job.index));
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            self.report(slide_progress(finished, total));
            slide
        };

        #[cfg(feature = "parallel")]
        let slides = {
            use rayon::prelude::*;
            jobs.par_iter().map(compose).collect::<CompositeResult<Vec<_>>>()?
        };
        #[cfg(not(feature = "parallel"))]
        let slides = jobs.iter().map(compose).collect::<CompositeResult<Vec<_>>>()?;

        let deck = Deck {
            slides,
            sections,
            save_as: settings.save_as,
        };
        let stats = deck.stats();
        log::info!(
            "composited {} slides into {} passes ({} shapes, {} sections)",
            stats.slides,
            stats.passes,
            stats.shapes,
            stats.sections
        );
        Ok(deck)
    }

    /// Convert and emit into `sink`.
    pub fn convert_into<S>(&self, doc: &Document, sink: &mut S) -> CompositeResult<Deck>
    where
        S: ShapeSink + ?Sized,
    {
        let deck = self.convert(doc)?;
        deck.emit_into(sink)?;
        Ok(deck)
    }
}

// =============================================================================
// Tests
// =============================================================================
