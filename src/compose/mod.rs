//! Multi-pass compositing.
//!
//! A slide is rendered once per incremental reveal step ("pass"). Every pass
//! replays the whole slide from its first node with a [`PassState`]; the
//! walks report whether they stopped at an unconsumed `\pause` and how many
//! passes they have discovered so far. [`PassCompositor`] loops until a pass
//! runs to the end and the discovered count is reached.
//!
//! ```text
//! AwaitingPass ──render(title, body)──► emit pass
//!      ▲                                   │
//!      │  paused: pauses += 1              │ completed and pass ≥ max
//!      └──────────── pass += 1 ◄───────────┤
//!                                          ▼
//!                                        Done
//! ```
//!
//! # Example
//!
//! ```
//! use beamer_passes::compose::{PassCompositor, SlideJob};
//! use beamer_passes::node::{Node, NodeKind};
//! use beamer_passes::resource::MemoryImageResolver;
//! use beamer_passes::settings::Settings;
//!
//! let slide = Node::new(NodeKind::Slide)
//!     .child(Node::text("Hello "))
//!     .child(Node::new(NodeKind::Pause))
//!     .child(Node::text("World"));
//!
//! let settings = Settings::default();
//! let resolver = MemoryImageResolver::new();
//! let composed = PassCompositor::new(&settings, &resolver)
//!     .compose(&SlideJob::new(1, &slide))
//!     .unwrap();
//!
//! assert_eq!(composed.passes.len(), 2);
//! ```

pub mod context;
mod inline;
mod list;
pub mod pause;
mod reshape;
mod table;
pub mod tabular;
mod title;
mod walker;

pub use context::{Deferred, Flow, Mode, NestedPolicy, WalkContext};
pub use inline::{BULLET_SYMBOLS, InlineWalker};
pub use list::{TERM_RATIO, build_description};
pub use pause::{PassState, PauseOutcome, PauseTracker};
pub use reshape::FlowLayout;
pub use table::{BlockOutcome, build_table};
pub use tabular::{ColumnSpec, TabularSpec};
pub use title::{SUBTITLE_SIZE, TITLE_SIZE, TitleOutcome, frame_title, title_page};
pub use walker::{BodyOutcome, BodyWalker, DEFAULT_IMAGE_ASPECT};

use crate::error::{CompositeError, CompositeResult};
use crate::hash::{StableHash, StableHasher};
use crate::node::Node;
use crate::records::{FrameTitleRecord, TitlePageSettings};
use crate::resource::ImageResolver;
use crate::settings::{Settings, SlideOptions, VerticalAlign};
use crate::shape::{Rect, Shape};

// =============================================================================
// Output
// =============================================================================

/// Shapes of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    /// 1-based pass number
    pub number: usize,
    /// Pass count discovered up to this pass
    pub max_pass: usize,
    /// Frame title band
    pub title: Option<Shape>,
    /// Body shapes in placement order
    pub shapes: Vec<Shape>,
}

impl Pass {
    /// Title and body shapes in emission order.
    pub fn all_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.title.iter().chain(&self.shapes)
    }

    /// Check if nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.shapes.is_empty()
    }

    /// Deterministic digest of the rendered content.
    pub fn digest(&self) -> u64 {
        self.stable_hash(StableHasher::new()).finish()
    }
}

impl StableHash for Pass {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        let hasher = self.title.stable_hash(hasher.update_usize(self.number));
        self.shapes.as_slice().stable_hash(hasher)
    }
}

/// All passes of one slide.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedSlide {
    /// 1-based slide index
    pub index: usize,
    pub options: SlideOptions,
    pub passes: Vec<Pass>,
}

impl ComposedSlide {
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }
}

// =============================================================================
// Input
// =============================================================================

/// A slide with everything needed to composite it.
#[derive(Debug, Clone)]
pub struct SlideJob<'n> {
    /// 1-based slide index
    pub index: usize,
    pub node: &'n Node,
    pub frame_title: Option<FrameTitleRecord>,
    /// Title page values in effect for this slide
    pub title_page: TitlePageSettings,
    pub options: SlideOptions,
}

impl<'n> SlideJob<'n> {
    /// Create a job; the frame title comes from the slide's own
    /// `frametitle` children, if any.
    pub fn new(index: usize, node: &'n Node) -> Self {
        Self {
            index,
            node,
            frame_title: FrameTitleRecord::from_slide(node),
            title_page: TitlePageSettings::default(),
            options: SlideOptions::parse(&node.params),
        }
    }

    pub fn with_frame_title(mut self, record: FrameTitleRecord) -> Self {
        self.frame_title = Some(record);
        self
    }

    pub fn with_title_page(mut self, settings: TitlePageSettings) -> Self {
        self.title_page = settings;
        self
    }
}

// =============================================================================
// PassCompositor
// =============================================================================

/// Result of rendering one pass.
#[derive(Debug)]
struct PassOutcome {
    title: Option<Shape>,
    shapes: Vec<Shape>,
    paused: bool,
    max_pass: usize,
}

/// Runs the pass loop of a slide.
pub struct PassCompositor<'a> {
    settings: &'a Settings,
    resolver: &'a dyn ImageResolver,
}

impl<'a> PassCompositor<'a> {
    pub fn new(settings: &'a Settings, resolver: &'a dyn ImageResolver) -> Self {
        Self { settings, resolver }
    }

    /// Render every pass of a slide.
    ///
    /// Fails with [`CompositeError::PassLimit`] when the slide does not
    /// settle within [`Settings::max_passes`].
    pub fn compose(&self, job: &SlideJob<'_>) -> CompositeResult<ComposedSlide> {
        let mut state = PassState::FIRST;
        let mut max_pass = 1;
        let mut passes = Vec::new();

        loop {
            let outcome = self.render_pass(job, state)?;
            max_pass = max_pass.max(outcome.max_pass);
            log::debug!(
                "slide {} pass {} (pauses {}): {} shapes, max {}{}",
                job.index,
                state.pass,
                state.pause_counter,
                outcome.shapes.len(),
                max_pass,
                if outcome.paused { ", paused" } else { "" }
            );
            passes.push(Pass {
                number: state.pass,
                max_pass,
                title: outcome.title,
                shapes: outcome.shapes,
            });

            if !outcome.paused && state.pass >= max_pass {
                break;
            }
            if state.pass >= self.settings.max_passes {
                return Err(CompositeError::PassLimit {
                    slide: job.index,
                    limit: self.settings.max_passes,
                });
            }
            state.pass += 1;
            if outcome.paused {
                state.pause_counter += 1;
            }
        }

        let area = self.content_area(job);
        align_vertically(&mut passes, &area, job.options.align);
        Ok(ComposedSlide {
            index: job.index,
            options: job.options,
            passes,
        })
    }

    /// Render one pass: the frame title walk, then the body walk, then any
    /// deferred block content below the body.
    fn render_pass(&self, job: &SlideJob<'_>, state: PassState) -> CompositeResult<PassOutcome> {
        let mut paused = false;
        let mut max_pass = 1;

        let title = job.frame_title.as_ref().and_then(|record| {
            let outcome = frame_title(self.settings, record, state);
            paused |= outcome.flow == Flow::Paused;
            max_pass = max_pass.max(outcome.max_pass);
            outcome.shape
        });

        let ctx = WalkContext::new(self.settings, self.resolver, self.content_area(job));
        let mut tracker = PauseTracker::new(state);
        let body = BodyWalker::new(&ctx, &mut tracker, &job.title_page)
            .walk(job.node.children.iter().map(|n| (n, Mode::Visible)))?;
        paused |= body.flow == Flow::Paused;
        max_pass = max_pass.max(tracker.max_pass());

        let mut layout = body.layout;
        let mut pending = body.deferred;
        while !pending.is_empty() {
            log::trace!("slide {}: {} deferred blocks", job.index, pending.len());
            let mut side = PauseTracker::ignoring_pauses(state);
            let outcome = BodyWalker::new(&ctx, &mut side, &job.title_page)
                .with_layout(layout)
                .walk(pending.iter().map(|d| (d.node, d.mode)))?;
            max_pass = max_pass.max(side.max_pass());
            layout = outcome.layout;
            pending = outcome.deferred;
        }

        Ok(PassOutcome {
            title,
            shapes: layout.finish(),
            paused,
            max_pass,
        })
    }

    fn content_area(&self, job: &SlideJob<'_>) -> Rect {
        self.settings
            .geometry
            .content_area(self.settings.scale(), job.frame_title.is_some())
    }
}

/// Shift body shapes inside the content area.
///
/// The offset comes from the last pass, which shows the full content, so
/// shapes keep their position across passes. Content taller than the area
/// stays at the top.
fn align_vertically(passes: &mut [Pass], area: &Rect, align: VerticalAlign) {
    let Some(last) = passes.last() else {
        return;
    };
    let bottom = last
        .shapes
        .iter()
        .map(|s| s.bounds.bottom())
        .fold(area.top, f32::max);
    let free = area.bottom() - bottom;
    if free <= 0.0 {
        return;
    }
    let dy = match align {
        VerticalAlign::Top => return,
        VerticalAlign::Center => free / 2.0,
        VerticalAlign::Bottom => free,
    };

    for shape in passes.iter_mut().flat_map(|p| p.shapes.iter_mut()) {
        shape.offset_y(dy);
    }
}
