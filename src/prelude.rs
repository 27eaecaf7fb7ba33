//! Prelude module for common imports.
//!
//! ```
//! use beamer_passes::prelude::*;
//! ```

// Overlays
pub use crate::overlay::{Overlay, OverlaySet};

// Node types
pub use crate::node::{Children, Document, FontSize, Node, NodeKind, Payload};

// Compositing
pub use crate::compose::{
    ComposedSlide, Flow, Mode, NestedPolicy, Pass, PassCompositor, PassState, PauseTracker, SlideJob,
};

// Shapes
pub use crate::shape::{Align, Paragraph, Rect, Shape, ShapeKind, TableShape, TextBody, TextRun};

// Settings and records
pub use crate::records::{FrameTitleRecord, FrameTitleTable, SectionLevel, SectionRecord, TitlePageSettings};
pub use crate::settings::{SaveFormat, Settings, SlideGeometry, SlideOptions, VerticalAlign};

// Formats
pub use crate::format::{Color, FormatSettings};

// Resources
pub use crate::resource::{FsImageResolver, ImageResolver, MemoryImageResolver};

// Hashing
pub use crate::hash::{StableHash, StableHasher};

// Sinks
pub use crate::render::{MarkupConfig, MarkupSink};
pub use crate::sink::{BorderSide, ShapeId, ShapeSink, SlideId, emit_slide, emit_slides};

// Conversion
pub use crate::convert::{Converter, Deck, DeckStats, ProgressReporter};

// Error
pub use crate::error::{CompositeError, CompositeResult};
