//! beamer-passes - Multi-pass overlay compositor for Beamer-like slide trees
//!
//! ## Core Concepts
//!
//! **Passes**: a Beamer frame with `\pause` or overlay specifications
//! (`<2->`, `<1,3-4>`) reveals its content step by step. Output formats have
//! no such notion, so every step is rendered as a complete slide of its own.
//! Content not yet revealed is still laid out (hidden) so that revealed
//! content keeps its position from pass to pass.
//!
//! ## Modules
//! - `overlay`: Overlay set parsing and visibility
//! - `node`: Parsed document tree (`Node`, `NodeKind`, `Document`)
//! - `compose`: Pause tracking, body walks and the pass loop
//! - `shape`: Text, image, table and group shapes with layout metrics
//! - `sink`: Output contract and replay of composited slides
//! - `render`: Markup sink for debugging and tests
//! - `convert`: Whole-document conversion into a `Deck`
//!
//! ## Usage
//!
//! ```
//! use beamer_passes::prelude::*;
//! use std::sync::Arc;
//!
//! let body = Node::new(NodeKind::Body).child(
//!     Node::new(NodeKind::Slide)
//!         .child(Node::new(NodeKind::Uncover).with_overlay("2-").child(Node::text("later"))),
//! );
//! let doc = Document::from_parts(Node::new(NodeKind::Preamble), body);
//!
//! let deck = Converter::new()
//!     .with_resolver(Arc::new(MemoryImageResolver::new()))
//!     .convert(&doc)
//!     .unwrap();
//! assert_eq!(deck.slides[0].pass_count(), 2);
//! ```

// =============================================================================
// Core modules
// =============================================================================

/// Accessor generation macros
mod macros;

/// Error types
pub mod error;

/// Overlay specifications: `OverlaySet`, `Overlay`
pub mod overlay;

/// Node types: Document, Node, NodeKind, Payload
pub mod node;

/// Lengths and bracket parameters
pub mod units;

/// Character formats and the format stack
pub mod format;

/// Stable digests of composited output
pub mod hash;

/// Shapes, text bodies, tables and metrics
pub mod shape;

/// Compositor configuration
pub mod settings;

/// Frame titles, sections, title page and preamble values
pub mod records;

/// Image resolution
pub mod resource;

/// Multi-pass compositing
pub mod compose;

/// Output contract
pub mod sink;

/// Markup rendering
pub mod render;

/// Document conversion
pub mod convert;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Overlays
pub use overlay::{Overlay, OverlaySet};

// Node types
pub use node::{Children, Document, Node, NodeKind, Payload};

// Compositing
pub use compose::{ComposedSlide, Pass, PassCompositor, PassState, SlideJob};

// Shapes
pub use shape::{Rect, Shape, ShapeKind};

// Settings
pub use settings::{SaveFormat, Settings};

// Sinks
pub use render::{MarkupConfig, MarkupSink};
pub use sink::{ShapeSink, emit_slides};

// Conversion
pub use convert::{Converter, Deck, ProgressReporter};

// Error types
pub use error::{CompositeError, CompositeResult};

// =============================================================================
// Tests
// =============================================================================
