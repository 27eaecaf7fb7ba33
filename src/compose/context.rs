//! State shared by the walkers of one pass.

use crate::node::{Node, NodeKind};
use crate::resource::ImageResolver;
use crate::settings::Settings;
use crate::shape::Rect;
use crate::units::LengthContext;

use super::pause::PauseTracker;

/// Visibility of content on the current pass.
///
/// Ordered from most to least visible; nesting keeps the strongest
/// restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Mode {
    #[default]
    Visible,
    /// Laid out but rendered with zero opacity
    Hidden,
    /// Walked for pauses and overlays, nothing emitted
    Omitted,
}

impl Mode {
    /// Check if runs and shapes should be marked hidden.
    #[inline]
    pub fn is_hidden(self) -> bool {
        self == Mode::Hidden
    }

    /// Check if content is emitted at all.
    #[inline]
    pub fn emits(self) -> bool {
        self != Mode::Omitted
    }

    /// Apply an overlay gate of a node to the inherited mode.
    ///
    /// `only` omits its content when not visible, everything else hides it.
    pub fn gate(self, node: &Node, tracker: &mut PauseTracker) -> Mode {
        if node.overlay.is_unrestricted() || tracker.reveal(&node.overlay) {
            return self;
        }
        let own = if node.is(&NodeKind::Only) {
            Mode::Omitted
        } else {
            Mode::Hidden
        };
        self.max(own)
    }
}

/// How a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Completed,
    Paused,
}

impl Flow {
    #[inline]
    pub fn is_completed(self) -> bool {
        self == Flow::Completed
    }
}

/// Treatment of block content (images, tables, lists) nested in text-only
/// contexts such as titles and table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedPolicy {
    /// Keep formatted text, overlays and pauses only
    AsText,
    /// Render after the main content, ignoring pauses
    Defer,
}

impl NestedPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.nested_as_text {
            NestedPolicy::AsText
        } else {
            NestedPolicy::Defer
        }
    }
}

/// Block content queued for rendering after the main walk.
#[derive(Debug, Clone, Copy)]
pub struct Deferred<'n> {
    pub node: &'n Node,
    pub mode: Mode,
}

/// Read-only inputs of a pass.
pub struct WalkContext<'a> {
    pub settings: &'a Settings,
    pub resolver: &'a dyn ImageResolver,
    /// Content area of the slide
    pub area: Rect,
    pub lengths: LengthContext,
    pub policy: NestedPolicy,
}

impl<'a> WalkContext<'a> {
    pub fn new(settings: &'a Settings, resolver: &'a dyn ImageResolver, area: Rect) -> Self {
        Self {
            settings,
            resolver,
            area,
            lengths: settings.length_context(&area),
            policy: NestedPolicy::from_settings(settings),
        }
    }

    /// Same inputs laid out in another area.
    pub fn with_area(&self, area: Rect) -> WalkContext<'a> {
        WalkContext::new(self.settings, self.resolver, area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::pause::PassState;

    #[test]
    fn test_gate_modes() {
        let mut tracker = PauseTracker::new(PassState::FIRST);
        let later = Node::new(NodeKind::Uncover).with_overlay("2-");
        let only = Node::new(NodeKind::Only).with_overlay("2-");
        let plain = Node::new(NodeKind::Uncover);

        assert_eq!(Mode::Visible.gate(&plain, &mut tracker), Mode::Visible);
        assert_eq!(Mode::Visible.gate(&later, &mut tracker), Mode::Hidden);
        assert_eq!(Mode::Visible.gate(&only, &mut tracker), Mode::Omitted);
        assert_eq!(Mode::Omitted.gate(&later, &mut tracker), Mode::Omitted);
        assert_eq!(tracker.max_pass(), 2);
    }
}
