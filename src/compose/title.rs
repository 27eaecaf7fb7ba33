//! Frame titles and title pages.
//!
//! The frame title is a walk of its own: it runs before the body on every
//! pass with a separate pause tracker, and the compositor merges both
//! trackers' discoveries. The title page is a block of the body walk.

use crate::format::TextFormat;
use crate::node::Node;
use crate::records::{FrameTitleRecord, TitlePageSettings};
use crate::settings::Settings;
use crate::shape::{Align, Rect, Shape, ShapeKind, TextBody};

use super::context::{Flow, Mode, NestedPolicy};
use super::inline::InlineWalker;
use super::pause::{PassState, PauseTracker};

/// Frame title font size in Beamer points.
pub const TITLE_SIZE: f32 = 16.0;
/// Frame subtitle font size in Beamer points.
pub const SUBTITLE_SIZE: f32 = 8.0;

/// Title page parts: relative size of title, author and date.
const TITLE_PAGE_SCALE: [f32; 3] = [1.44, 1.0, 0.9];

/// Result of the frame title walk.
#[derive(Debug)]
pub struct TitleOutcome {
    pub shape: Option<Shape>,
    pub flow: Flow,
    pub max_pass: usize,
}

/// Render the frame title band for one pass.
pub fn frame_title(settings: &Settings, record: &FrameTitleRecord, state: PassState) -> TitleOutcome {
    let scale = settings.scale();
    let mut tracker = PauseTracker::new(state);
    let mut body = TextBody::new(TITLE_SIZE * scale);

    let parts = [
        (Some(record.title.as_slice()), &record.title_overlay, TITLE_SIZE),
        (record.subtitle.as_deref(), &record.subtitle_overlay, SUBTITLE_SIZE),
    ];

    let mut flow = Flow::Completed;
    for (index, (nodes, overlay, size)) in parts.into_iter().enumerate() {
        let Some(nodes) = nodes else {
            continue;
        };
        let mode = if tracker.reveal(overlay) { Mode::Visible } else { Mode::Hidden };
        if index > 0 {
            body.start_paragraph(None, 0, size * scale);
        }

        let mut walker = InlineWalker::new(&mut tracker, TextFormat::new(size * scale), NestedPolicy::AsText);
        if walker.walk(&mut body, nodes, mode) == Flow::Paused {
            flow = Flow::Paused;
            break;
        }
    }

    let shape = (!body.is_blank()).then(|| {
        Shape::new(settings.geometry.title_area(scale), ShapeKind::Text(body))
    });
    TitleOutcome {
        shape,
        flow,
        max_pass: tracker.max_pass(),
    }
}

/// Render the title page: title, author and date centred on top of each
/// other. Shares the body's pause tracker.
pub fn title_page(
    settings: &TitlePageSettings,
    tracker: &mut PauseTracker,
    base_size: f32,
    width: f32,
    mode: Mode,
) -> (Option<Shape>, Flow) {
    let parts: [Option<&[Node]>; 3] = [
        settings.title.as_deref(),
        settings.author.as_deref(),
        settings.date.as_deref(),
    ];

    let mut members = Vec::new();
    let mut top = 0.0;
    let mut flow = Flow::Completed;

    for (nodes, factor) in parts.into_iter().zip(TITLE_PAGE_SCALE) {
        let Some(nodes) = nodes else {
            continue;
        };
        let size = base_size * factor;
        let mut body = TextBody::new(size);
        body.set_align(Align::Center);

        let mut walker = InlineWalker::new(&mut *tracker, TextFormat::new(size), NestedPolicy::AsText);
        let result = walker.walk(&mut body, nodes, mode);

        if mode.emits() && !body.is_blank() {
            let mut shape = Shape::new(Rect::new(0.0, top, width, 0.0), ShapeKind::Text(body));
            shape.fit_height();
            // half a line between parts
            top = shape.bounds.bottom() + size * 0.5;
            members.push(shape);
        }
        if result == Flow::Paused {
            flow = Flow::Paused;
            break;
        }
    }

    let Some(first) = members.first() else {
        return (None, flow);
    };
    let bounds = members.iter().fold(first.bounds, |acc, s| acc.union(&s.bounds));
    (Some(Shape::new(bounds, ShapeKind::Group(members))), flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn test_frame_title_overlays() {
        let settings = Settings::default();
        let record = FrameTitleRecord::new(vec![Node::text("Title")])
            .with_subtitle(vec![Node::text("Sub")])
            .with_subtitle_overlay("2-");

        let outcome = frame_title(&settings, &record, PassState::FIRST);
        assert_eq!(outcome.flow, Flow::Completed);
        assert_eq!(outcome.max_pass, 2);

        let shape = outcome.shape.unwrap();
        assert_eq!(shape.bounds, settings.geometry.title_area(settings.scale()));
        let body = shape.text().unwrap();
        assert_eq!(body.plain_text(), "Title\nSub");
        assert_eq!(body.paragraphs[0].runs[0].format.font_size, 32.0);
        assert_eq!(body.paragraphs[1].runs[0].format.font_size, 16.0);
        assert!(!body.paragraphs[0].runs[0].hidden);
        assert!(body.paragraphs[1].runs[0].hidden);

        let outcome = frame_title(&settings, &record, PassState { pass: 2, pause_counter: 0 });
        assert!(!outcome.shape.unwrap().text().unwrap().is_hidden());
    }

    #[test]
    fn test_frame_title_pause() {
        let settings = Settings::default().with_adjust_size(false);
        let record = FrameTitleRecord::new(vec![
            Node::text("A"),
            Node::new(NodeKind::Pause),
            Node::text("B"),
        ]);
        let outcome = frame_title(&settings, &record, PassState::FIRST);
        assert_eq!(outcome.flow, Flow::Paused);
        assert_eq!(outcome.max_pass, 2);
        assert_eq!(outcome.shape.unwrap().text().unwrap().plain_text(), "A");
    }

    #[test]
    fn test_empty_title_has_no_shape() {
        let outcome = frame_title(&Settings::default(), &FrameTitleRecord::default(), PassState::FIRST);
        assert!(outcome.shape.is_none());
        assert_eq!(outcome.flow, Flow::Completed);
    }

    #[test]
    fn test_title_page_stack() {
        let settings = TitlePageSettings {
            title: Some(vec![Node::text("Deck")]),
            author: None,
            date: Some(vec![Node::text("today")]),
        };
        let mut tracker = PauseTracker::new(PassState::FIRST);
        let (shape, flow) = title_page(&settings, &mut tracker, 20.0, 400.0, Mode::Visible);
        assert_eq!(flow, Flow::Completed);

        let shape = shape.unwrap();
        let members = shape.kind.as_group().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].text().unwrap().paragraphs[0].align, Align::Center);
        assert!(members[1].bounds.top > members[0].bounds.bottom());
        assert_eq!(shape.bounds.bottom(), members[1].bounds.bottom());
    }
}
