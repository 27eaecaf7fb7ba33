//! Body walker.
//!
//! Walks the content of a slide in document order on an explicit stack.
//! Strings collect into a lazily opened text shape; lists, tables, images
//! and the title page close it and hand their node to a dedicated builder.
//! Every finished shape goes through the [`FlowLayout`].
//!
//! A `\pause` the current pass has not reached yet ends the walk. Nothing is
//! carried over: the next pass replays the slide from its first node.

use std::borrow::Cow;

use crate::error::CompositeResult;
use crate::format::TextFormat;
use crate::node::{Node, NodeKind};
use crate::records::TitlePageSettings;
use crate::shape::{ImageShape, Rect, Shape, ShapeKind, TextBody};
use crate::units::Params;

use super::context::{Deferred, Flow, Mode, WalkContext};
use super::inline::InlineWalker;
use super::list::build_description;
use super::pause::{PauseOutcome, PauseTracker};
use super::reshape::FlowLayout;
use super::table::{BlockOutcome, build_table};
use super::title::title_page;

/// Height to width ratio of images without an explicit size.
pub const DEFAULT_IMAGE_ASPECT: f32 = 3.0 / 4.0;

/// Result of a body walk.
#[derive(Debug)]
pub struct BodyOutcome<'n> {
    pub layout: FlowLayout,
    pub flow: Flow,
    /// Block content found in text contexts, to render after the walk
    pub deferred: Vec<Deferred<'n>>,
}

enum Task<'n> {
    Visit(&'n Node, Mode),
    /// Close a style scope
    PopFormat,
}

/// Walker over the body of one slide.
pub struct BodyWalker<'a, 'n> {
    ctx: &'a WalkContext<'a>,
    tracker: &'a mut PauseTracker,
    format: TextFormat,
    text: Option<TextBody>,
    layout: FlowLayout,
    deferred: Vec<Deferred<'n>>,
    title_page: Cow<'a, TitlePageSettings>,
}

impl<'a, 'n> BodyWalker<'a, 'n> {
    pub fn new(
        ctx: &'a WalkContext<'a>,
        tracker: &'a mut PauseTracker,
        title_page: &'a TitlePageSettings,
    ) -> Self {
        Self {
            ctx,
            tracker,
            format: TextFormat::new(ctx.settings.font_size()),
            text: None,
            layout: FlowLayout::new(ctx.area),
            deferred: Vec::new(),
            title_page: Cow::Borrowed(title_page),
        }
    }

    /// Continue below the shapes of an earlier walk.
    pub fn with_layout(mut self, layout: FlowLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Walk `nodes` in order.
    pub fn walk<I>(mut self, nodes: I) -> CompositeResult<BodyOutcome<'n>>
    where
        I: IntoIterator<Item = (&'n Node, Mode)>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut stack: Vec<Task<'n>> = nodes
            .into_iter()
            .rev()
            .map(|(node, mode)| Task::Visit(node, mode))
            .collect();

        while let Some(task) = stack.pop() {
            let flow = match task {
                Task::PopFormat => {
                    self.format.leave();
                    Flow::Completed
                }
                Task::Visit(node, mode) => self.visit(node, mode, &mut stack)?,
            };
            if flow == Flow::Paused {
                return Ok(self.finish(Flow::Paused));
            }
        }

        Ok(self.finish(Flow::Completed))
    }

    fn finish(mut self, flow: Flow) -> BodyOutcome<'n> {
        self.close_text();
        self.layout.flush();
        BodyOutcome {
            layout: self.layout,
            flow,
            deferred: self.deferred,
        }
    }

    fn visit(&mut self, node: &'n Node, mode: Mode, stack: &mut Vec<Task<'n>>) -> CompositeResult<Flow> {
        match &node.kind {
            NodeKind::Text => {
                if let Some(text) = node.content()
                    && mode.emits()
                {
                    let size = self.format.current().font_size;
                    self.text
                        .get_or_insert_with(|| TextBody::new(size))
                        .append(text, self.format.current(), mode.is_hidden());
                }
            }
            NodeKind::Paragraph => {
                if mode.emits() {
                    self.close_text();
                    self.layout.flush();
                }
            }
            NodeKind::Pause => {
                if self.tracker.pause() == PauseOutcome::Stop {
                    return Ok(Flow::Paused);
                }
            }
            NodeKind::Bold
            | NodeKind::Italic
            | NodeKind::Underline
            | NodeKind::SmallCaps
            | NodeKind::Typewriter
            | NodeKind::Color
            | NodeKind::Alert
            | NodeKind::Size(_) => {
                let apply = self.tracker.reveal(&node.overlay);
                self.format.enter(node, apply);
                stack.push(Task::PopFormat);
                push_children(stack, node, mode);
            }
            NodeKind::Uncover | NodeKind::Visible | NodeKind::Only => {
                let mode = mode.gate(node, self.tracker);
                push_children(stack, node, mode);
            }
            NodeKind::BulletList | NodeKind::NumberedList => return Ok(self.list(node, mode)),
            NodeKind::DescriptionList => {
                self.close_text();
                let outcome = build_description(self.ctx, self.tracker, &self.format, node, mode)?;
                return Ok(self.place(outcome));
            }
            NodeKind::Tabular => {
                self.close_text();
                let outcome = build_table(self.ctx, self.tracker, &self.format, node, mode)?;
                return Ok(self.place(outcome));
            }
            NodeKind::Image => {
                self.close_text();
                if let Some(shape) = self.image(node, mode)? {
                    self.layout.push(shape);
                }
            }
            NodeKind::TitlePage => {
                self.close_text();
                let mode = mode.gate(node, self.tracker);
                let base = self.format.base_font_size();
                let (shape, flow) = title_page(&self.title_page, self.tracker, base, self.ctx.area.width, mode);
                if let Some(shape) = shape {
                    self.layout.place_block(shape.with_hidden(mode.is_hidden()));
                }
                return Ok(flow);
            }
            NodeKind::Title | NodeKind::Author | NodeKind::Date => {
                self.title_page.to_mut().apply(node);
            }
            NodeKind::Item => {
                log::warn!("item outside of a list");
                let mode = mode.gate(node, self.tracker);
                push_children(stack, node, mode);
            }
            NodeKind::MultiColumn => {
                log::warn!("multicolumn outside of a table");
                push_children(stack, node, mode);
            }
            NodeKind::TableColumn | NodeKind::TableRow | NodeKind::HLine | NodeKind::CLine => {
                log::warn!("{} outside of a table", node.kind);
            }
            NodeKind::FrameTitle
            | NodeKind::FrameSubtitle
            | NodeKind::Section
            | NodeKind::Subsection
            | NodeKind::Subsubsection
            | NodeKind::GraphicsPath
            | NodeKind::Path => log::debug!("skipping {} in slide body", node.kind),
            NodeKind::Document | NodeKind::Preamble | NodeKind::Body | NodeKind::Slide => {
                push_children(stack, node, mode);
            }
            NodeKind::Unrecognized(tag) => {
                log::warn!("unrecognized node {tag:?}, rendering its content");
                push_children(stack, node, mode);
            }
        }

        Ok(Flow::Completed)
    }

    /// Move the open text into a shape; whitespace-only text is dropped.
    fn close_text(&mut self) {
        let Some(body) = self.text.take() else {
            return;
        };
        if body.plain_text().trim().is_empty() {
            return;
        }
        self.layout.push(Shape::new(Rect::default(), ShapeKind::Text(body)));
    }

    fn list(&mut self, node: &'n Node, mode: Mode) -> Flow {
        self.close_text();
        let mut body = TextBody::new(self.format.current().font_size);
        let mut walker =
            InlineWalker::new(&mut *self.tracker, self.format.clone(), self.ctx.policy).with_native_lists();
        let flow = walker.walk(&mut body, std::slice::from_ref(node), mode);
        self.deferred.extend(walker.into_deferred());

        if !body.is_blank() {
            self.layout.push(Shape::new(Rect::default(), ShapeKind::Text(body)));
        }
        flow
    }

    fn place(&mut self, outcome: BlockOutcome<'n>) -> Flow {
        if let Some(shape) = outcome.shape {
            self.layout.push(shape);
        }
        self.deferred.extend(outcome.deferred);
        outcome.flow
    }

    /// Size and resolve an image node.
    ///
    /// Without a size the image takes a third of the content width at 4:3;
    /// it never gets wider than the content area.
    fn image(&mut self, node: &Node, mode: Mode) -> CompositeResult<Option<Shape>> {
        let mode = mode.gate(node, self.tracker);
        if !mode.emits() {
            return Ok(None);
        }

        let name = node.content().unwrap_or_default().trim();
        let path = self.ctx.resolver.resolve(name)?;

        let params = Params::parse(&node.params);
        let lengths = &self.ctx.lengths;
        let area = &self.ctx.area;
        let default_width = area.width / 3.0;
        let width = params.length("width").map(|l| l.to_points(lengths));
        let height = params.length("height").map(|l| l.to_points(lengths));

        let (mut w, mut h) = match (width, height) {
            (Some(w), Some(h)) if params.has("keepaspectratio") => {
                let fit = (w / default_width).min(h / (default_width * DEFAULT_IMAGE_ASPECT));
                (default_width * fit, default_width * DEFAULT_IMAGE_ASPECT * fit)
            }
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w * DEFAULT_IMAGE_ASPECT),
            (None, Some(h)) => (h / DEFAULT_IMAGE_ASPECT, h),
            (None, None) => (default_width, default_width * DEFAULT_IMAGE_ASPECT),
        };
        if let Some(scale) = params.number("scale")
            && scale > 0.0
        {
            w *= scale;
            h *= scale;
        }
        if w > area.width {
            h *= area.width / w;
            w = area.width;
        }

        let image = ImageShape {
            path,
            name: name.into(),
        };
        let shape = Shape::new(Rect::new(0.0, 0.0, w, h), ShapeKind::Image(image));
        Ok(Some(shape.with_hidden(mode.is_hidden())))
    }
}

fn push_children<'n>(stack: &mut Vec<Task<'n>>, node: &'n Node, mode: Mode) {
    stack.extend(node.children.iter().rev().map(|child| Task::Visit(child, mode)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::pause::PassState;
    use crate::error::CompositeError;
    use crate::resource::MemoryImageResolver;
    use crate::settings::Settings;

    const AREA: Rect = Rect::new(0.0, 0.0, 600.0, 400.0);

    fn walk(nodes: &[Node], state: PassState) -> CompositeResult<(Vec<Shape>, Flow, usize)> {
        let settings = Settings::default();
        let resolver = MemoryImageResolver::new().with_image("logo", "/img/logo.png");
        let ctx = WalkContext::new(&settings, &resolver, AREA);
        let mut tracker = PauseTracker::new(state);
        let title_page = TitlePageSettings::default();
        let outcome = BodyWalker::new(&ctx, &mut tracker, &title_page)
            .walk(nodes.iter().map(|n| (n, Mode::Visible)))?;
        Ok((outcome.layout.finish(), outcome.flow, tracker.max_pass()))
    }

    fn texts(shapes: &[Shape]) -> Vec<String> {
        shapes.iter().filter_map(Shape::text).map(TextBody::plain_text).collect()
    }

    #[test]
    fn test_hello_pause_world() {
        let nodes = [Node::text("Hello "), Node::new(NodeKind::Pause), Node::text("World")];

        let (shapes, flow, max) = walk(&nodes, PassState::FIRST).unwrap();
        assert_eq!(flow, Flow::Paused);
        assert_eq!(max, 2);
        assert_eq!(texts(&shapes), vec!["Hello "]);

        let (shapes, flow, _) = walk(&nodes, PassState { pass: 2, pause_counter: 1 }).unwrap();
        assert_eq!(flow, Flow::Completed);
        assert_eq!(texts(&shapes), vec!["Hello World"]);
    }

    #[test]
    fn test_paragraph_splits_shapes() {
        let nodes = [
            Node::text("one"),
            Node::new(NodeKind::Paragraph),
            Node::text("\ntwo"),
            Node::text("  "),
            Node::new(NodeKind::Paragraph),
            Node::text("   "),
        ];
        let (shapes, _, _) = walk(&nodes, PassState::FIRST).unwrap();
        assert_eq!(texts(&shapes), vec!["one", "two  "]);
        assert!(shapes[1].bounds.top >= shapes[0].bounds.bottom());
    }

    #[test]
    fn test_style_scope_is_popped() {
        let nodes = [
            Node::new(NodeKind::Bold).child(Node::text("a")),
            Node::text("b"),
        ];
        let (shapes, _, _) = walk(&nodes, PassState::FIRST).unwrap();
        let runs = &shapes[0].text().unwrap().paragraphs[0].runs;
        assert!(runs[0].format.bold);
        assert!(!runs[1].format.bold);
    }

    #[test]
    fn test_list_closes_text() {
        let nodes = [
            Node::text("intro"),
            Node::new(NodeKind::BulletList).child(Node::new(NodeKind::Item).child(Node::text("x"))),
            Node::text("outro"),
        ];
        let (shapes, _, _) = walk(&nodes, PassState::FIRST).unwrap();
        assert_eq!(texts(&shapes), vec!["intro", "x", "outro"]);
        assert!(shapes[1].text().unwrap().paragraphs[0].bullet.is_some());
    }

    #[test]
    fn test_image_sizes() {
        let image = |params: &str| Node::new(NodeKind::Image).with_content("logo").with_params(params);
        let (shapes, _, _) = walk(&[image("")], PassState::FIRST).unwrap();
        assert_eq!(shapes[0].bounds.width, 200.0);
        assert_eq!(shapes[0].bounds.height, 150.0);
        assert_eq!(shapes[0].kind.as_image().unwrap().path, std::path::PathBuf::from("/img/logo.png"));

        let (shapes, _, _) = walk(&[image("width=0.5\\textwidth")], PassState::FIRST).unwrap();
        assert_eq!(shapes[0].bounds.width, 300.0);

        let (shapes, _, _) = walk(&[image("width=2\\textwidth")], PassState::FIRST).unwrap();
        assert_eq!(shapes[0].bounds.width, 600.0);
        assert_eq!(shapes[0].bounds.height, 450.0);

        let (shapes, _, _) = walk(&[image("scale=0.5")], PassState::FIRST).unwrap();
        assert_eq!(shapes[0].bounds.width, 100.0);
    }

    #[test]
    fn test_missing_image_fails() {
        let nodes = [Node::new(NodeKind::Image).with_content("nowhere")];
        let err = walk(&nodes, PassState::FIRST).unwrap_err();
        assert!(matches!(err, CompositeError::ImageNotFound { .. }));

        // omitted images are not resolved
        let only = [Node::new(NodeKind::Only)
            .with_overlay("2")
            .child(Node::new(NodeKind::Image).with_content("nowhere"))];
        assert!(walk(&only, PassState::FIRST).is_ok());
    }

    #[test]
    fn test_title_nodes_override_title_page() {
        let nodes = [
            Node::new(NodeKind::Title).child(Node::text("Local")),
            Node::new(NodeKind::TitlePage),
        ];
        let (shapes, _, _) = walk(&nodes, PassState::FIRST).unwrap();
        let members = shapes[0].kind.as_group().unwrap();
        assert_eq!(texts(members), vec!["Local"]);
    }

    #[test_log::test]
    fn test_unrecognized_content_is_rendered() {
        let nodes = [Node::tagged("mystery").child(Node::text("kept"))];
        let (shapes, flow, _) = walk(&nodes, PassState::FIRST).unwrap();
        assert_eq!(flow, Flow::Completed);
        assert_eq!(texts(&shapes), vec!["kept"]);
    }
}
