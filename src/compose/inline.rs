//! Text-only walker.
//!
//! Walks inline content (strings, style scopes, overlay wrappers, pauses and
//! lists) into a [`TextBody`]. It is used for lists, table cells,
//! description definitions, frame titles and the title page. Block content
//! nested in a text context follows the [`NestedPolicy`].
//!
//! The walk runs on an explicit stack: style scopes push a `Leave` task
//! before their children so formatting is restored when the subtree is done,
//! and a pause simply returns from the loop.

use smallvec::SmallVec;

use crate::format::TextFormat;
use crate::node::{Node, NodeKind};
use crate::shape::{Bullet, BulletKind, TextBody};

use super::context::{Deferred, Flow, Mode, NestedPolicy};
use super::pause::{PauseOutcome, PauseTracker};

/// Bullet symbols per nesting level.
pub const BULLET_SYMBOLS: [char; 3] = ['•', '–', '∗'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
    Description,
}

#[derive(Debug, Clone, Copy)]
struct ListFrame {
    kind: ListKind,
    counter: u32,
    level: u8,
}

enum Task<'n> {
    Visit(&'n Node, Mode),
    Leave(Scope),
}

enum Scope {
    Format,
    List,
}

/// Walker writing inline content into a text body.
pub struct InlineWalker<'w, 'n> {
    tracker: &'w mut PauseTracker,
    format: TextFormat,
    policy: NestedPolicy,
    native_lists: bool,
    deferred: Vec<Deferred<'n>>,
    lists: SmallVec<[ListFrame; 4]>,
    /// Next text continues a list item after a nested list
    continuation: bool,
    emitted: bool,
}

impl<'w, 'n> InlineWalker<'w, 'n> {
    /// Create a walker starting from `format`.
    pub fn new(tracker: &'w mut PauseTracker, format: TextFormat, policy: NestedPolicy) -> Self {
        Self {
            tracker,
            format,
            policy,
            native_lists: false,
            deferred: Vec::new(),
            lists: SmallVec::new(),
            continuation: false,
            emitted: false,
        }
    }

    /// Render bullet and numbered lists natively, regardless of the nested
    /// policy. Description lists still follow it.
    pub fn with_native_lists(mut self) -> Self {
        self.native_lists = true;
        self
    }

    /// The walk's pause tracker.
    pub fn tracker(&mut self) -> &mut PauseTracker {
        self.tracker
    }

    /// Current formatting.
    pub fn format(&self) -> &TextFormat {
        &self.format
    }

    /// Check and reset whether text was emitted since the last call.
    pub fn take_emitted(&mut self) -> bool {
        std::mem::take(&mut self.emitted)
    }

    /// Block content queued by the [`NestedPolicy::Defer`] policy.
    pub fn into_deferred(self) -> Vec<Deferred<'n>> {
        self.deferred
    }

    /// Walk `nodes` into `body`.
    pub fn walk(&mut self, body: &mut TextBody, nodes: &'n [Node], mode: Mode) -> Flow {
        let mut stack: Vec<Task<'n>> = nodes.iter().rev().map(|n| Task::Visit(n, mode)).collect();

        while let Some(task) = stack.pop() {
            match task {
                Task::Leave(Scope::Format) => self.format.leave(),
                Task::Leave(Scope::List) => {
                    self.lists.pop();
                    self.continuation = true;
                }
                Task::Visit(node, mode) => {
                    if self.visit(body, node, mode, &mut stack) == Flow::Paused {
                        return Flow::Paused;
                    }
                }
            }
        }

        Flow::Completed
    }

    fn visit(
        &mut self,
        body: &mut TextBody,
        node: &'n Node,
        mode: Mode,
        stack: &mut Vec<Task<'n>>,
    ) -> Flow {
        match &node.kind {
            NodeKind::Text => {
                if let Some(text) = node.content() {
                    self.append(body, text, mode);
                }
            }
            NodeKind::Paragraph | NodeKind::TableRow => {
                if mode.emits() {
                    body.break_paragraph();
                }
            }
            NodeKind::Pause => {
                if self.tracker.pause() == PauseOutcome::Stop {
                    return Flow::Paused;
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
                stack.push(Task::Leave(Scope::Format));
                push_children(stack, node, mode);
            }
            NodeKind::Uncover | NodeKind::Visible | NodeKind::Only | NodeKind::MultiColumn => {
                let mode = mode.gate(node, self.tracker);
                push_children(stack, node, mode);
            }
            NodeKind::BulletList | NodeKind::NumberedList | NodeKind::DescriptionList => {
                // description lists are tables: only flattened under the text policy
                let block = !self.native_lists || node.is(&NodeKind::DescriptionList);
                if block && self.policy == NestedPolicy::Defer {
                    self.defer(node, mode);
                    return Flow::Completed;
                }
                let mode = mode.gate(node, self.tracker);
                let kind = match node.kind {
                    NodeKind::BulletList => ListKind::Bullet,
                    NodeKind::NumberedList => ListKind::Numbered,
                    _ => ListKind::Description,
                };
                self.open_list(body, kind);
                stack.push(Task::Leave(Scope::List));
                push_children(stack, node, mode);
            }
            NodeKind::Item => {
                let mode = mode.gate(node, self.tracker);
                self.start_item(body, node, mode);
                push_children(stack, node, mode);
            }
            NodeKind::Image | NodeKind::Tabular | NodeKind::TitlePage => {
                self.nested_block(body, node, mode, stack);
            }
            NodeKind::TableColumn => self.append(body, " ", mode),
            NodeKind::HLine | NodeKind::CLine => {}
            NodeKind::Title
            | NodeKind::Author
            | NodeKind::Date
            | NodeKind::FrameTitle
            | NodeKind::FrameSubtitle
            | NodeKind::Section
            | NodeKind::Subsection
            | NodeKind::Subsubsection
            | NodeKind::GraphicsPath
            | NodeKind::Path => log::debug!("skipping {} in text", node.kind),
            NodeKind::Document | NodeKind::Preamble | NodeKind::Body | NodeKind::Slide => {
                push_children(stack, node, mode);
            }
            NodeKind::Unrecognized(tag) => {
                log::warn!("unrecognized node {tag:?}, rendering its content");
                push_children(stack, node, mode);
            }
        }

        Flow::Completed
    }

    fn append(&mut self, body: &mut TextBody, text: &str, mode: Mode) {
        if !mode.emits() || text.is_empty() {
            return;
        }
        if self.continuation {
            let size = self.format.current().font_size;
            body.start_paragraph(None, self.level(), size);
            self.continuation = false;
        }
        body.append(text, self.format.current(), mode.is_hidden());
        self.emitted |= !text.trim().is_empty();
    }

    fn level(&self) -> u8 {
        self.lists.last().map_or(0, |frame| frame.level)
    }

    fn open_list(&mut self, body: &mut TextBody, kind: ListKind) {
        // a nested list right after `\item` takes over the parent's line
        if !self.lists.is_empty() {
            let current = body.current();
            if current.is_empty() {
                current.bullet = None;
            }
        }
        let level = self.level().saturating_add(1);
        self.lists.push(ListFrame { kind, counter: 0, level });
        self.continuation = false;
    }

    fn start_item(&mut self, body: &mut TextBody, node: &Node, mode: Mode) {
        if !mode.emits() {
            return;
        }
        let size = self.format.current().font_size;
        let Some(frame) = self.lists.last_mut() else {
            log::warn!("item outside of a list");
            body.start_paragraph(None, 0, size);
            return;
        };

        let kind = match frame.kind {
            ListKind::Bullet => {
                let symbol = BULLET_SYMBOLS[(frame.level as usize).saturating_sub(1) % BULLET_SYMBOLS.len()];
                Some(BulletKind::Symbol(symbol))
            }
            ListKind::Numbered => {
                frame.counter += 1;
                Some(BulletKind::Number(frame.counter))
            }
            ListKind::Description => None,
        };
        let (level, list) = (frame.level, frame.kind);

        self.continuation = false;
        let bullet = kind.map(|kind| Bullet {
            kind,
            hidden: mode.is_hidden(),
        });
        body.start_paragraph(bullet, level, size);

        if list == ListKind::Description && !node.params.is_empty() {
            let mut term = self.format.current().clone();
            term.bold = true;
            body.append(&node.params, &term, mode.is_hidden());
            body.append(" ", self.format.current(), mode.is_hidden());
            self.emitted = true;
        }
    }

    fn nested_block(
        &mut self,
        body: &mut TextBody,
        node: &'n Node,
        mode: Mode,
        stack: &mut Vec<Task<'n>>,
    ) {
        if self.policy == NestedPolicy::Defer {
            self.defer(node, mode);
            return;
        }

        match node.kind {
            NodeKind::Tabular => {
                let mode = mode.gate(node, self.tracker);
                if mode.emits() && !body.current().is_empty() {
                    body.break_paragraph();
                }
                push_children(stack, node, mode);
            }
            NodeKind::Image => {
                self.tracker.observe(&node.overlay);
                log::debug!("image {:?} dropped from text", node.content().unwrap_or_default());
            }
            _ => log::debug!("skipping {} in text", node.kind),
        }
    }

    fn defer(&mut self, node: &'n Node, mode: Mode) {
        if mode.emits() {
            self.deferred.push(Deferred { node, mode });
        }
    }
}

fn push_children<'n>(stack: &mut Vec<Task<'n>>, node: &'n Node, mode: Mode) {
    stack.extend(node.children.iter().rev().map(|child| Task::Visit(child, mode)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::pause::PassState;

    const SIZE: f32 = 20.0;

    fn run(nodes: &[Node], state: PassState, policy: NestedPolicy) -> (TextBody, Flow, usize, usize) {
        let mut tracker = PauseTracker::new(state);
        let mut body = TextBody::new(SIZE);
        let mut walker = InlineWalker::new(&mut tracker, TextFormat::new(SIZE), policy).with_native_lists();
        let flow = walker.walk(&mut body, nodes, Mode::Visible);
        let deferred = walker.into_deferred().len();
        (body, flow, tracker.max_pass(), deferred)
    }

    fn item(text: &str) -> Node {
        Node::new(NodeKind::Item).child(Node::text(text))
    }

    #[test]
    fn test_bullet_list_with_overlay_item() {
        let list = [Node::new(NodeKind::BulletList)
            .child(item("A"))
            .child(item("B").with_overlay("2-"))];

        let (body, flow, max, _) = run(&list, PassState::FIRST, NestedPolicy::AsText);
        assert_eq!(flow, Flow::Completed);
        assert_eq!(max, 2);
        assert_eq!(body.paragraphs.len(), 2);

        let a = &body.paragraphs[0];
        assert_eq!(a.text(), "A");
        assert_eq!(a.bullet, Some(Bullet { kind: BulletKind::Symbol('•'), hidden: false }));
        assert!(!a.runs[0].hidden);

        // present but hidden at the same slot
        let b = &body.paragraphs[1];
        assert_eq!(b.text(), "B");
        assert!(b.bullet.is_some_and(|bullet| bullet.hidden));
        assert!(b.runs[0].hidden);

        let (pass2, _, _, _) = run(&list, PassState { pass: 2, pause_counter: 1 }, NestedPolicy::AsText);
        assert!(pass2.paragraphs.iter().flat_map(|p| &p.runs).all(|r| !r.hidden));
        assert_eq!(pass2.layout(500.0), body.layout(500.0));
    }

    #[test]
    fn test_numbering_and_nesting() {
        let list = [Node::new(NodeKind::NumberedList)
            .child(item("one"))
            .child(
                Node::new(NodeKind::Item)
                    .child(Node::text("two"))
                    .child(Node::new(NodeKind::BulletList).child(item("inner")))
                    .child(Node::text("tail")),
            )];

        let (body, _, _, _) = run(&list, PassState::FIRST, NestedPolicy::AsText);
        let texts: Vec<_> = body.paragraphs.iter().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["one", "two", "inner", "tail"]);

        assert_eq!(body.paragraphs[0].bullet.map(|b| b.kind), Some(BulletKind::Number(1)));
        assert_eq!(body.paragraphs[1].bullet.map(|b| b.kind), Some(BulletKind::Number(2)));
        assert_eq!(body.paragraphs[2].bullet.map(|b| b.kind), Some(BulletKind::Symbol('–')));
        assert_eq!(body.paragraphs[2].level, 2);
        // continuation of the parent item, no bullet
        assert_eq!(body.paragraphs[3].bullet, None);
        assert_eq!(body.paragraphs[3].level, 1);
    }

    #[test]
    fn test_nested_list_suppresses_empty_parent_bullet() {
        let list = [Node::new(NodeKind::BulletList).child(
            Node::new(NodeKind::Item).child(Node::new(NodeKind::BulletList).child(item("x"))),
        )];
        let (body, _, _, _) = run(&list, PassState::FIRST, NestedPolicy::AsText);
        assert_eq!(body.paragraphs.len(), 1);
        assert_eq!(body.paragraphs[0].level, 2);
    }

    #[test]
    fn test_pause_stops_and_styles_apply() {
        let nodes = [
            Node::new(NodeKind::Bold).child(Node::text("Hello ")),
            Node::new(NodeKind::Pause),
            Node::text("World"),
        ];
        let (body, flow, max, _) = run(&nodes, PassState::FIRST, NestedPolicy::AsText);
        assert_eq!(flow, Flow::Paused);
        assert_eq!(max, 2);
        assert_eq!(body.plain_text(), "Hello ");
        assert!(body.paragraphs[0].runs[0].format.bold);

        let (body, flow, _, _) = run(&nodes, PassState { pass: 2, pause_counter: 1 }, NestedPolicy::AsText);
        assert_eq!(flow, Flow::Completed);
        assert_eq!(body.plain_text(), "Hello World");
        assert!(!body.paragraphs[0].runs[1].format.bold);
    }

    #[test]
    fn test_style_overlay_gates_style_only() {
        let nodes = [Node::new(NodeKind::Italic).with_overlay("2").child(Node::text("x"))];
        let (body, _, max, _) = run(&nodes, PassState::FIRST, NestedPolicy::AsText);
        assert_eq!(max, 2);
        assert!(!body.paragraphs[0].runs[0].format.italic);
        assert!(!body.paragraphs[0].runs[0].hidden);
    }

    #[test]
    fn test_only_omits_but_counts_pauses() {
        let nodes = [
            Node::new(NodeKind::Only)
                .with_overlay("3")
                .child(Node::text("gone"))
                .child(Node::new(NodeKind::Pause)),
            Node::text("after"),
        ];
        let (body, flow, max, _) = run(&nodes, PassState::FIRST, NestedPolicy::AsText);
        assert_eq!(flow, Flow::Paused);
        assert_eq!(max, 3);
        assert!(body.is_blank());
    }

    #[test]
    fn test_nested_blocks_follow_policy() {
        let table = Node::new(NodeKind::Tabular)
            .with_params("ll")
            .child(Node::text("a"))
            .child(Node::new(NodeKind::TableColumn))
            .child(Node::text("b"));
        let nodes = [Node::text("x"), table, Node::new(NodeKind::Image).with_content("logo")];

        let (body, _, _, deferred) = run(&nodes, PassState::FIRST, NestedPolicy::AsText);
        assert_eq!(body.plain_text(), "x\na b");
        assert_eq!(deferred, 0);

        let (body, _, _, deferred) = run(&nodes, PassState::FIRST, NestedPolicy::Defer);
        assert_eq!(body.plain_text(), "x");
        assert_eq!(deferred, 2);
    }

    #[test]
    fn test_description_items_in_text() {
        let list = [Node::new(NodeKind::DescriptionList)
            .child(Node::new(NodeKind::Item).with_params("Term").child(Node::text("definition")))];
        let (body, _, _, _) = run(&list, PassState::FIRST, NestedPolicy::AsText);
        assert_eq!(body.plain_text(), "Term definition");
        assert!(body.paragraphs[0].runs[0].format.bold);
        assert_eq!(body.paragraphs[0].bullet, None);
    }

    #[test]
    fn test_nested_description_list_follows_policy() {
        let list = [Node::new(NodeKind::BulletList).child(
            item("outer").child(
                Node::new(NodeKind::DescriptionList)
                    .child(Node::new(NodeKind::Item).with_params("Term").child(Node::text("def"))),
            ),
        )];

        let (body, _, _, deferred) = run(&list, PassState::FIRST, NestedPolicy::AsText);
        assert_eq!(body.plain_text(), "outer\nTerm def");
        assert_eq!(deferred, 0);

        let (body, _, _, deferred) = run(&list, PassState::FIRST, NestedPolicy::Defer);
        assert_eq!(body.plain_text(), "outer");
        assert_eq!(deferred, 1);

        // bullet lists stay native under both policies
        let nested = [Node::new(NodeKind::BulletList)
            .child(item("outer").child(Node::new(NodeKind::BulletList).child(item("inner"))))];
        let (body, _, _, deferred) = run(&nested, PassState::FIRST, NestedPolicy::Defer);
        assert_eq!(body.plain_text(), "outer\ninner");
        assert_eq!(deferred, 0);
    }
}
