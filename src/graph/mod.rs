//! The view graph: retained nodes, reconciliation, and layout passes.

pub mod lifecycle;
pub mod node;
pub mod tree;

pub use lifecycle::{LifecycleEvent, LifecycleTracker};
pub use node::{GraphNode, NodeId, NodePhase};
pub use tree::ViewGraph;

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::{Rc, Weak};

    use super::*;
    use crate::backend::HeadlessBackend;
    use crate::environment::{Environment, Font, FontKey};
    use crate::geometry::{Offset, ProposedSize, Size};
    use crate::layout::LayoutContext;
    use crate::property::PropertyFields;
    use crate::reactive::State;
    use crate::view::{AnyView, View, ViewExt};
    use crate::views::{ForEach, Text, VStack};

    fn backend() -> Rc<HeadlessBackend> {
        Rc::new(HeadlessBackend::new())
    }

    fn text_of(graph: &ViewGraph, backend: &HeadlessBackend, id: NodeId) -> Option<String> {
        let widget = graph.node(id)?.widget()?;
        backend.widget(widget)?.text
    }

    struct Counter {
        count: State<i32>,
    }

    impl Counter {
        fn new() -> Self {
            Self { count: State::new(0) }
        }
    }

    impl View for Counter {
        fn dynamic_properties(fields: &mut PropertyFields<Self>) {
            fields.add("count", |v| &v.count);
        }

        fn content(&self) -> Vec<AnyView> {
            vec![Text::new(format!("count {}", self.count.get())).boxed()]
        }
    }

    struct Holder {
        token: State<Rc<()>>,
    }

    impl View for Holder {
        fn dynamic_properties(fields: &mut PropertyFields<Self>) {
            fields.add("token", |v| &v.token);
        }
    }

    struct Switch {
        show_holder: bool,
    }

    impl View for Switch {
        fn content(&self) -> Vec<AnyView> {
            if self.show_holder {
                vec![Holder { token: State::new(Rc::new(())) }.boxed()]
            } else {
                vec![Text::new("gone").boxed()]
            }
        }
    }

    #[test]
    fn updating_with_the_same_kind_keeps_node_and_state() {
        let backend = backend();
        let mut graph = ViewGraph::new(Counter::new(), backend.clone(), Environment::new());
        let root = graph.root();
        graph.node(root).unwrap().view_as::<Counter>().unwrap().count.set(3);

        graph.update_root(Counter::new());

        assert_eq!(graph.root(), root);
        let counter = graph.node(root).unwrap().view_as::<Counter>().unwrap();
        assert_eq!(counter.count.get(), 3);
        let text = graph.children(root)[0];
        assert_eq!(text_of(&graph, &backend, text).as_deref(), Some("count 3"));
    }

    #[test]
    fn kind_change_tears_down_once_and_drops_storage() {
        let backend = backend();
        let mut graph = ViewGraph::recording(Switch { show_holder: true }, backend.clone(), Environment::new());
        let holder = graph.children(graph.root())[0];
        let token: Weak<()> = graph
            .node(holder)
            .unwrap()
            .view_as::<Holder>()
            .unwrap()
            .token
            .with(Rc::downgrade);
        assert!(token.upgrade().is_some());
        graph.lifecycle_mut().pending_events();

        graph.update_root(Switch { show_holder: false });

        let torn_down: Vec<_> = graph
            .lifecycle_mut()
            .pending_events()
            .into_iter()
            .filter(|event| matches!(event, LifecycleEvent::TornDown { .. }))
            .collect();
        assert_eq!(torn_down, vec![LifecycleEvent::TornDown { node: holder, kind: "Holder" }]);
        assert!(!graph.contains(holder));
        assert!(token.upgrade().is_none());
        assert_eq!(backend.destroyed_count(), 1);
        let replacement = graph.children(graph.root())[0];
        assert_eq!(text_of(&graph, &backend, replacement).as_deref(), Some("gone"));
    }

    fn list(items: &[&str]) -> VStack {
        let items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        VStack::new(vec![ForEach::new(items, |name: &String| Text::new(name.clone())).boxed()])
    }

    fn keyed_list(items: &[&str]) -> VStack {
        let items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        VStack::new(vec![ForEach::keyed(
            items,
            |name: &String| name.clone(),
            |name: &String| Text::new(name.clone()),
        )
        .boxed()])
    }

    #[test]
    fn positional_insert_shifts_values_onto_existing_nodes() {
        let backend = backend();
        let mut graph = ViewGraph::new(list(&["a", "b"]), backend.clone(), Environment::new());
        let for_each = graph.children(graph.root())[0];
        let before = graph.children(for_each).to_vec();

        graph.update_root(list(&["a", "x", "b"]));

        let after = graph.children(for_each).to_vec();
        assert_eq!(after.len(), 3);
        assert_eq!(after[..2], before[..]);
        assert!(!before.contains(&after[2]));
        assert_eq!(text_of(&graph, &backend, after[1]).as_deref(), Some("x"));
        assert_eq!(text_of(&graph, &backend, after[2]).as_deref(), Some("b"));
    }

    struct Row {
        name: String,
        taps: State<u32>,
    }

    impl View for Row {
        fn dynamic_properties(fields: &mut PropertyFields<Self>) {
            fields.add("taps", |v| &v.taps);
        }

        fn content(&self) -> Vec<AnyView> {
            vec![Text::new(format!("{} {}", self.name, self.taps.get())).boxed()]
        }
    }

    fn rows(items: &[&str]) -> VStack {
        let items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        VStack::new(vec![ForEach::new(items, |name: &String| Row {
            name: name.clone(),
            taps: State::new(0),
        })
        .boxed()])
    }

    fn row_text(graph: &ViewGraph, backend: &HeadlessBackend, row: NodeId) -> Option<String> {
        text_of(graph, backend, graph.children(row)[0])
    }

    #[test]
    fn positional_insert_keeps_state_with_positions() {
        let backend = backend();
        let mut graph = ViewGraph::new(rows(&["a", "b", "c"]), backend.clone(), Environment::new());
        let for_each = graph.children(graph.root())[0];
        let before = graph.children(for_each).to_vec();
        graph.node(before[1]).unwrap().view_as::<Row>().unwrap().taps.set(5);
        assert_eq!(graph.process_invalidations(), 1);
        assert_eq!(row_text(&graph, &backend, before[1]).as_deref(), Some("b 5"));

        graph.update_root(rows(&["a", "x", "b", "c"]));

        let after = graph.children(for_each).to_vec();
        assert_eq!(after.len(), 4);
        assert_eq!(after[..3], before[..]);
        assert!(!before.contains(&after[3]));
        let texts: Vec<Option<String>> = after.iter().map(|&id| row_text(&graph, &backend, id)).collect();
        assert_eq!(
            texts,
            vec![
                Some("a 0".to_string()),
                Some("x 5".to_string()),
                Some("b 0".to_string()),
                Some("c 0".to_string()),
            ]
        );
    }

    #[test]
    fn keyed_insert_keeps_nodes_with_their_items() {
        let backend = backend();
        let mut graph = ViewGraph::new(keyed_list(&["a", "b"]), backend.clone(), Environment::new());
        let for_each = graph.children(graph.root())[0];
        let before = graph.children(for_each).to_vec();

        graph.update_root(keyed_list(&["a", "x", "b"]));

        let after = graph.children(for_each).to_vec();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[1]);
        assert!(!before.contains(&after[1]));
        assert_eq!(backend.destroyed_count(), 0);
    }

    #[test]
    fn state_change_rerenders_after_processing() {
        let backend = backend();
        let mut graph = ViewGraph::new(Counter::new(), backend.clone(), Environment::new());
        let root = graph.root();
        let text = graph.children(root)[0];

        graph.node(root).unwrap().view_as::<Counter>().unwrap().count.set(1);
        assert!(graph.has_pending_invalidations());
        assert_eq!(text_of(&graph, &backend, text).as_deref(), Some("count 0"));

        assert_eq!(graph.process_invalidations(), 1);
        assert_eq!(graph.children(root), [text]);
        assert_eq!(text_of(&graph, &backend, text).as_deref(), Some("count 1"));
        assert_eq!(graph.process_invalidations(), 0);
    }

    #[test]
    fn torn_down_nodes_ignore_queued_invalidations() {
        let backend = backend();
        let mut graph = ViewGraph::new(Counter::new(), backend.clone(), Environment::new());
        graph.node(graph.root()).unwrap().view_as::<Counter>().unwrap().count.set(1);
        assert!(graph.has_pending_invalidations());
        graph.update_root(Text::new("replaced"));
        assert_eq!(graph.process_invalidations(), 0);
    }

    #[test]
    fn environment_overrides_reach_only_the_subtree() {
        let backend = backend();
        let root = VStack::new(vec![Text::new("a").font(Font::HEADING).boxed(), Text::new("b").boxed()]);
        let graph = ViewGraph::new(root, backend, Environment::new());
        let children = graph.children(graph.root()).to_vec();
        let heading_text = graph.children(children[0])[0];

        let font_of = |id: NodeId| graph.node(id).unwrap().environment().get::<FontKey>();
        assert_eq!(font_of(heading_text), Font::HEADING);
        assert_eq!(font_of(children[0]), Font::BODY);
        assert_eq!(font_of(children[1]), Font::BODY);
    }

    #[test]
    fn vertical_stack_places_children() {
        let backend = backend();
        let root = VStack::new(vec![Text::new("ab").boxed(), Text::new("abcd").boxed()]);
        let mut graph = ViewGraph::new(root, backend.clone(), Environment::new());

        let size = graph.compute_layout(ProposedSize::new(200, 200));

        assert_eq!(size, Size::new(32, 40));
        let children = graph.children(graph.root()).to_vec();
        assert_eq!(graph.node(children[0]).unwrap().position(), Offset::new(8, 0));
        assert_eq!(graph.node(children[1]).unwrap().position(), Offset::new(0, 25));
        let widget = backend.widget(graph.root_widget()).unwrap();
        assert_eq!(widget.size, Size::new(32, 40));
        assert_eq!(widget.positions, vec![Offset::new(8, 0), Offset::new(0, 25)]);
    }

    struct Probe {
        calls: Rc<Cell<usize>>,
    }

    impl View for Probe {
        fn layout(&self, _proposal: ProposedSize, _cx: &mut LayoutContext<'_>) -> Size {
            self.calls.set(self.calls.get() + 1);
            Size::new(5, 5)
        }
    }

    struct Measurer {
        calls: Rc<Cell<usize>>,
    }

    impl View for Measurer {
        fn content(&self) -> Vec<AnyView> {
            vec![Probe { calls: Rc::clone(&self.calls) }.boxed()]
        }

        fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
            for _ in 0..3 {
                cx.measure_child(0, ProposedSize::UNSPECIFIED);
            }
            cx.commit_child(0, proposal)
        }
    }

    #[test]
    fn repeated_measurements_are_memoized() {
        let calls = Rc::new(Cell::new(0));
        let mut graph = ViewGraph::new(Measurer { calls: Rc::clone(&calls) }, backend(), Environment::new());

        graph.compute_layout(ProposedSize::new(50, 50));
        assert_eq!(calls.get(), 2);

        graph.compute_layout(ProposedSize::new(50, 50));
        assert_eq!(calls.get(), 2);
        assert_eq!(graph.relayout(), None);
    }

    struct DoubleCommit;

    impl View for DoubleCommit {
        fn content(&self) -> Vec<AnyView> {
            vec![Text::new("once").boxed()]
        }

        fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
            cx.commit_child(0, proposal);
            cx.commit_child(0, proposal)
        }
    }

    #[test]
    #[should_panic(expected = "second final proposal")]
    fn second_final_proposal_in_one_pass_panics() {
        let mut graph = ViewGraph::new(DoubleCommit, backend(), Environment::new());
        graph.compute_layout(ProposedSize::new(100, 100));
    }

    #[test]
    fn teardown_destroys_every_widget() {
        let backend = backend();
        let mut graph = ViewGraph::new(list(&["a", "b", "c"]), backend.clone(), Environment::new());
        assert_eq!(backend.widget_count(), 5);

        graph.teardown();

        assert_eq!(backend.widget_count(), 0);
        assert!(graph.is_empty());
    }
}
