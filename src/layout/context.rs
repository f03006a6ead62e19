//! LayoutContext: the handle a view uses to negotiate with its children.

use std::rc::Rc;

use crate::backend::{Backend, WidgetId};
use crate::environment::Environment;
use crate::geometry::{Offset, ProposedSize, Size};
use crate::graph::{NodeId, ViewGraph};

/// Which phase of layout a proposal belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayoutMode {
    /// A speculative measurement. May be repeated with different proposals;
    /// results are memoized per node per pass and nothing is committed.
    NonFinal,
    /// The single authoritative proposal of the pass. The response becomes
    /// the node's committed size and children are positioned.
    Final,
}

/// Passed to [`View::layout`](crate::view::View::layout).
///
/// Children are addressed by index, in content order.
pub struct LayoutContext<'a> {
    graph: &'a mut ViewGraph,
    node: NodeId,
    children: Vec<NodeId>,
    environment: Environment,
    widget: WidgetId,
    mode: LayoutMode,
}

impl<'a> LayoutContext<'a> {
    pub(crate) fn new(
        graph: &'a mut ViewGraph,
        node: NodeId,
        children: Vec<NodeId>,
        environment: Environment,
        widget: WidgetId,
        mode: LayoutMode,
    ) -> Self {
        Self {
            graph,
            node,
            children,
            environment,
            widget,
            mode,
        }
    }

    /// The environment of the node being laid out. During non-final layout
    /// it allows layout caching.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn backend(&self) -> Rc<dyn Backend> {
        self.graph.backend()
    }

    /// The widget of the node being laid out.
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn is_final(&self) -> bool {
        self.mode == LayoutMode::Final
    }

    fn child(&self, index: usize) -> NodeId {
        match self.children.get(index) {
            Some(&child) => child,
            None => {
                tracing::error!(index, children = self.children.len(), "layout child index out of range");
                panic!(
                    "layout child index {index} out of range for a node with {} children",
                    self.children.len()
                );
            }
        }
    }

    /// Ask child `index` how big it would be for `proposal`, without
    /// committing anything. Cheap to repeat.
    pub fn measure_child(&mut self, index: usize, proposal: ProposedSize) -> Size {
        let child = self.child(index);
        self.graph.layout_node(child, proposal, LayoutMode::NonFinal)
    }

    /// Give child `index` its proposal for this phase. During final layout
    /// this is the child's one authoritative proposal of the pass.
    pub fn commit_child(&mut self, index: usize, proposal: ProposedSize) -> Size {
        let child = self.child(index);
        self.graph.layout_node(child, proposal, self.mode)
    }

    /// Position child `index` relative to this node. Ignored outside final
    /// layout.
    pub fn place_child(&mut self, index: usize, offset: Offset) {
        let child = self.child(index);
        if self.mode == LayoutMode::Final {
            self.graph.place_node(self.widget, index, child, offset);
        }
    }
}
