//! ViewGraph: the retained tree of view nodes.
//!
//! The graph owns one [`GraphNode`] per live view, keyed by [`NodeId`] in a
//! slotmap arena. It builds nodes from view values, reconciles new values
//! against existing nodes, tears subtrees down, queues state-triggered
//! updates, and drives layout.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use slotmap::SlotMap;

use super::lifecycle::LifecycleTracker;
use super::node::{GraphNode, NodeId, NodePhase};
use crate::backend::{Backend, WidgetId};
use crate::environment::Environment;
use crate::geometry::{Offset, ProposedSize, Size};
use crate::layout::{LayoutContext, LayoutMode};
use crate::view::{AnyView, View};

/// Invalidation rounds processed in one call before the rest is deferred.
const MAX_INVALIDATION_ROUNDS: usize = 64;

type InvalidationQueue = Rc<RefCell<Vec<NodeId>>>;

/// The retained view tree of one window.
pub struct ViewGraph {
    nodes: SlotMap<NodeId, GraphNode>,
    root: NodeId,
    backend: Rc<dyn Backend>,
    environment: Environment,
    invalidations: InvalidationQueue,
    lifecycle: LifecycleTracker,
    pass: u64,
    root_proposal: Option<ProposedSize>,
}

impl ViewGraph {
    /// Build the graph for `root`, creating every widget.
    pub fn new(root: impl View, backend: Rc<dyn Backend>, environment: Environment) -> Self {
        Self::with_lifecycle(root, backend, environment, LifecycleTracker::new())
    }

    /// Like [`new`](ViewGraph::new), with lifecycle events recorded from
    /// the first build on.
    pub fn recording(root: impl View, backend: Rc<dyn Backend>, environment: Environment) -> Self {
        let mut lifecycle = LifecycleTracker::new();
        lifecycle.set_recording(true);
        Self::with_lifecycle(root, backend, environment, lifecycle)
    }

    fn with_lifecycle(
        root: impl View,
        backend: Rc<dyn Backend>,
        environment: Environment,
        lifecycle: LifecycleTracker,
    ) -> Self {
        let environment = attach_backend(environment, &backend);
        let mut graph = Self {
            nodes: SlotMap::with_key(),
            root: NodeId::default(),
            backend,
            environment,
            invalidations: Rc::new(RefCell::new(Vec::new())),
            lifecycle,
            pass: 0,
            root_proposal: None,
        };
        let environment = graph.environment.clone();
        graph.root = graph.build_node(AnyView::new(root), None, environment);
        graph
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_widget(&self) -> WidgetId {
        self.widget_of(self.root)
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn backend(&self) -> Rc<dyn Backend> {
        Rc::clone(&self.backend)
    }

    pub fn lifecycle_mut(&mut self) -> &mut LifecycleTracker {
        &mut self.lifecycle
    }

    /// Children of `id`, or an empty slice if `id` is not in the graph.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.nodes.get(id).and_then(|node| node.parent);
        while let Some(ancestor) = current {
            result.push(ancestor);
            current = self.nodes.get(ancestor).and_then(|node| node.parent);
        }
        result
    }

    /// Pre-order walk of the subtree rooted at `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            result.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }

    /// Layout passes run so far.
    pub fn layout_pass(&self) -> u64 {
        self.pass
    }

    pub fn has_pending_invalidations(&self) -> bool {
        !self.invalidations.borrow().is_empty()
    }

    fn widget_of(&self, id: NodeId) -> WidgetId {
        self.nodes[id].widget.expect("mounted nodes own a widget")
    }

    fn widgets_of(&self, ids: &[NodeId]) -> Vec<WidgetId> {
        ids.iter().map(|&id| self.widget_of(id)).collect()
    }

    // ── Updates from outside ─────────────────────────────────────────

    /// Reconcile a new root value against the current tree.
    pub fn update_root(&mut self, root: impl View) {
        let view = AnyView::new(root);
        let environment = self.environment.clone();
        if view.kind() == self.nodes[self.root].kind {
            self.update_node(self.root, Some(view), environment);
        } else {
            tracing::debug!(kind = view.kind().short_name(), "root kind changed; rebuilding");
            self.teardown_node(self.root);
            self.root = self.build_node(view, None, environment);
        }
        self.relayout();
    }

    /// Replace the root environment and push it through the tree.
    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = attach_backend(environment, &self.backend);
        let environment = self.environment.clone();
        self.update_node(self.root, None, environment);
        self.relayout();
    }

    /// Re-render every node whose observed state changed since the last
    /// call, ancestors first, then re-run layout if anything changed.
    /// Returns the number of nodes updated.
    pub fn process_invalidations(&mut self) -> usize {
        let mut processed = 0;
        let mut rounds = 0;
        loop {
            let mut batch = std::mem::take(&mut *self.invalidations.borrow_mut());
            if batch.is_empty() {
                break;
            }
            if rounds == MAX_INVALIDATION_ROUNDS {
                tracing::warn!(
                    pending = batch.len(),
                    "state keeps changing during updates; deferring the rest"
                );
                self.invalidations.borrow_mut().extend(batch);
                break;
            }
            rounds += 1;

            let mut seen = HashSet::new();
            batch.retain(|id| seen.insert(*id));
            batch.retain(|&id| self.nodes.get(id).is_some_and(|n| n.phase == NodePhase::Mounted));
            batch.sort_by_cached_key(|&id| self.ancestors(id).len());
            tracing::debug!(nodes = batch.len(), round = rounds, "processing invalidations");

            let generations: Vec<u64> = batch.iter().map(|&id| self.nodes[id].generation).collect();
            for (id, generation) in batch.into_iter().zip(generations) {
                // Skip nodes already refreshed (or removed) by an ancestor's update.
                let environment = match self.nodes.get(id) {
                    Some(node) if node.generation == generation => node.environment.clone(),
                    _ => continue,
                };
                self.update_node(id, None, environment);
                processed += 1;
            }
        }
        if processed > 0 {
            self.relayout();
        }
        processed
    }

    /// Tear down the whole tree, destroying every widget.
    pub fn teardown(&mut self) {
        if self.nodes.contains_key(self.root) {
            self.teardown_node(self.root);
        }
    }

    // ── Build / update / teardown ────────────────────────────────────

    fn build_node(&mut self, view: AnyView, parent: Option<NodeId>, environment: Environment) -> NodeId {
        let node = GraphNode::new(view.clone(), parent, environment.clone());
        let erased = view.erased();
        node.updater.update(erased.as_any(), &environment, None);
        let kind = node.kind;
        let id = self.nodes.insert(node);
        tracing::debug!(?id, kind = kind.short_name(), "building node");

        let child_environment = erased.child_environment(&environment);
        let children: Vec<NodeId> = erased
            .content()
            .into_iter()
            .map(|child| self.build_node(child, Some(id), child_environment.clone()))
            .collect();

        let widget = self.backend.create_widget(erased.widget_kind());
        self.backend.set_children(widget, &self.widgets_of(&children));
        erased.update_widget(widget, &environment, &*self.backend);

        let node = &mut self.nodes[id];
        node.children = children;
        node.widget = Some(widget);
        node.phase = NodePhase::Mounted;

        self.observe(id);
        self.lifecycle.on_built(id, kind.short_name());
        id
    }

    /// Apply a new view value (or, with `None`, re-run the current one) to a
    /// mounted node, then reconcile its children.
    fn update_node(&mut self, id: NodeId, new_view: Option<AnyView>, environment: Environment) {
        let Some(node) = self.nodes.get(id) else {
            tracing::error!(?id, "update requested for a node that is not in the graph");
            panic!("update requested for node {id:?}, which is not in the view graph");
        };
        if node.phase != NodePhase::Mounted {
            tracing::error!(?id, phase = ?node.phase, "update requested for an unmounted node");
            panic!("update requested for node {id:?} in phase {:?}", node.phase);
        }

        let view = match new_view {
            Some(view) => {
                if view.kind() != node.kind {
                    tracing::error!(node = node.kind.name(), value = view.kind().name(), "kind mismatch on update");
                    panic!(
                        "cannot update a {} node with a {} value",
                        node.kind.name(),
                        view.kind().name()
                    );
                }
                node.updater
                    .update(view.erased().as_any(), &environment, Some(node.view.erased().as_any()));
                view
            }
            None => {
                node.updater.update(node.view.erased().as_any(), &environment, None);
                node.view.clone()
            }
        };

        let node = &mut self.nodes[id];
        node.identity = view.identity();
        node.view = view.clone();
        node.environment = environment.clone();
        node.generation += 1;

        let erased = view.erased();
        let child_environment = erased.child_environment(&environment);
        self.reconcile_children(id, erased.content(), child_environment);

        erased.update_widget(self.widget_of(id), &environment, &*self.backend);
        self.observe(id);
        self.invalidate_layout(id);
        self.lifecycle.on_updated(id);
    }

    fn matches(&self, old: NodeId, view: &AnyView) -> bool {
        let node = &self.nodes[old];
        node.kind == view.kind() && node.identity == view.identity()
    }

    /// Match `content` against the current children of `id`.
    ///
    /// Children are matched by identity when every old and new child carries
    /// one, and by position otherwise. A matched child is updated in place;
    /// an unmatched new child is built; an unmatched old child is torn down.
    fn reconcile_children(&mut self, id: NodeId, content: Vec<AnyView>, environment: Environment) {
        let old_children = std::mem::take(&mut self.nodes[id].children);
        let keyed = content.iter().all(|view| view.identity().is_some())
            && old_children.iter().all(|&old| self.nodes[old].identity.is_some());

        let mut children = Vec::with_capacity(content.len());
        if keyed {
            let mut unmatched: Vec<Option<NodeId>> = old_children.iter().copied().map(Some).collect();
            for view in content {
                let found = unmatched
                    .iter_mut()
                    .find(|slot| slot.is_some_and(|old| self.matches(old, &view)))
                    .and_then(Option::take);
                match found {
                    Some(old) => {
                        self.update_node(old, Some(view), environment.clone());
                        children.push(old);
                    }
                    None => children.push(self.build_node(view, Some(id), environment.clone())),
                }
            }
            for old in unmatched.into_iter().flatten() {
                self.teardown_node(old);
            }
        } else {
            let mut remaining = old_children.iter().copied();
            for view in content {
                match remaining.next() {
                    Some(old) if self.matches(old, &view) => {
                        self.update_node(old, Some(view), environment.clone());
                        children.push(old);
                    }
                    Some(old) => {
                        tracing::debug!(
                            from = self.nodes[old].kind.short_name(),
                            to = view.kind().short_name(),
                            "child kind changed; rebuilding"
                        );
                        self.teardown_node(old);
                        children.push(self.build_node(view, Some(id), environment.clone()));
                    }
                    None => children.push(self.build_node(view, Some(id), environment.clone())),
                }
            }
            for old in remaining {
                self.teardown_node(old);
            }
        }

        let changed = children != old_children;
        if changed {
            let widget = self.widget_of(id);
            self.backend.set_children(widget, &self.widgets_of(&children));
        }
        self.nodes[id].children = children;
    }

    /// Destroy a subtree: children first, then the node's own observations,
    /// dynamic properties, and widget.
    fn teardown_node(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id].children);
        for child in children {
            self.teardown_node(child);
        }

        let Some(mut node) = self.nodes.remove(id) else {
            return;
        };
        node.observations.clear();
        node.updater.release(node.view.erased().as_any());
        node.phase = NodePhase::TornDown;
        if let Some(widget) = node.widget.take() {
            self.backend.destroy_widget(widget);
        }
        self.invalidations.borrow_mut().retain(|&queued| queued != id);
        tracing::debug!(?id, kind = node.kind.short_name(), "tore down node");
        self.lifecycle.on_torn_down(id, node.kind.short_name());
    }

    /// Subscribe the node to the publishers its properties currently expose.
    /// Existing subscriptions are kept when the set is unchanged.
    fn observe(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let publishers = node.updater.publishers(node.view.erased().as_any());
        let unchanged = publishers.len() == node.observations.len()
            && publishers
                .iter()
                .zip(&node.observations)
                .all(|(new, (old, _))| new.ptr_eq(old));
        if unchanged {
            return;
        }

        let queue = Rc::downgrade(&self.invalidations);
        let observations = publishers
            .into_iter()
            .map(|publisher| {
                let queue = queue.clone();
                let subscription = publisher.subscribe(move || {
                    if let Some(queue) = queue.upgrade() {
                        queue.borrow_mut().push(id);
                    }
                });
                (publisher, subscription)
            })
            .collect();
        self.nodes[id].observations = observations;
    }

    // ── Layout ───────────────────────────────────────────────────────

    /// Run a layout pass from the root with `proposal` as its final
    /// proposal. Returns the root's response.
    pub fn compute_layout(&mut self, proposal: ProposedSize) -> Size {
        self.pass += 1;
        self.root_proposal = Some(proposal);
        tracing::trace!(pass = self.pass, ?proposal, "layout pass");
        self.layout_node(self.root, proposal, LayoutMode::Final)
    }

    /// Re-run layout with the last root proposal if anything changed since.
    pub fn relayout(&mut self) -> Option<Size> {
        let proposal = self.root_proposal?;
        if !self.nodes[self.root].layout.dirty {
            return None;
        }
        Some(self.compute_layout(proposal))
    }

    fn invalidate_layout(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.nodes.get_mut(id)) {
            node.layout.dirty = true;
            node.layout.natural = None;
            current = node.parent;
        }
    }

    pub(crate) fn layout_node(&mut self, id: NodeId, proposal: ProposedSize, mode: LayoutMode) -> Size {
        let pass = self.pass;
        let Some(node) = self.nodes.get_mut(id) else {
            tracing::error!(?id, "layout requested for a node that is not in the graph");
            panic!("layout requested for node {id:?}, which is not in the view graph");
        };

        match mode {
            LayoutMode::NonFinal => {
                if let Some(size) = node.layout.trial(pass, proposal) {
                    tracing::trace!(?id, ?proposal, "layout cache hit");
                    return size;
                }
                if proposal == ProposedSize::UNSPECIFIED && !node.layout.dirty {
                    if let Some(natural) = node.layout.natural {
                        return natural;
                    }
                }
            }
            LayoutMode::Final => {
                if node.layout.final_pass == Some(pass) {
                    tracing::error!(?id, kind = node.kind.name(), "second final proposal in one pass");
                    panic!(
                        "{} node {id:?} received a second final proposal in layout pass {pass}",
                        node.kind.name()
                    );
                }
                node.layout.final_pass = Some(pass);
                if !node.layout.dirty && node.layout.last_proposal == Some(proposal) {
                    if let Some(size) = node.layout.last_response {
                        tracing::trace!(?id, "layout unchanged; skipping subtree");
                        return size;
                    }
                }
            }
        }

        let view = node.view.clone();
        let children = node.children.clone();
        let widget = node.widget.expect("mounted nodes own a widget");
        let environment = match mode {
            LayoutMode::NonFinal => node.environment.with_layout_caching(true),
            LayoutMode::Final => node.environment.clone(),
        };

        let size = {
            let mut cx = LayoutContext::new(self, id, children, environment, widget, mode);
            view.erased().layout(proposal, &mut cx)
        }
        .clamped_non_negative();
        tracing::trace!(?id, ?mode, ?proposal, ?size, "laid out node");

        let node = &mut self.nodes[id];
        match mode {
            LayoutMode::NonFinal => {
                if node.layout.trial_pass != pass {
                    node.layout.trial_pass = pass;
                    node.layout.trials.clear();
                }
                node.layout.trials.push((proposal, size));
                if proposal == ProposedSize::UNSPECIFIED && !node.layout.dirty {
                    node.layout.natural = Some(size);
                }
            }
            LayoutMode::Final => {
                node.layout.last_proposal = Some(proposal);
                node.layout.last_response = Some(size);
                node.layout.dirty = false;
                self.backend.set_size(widget, size);
            }
        }
        size
    }

    pub(crate) fn place_node(&mut self, container: WidgetId, index: usize, child: NodeId, offset: Offset) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.layout.position = offset;
        }
        self.backend.set_position(container, index, offset);
    }
}

impl Drop for ViewGraph {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        self.teardown();
    }
}

impl std::fmt::Debug for ViewGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewGraph")
            .field("nodes", &self.nodes.len())
            .field("root", &self.root)
            .field("pass", &self.pass)
            .finish()
    }
}

fn attach_backend(environment: Environment, backend: &Rc<dyn Backend>) -> Environment {
    if environment.backend().is_some() {
        environment
    } else {
        environment.with_backend(Rc::clone(backend))
    }
}
