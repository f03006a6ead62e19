//! Graph node types: NodeId, NodePhase, GraphNode.

use std::fmt;

use slotmap::new_key_type;

use crate::backend::WidgetId;
use crate::environment::Environment;
use crate::geometry::{Offset, ProposedSize, Size};
use crate::property::ErasedUpdater;
use crate::reactive::{Cancellable, Publisher};
use crate::view::{AnyView, ViewIdentity, ViewKind};

new_key_type! {
    /// Stable identifier of a graph node. Never reused while the node is
    /// alive.
    pub struct NodeId;
}

/// Where a node is in its life.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodePhase {
    /// Inserted, children and widget not yet created.
    Unmounted,
    /// Widget created and attached; receives updates.
    Mounted,
    /// Subscriptions cancelled and widget destroyed.
    TornDown,
}

/// Cached layout results of one node.
#[derive(Clone, Debug, Default)]
pub(crate) struct LayoutCache {
    /// Set by any update in the subtree; cleared by a final layout.
    pub dirty: bool,
    /// Response to the unspecified proposal, valid while clean.
    pub natural: Option<Size>,
    /// Pass the `trials` belong to.
    pub trial_pass: u64,
    pub trials: Vec<(ProposedSize, Size)>,
    /// Pass in which this node last received its final proposal.
    pub final_pass: Option<u64>,
    pub last_proposal: Option<ProposedSize>,
    pub last_response: Option<Size>,
    pub position: Offset,
}

impl LayoutCache {
    fn new() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    pub fn trial(&self, pass: u64, proposal: ProposedSize) -> Option<Size> {
        if self.trial_pass != pass {
            return None;
        }
        self.trials
            .iter()
            .find(|(p, _)| *p == proposal)
            .map(|(_, size)| *size)
    }
}

/// The retained counterpart of a view value.
pub struct GraphNode {
    pub(crate) view: AnyView,
    pub(crate) kind: ViewKind,
    pub(crate) identity: Option<ViewIdentity>,
    pub(crate) updater: Box<dyn ErasedUpdater>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) widget: Option<WidgetId>,
    pub(crate) environment: Environment,
    pub(crate) phase: NodePhase,
    pub(crate) observations: Vec<(Publisher, Cancellable)>,
    pub(crate) layout: LayoutCache,
    pub(crate) generation: u64,
}

impl GraphNode {
    pub(crate) fn new(view: AnyView, parent: Option<NodeId>, environment: Environment) -> Self {
        let erased = view.erased();
        Self {
            kind: erased.kind(),
            identity: erased.identity(),
            updater: erased.new_updater(),
            view,
            parent,
            children: Vec::new(),
            widget: None,
            environment,
            phase: NodePhase::Unmounted,
            observations: Vec::new(),
            layout: LayoutCache::new(),
            generation: 0,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn identity(&self) -> Option<ViewIdentity> {
        self.identity
    }

    /// The view value from the latest pass.
    pub fn view(&self) -> &AnyView {
        &self.view
    }

    /// The latest view value as a `V`, if it is one.
    pub fn view_as<V: crate::view::View>(&self) -> Option<&V> {
        self.view.downcast_ref::<V>()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn widget(&self) -> Option<WidgetId> {
        self.widget
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn phase(&self) -> NodePhase {
        self.phase
    }

    /// Number of updates applied since build.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Size committed by the latest final layout.
    pub fn committed_size(&self) -> Option<Size> {
        self.layout.last_response
    }

    pub fn last_proposal(&self) -> Option<ProposedSize> {
        self.layout.last_proposal
    }

    /// Offset within the parent, from the latest final layout.
    pub fn position(&self) -> Offset {
        self.layout.position
    }

    pub fn needs_layout(&self) -> bool {
        self.layout.dirty
    }

    /// Number of publishers this node currently observes.
    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }
}

impl fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphNode")
            .field("kind", &self.kind)
            .field("phase", &self.phase)
            .field("children", &self.children.len())
            .field("generation", &self.generation)
            .finish()
    }
}
