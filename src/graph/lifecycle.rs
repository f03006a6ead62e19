//! Node lifecycle: build, update, teardown.
//!
//! The `LifecycleTracker` knows which nodes are currently mounted in a view
//! graph and, when recording is switched on, queues one event per lifecycle
//! step so callers can drain and inspect them.

use std::collections::HashSet;

use super::node::NodeId;

// ---------------------------------------------------------------------------
// LifecycleEvent
// ---------------------------------------------------------------------------

/// One lifecycle step of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A node was created and its widget mounted.
    Built { node: NodeId, kind: &'static str },
    /// A mounted node received a new view value or a state change.
    Updated { node: NodeId },
    /// A node and its widget were destroyed.
    TornDown { node: NodeId, kind: &'static str },
}

impl LifecycleEvent {
    pub fn node(&self) -> NodeId {
        match self {
            LifecycleEvent::Built { node, .. }
            | LifecycleEvent::Updated { node }
            | LifecycleEvent::TornDown { node, .. } => *node,
        }
    }
}

// ---------------------------------------------------------------------------
// LifecycleTracker
// ---------------------------------------------------------------------------

/// Tracks mounted nodes and, optionally, a queue of lifecycle events.
///
/// Recording is off by default so long-running graphs do not accumulate
/// events nobody drains.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    mounted: HashSet<NodeId>,
    pending: Vec<LifecycleEvent>,
    recording: bool,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or stop queueing events. Stopping discards queued events.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
        if !recording {
            self.pending.clear();
        }
    }

    fn record(&mut self, event: LifecycleEvent) {
        if self.recording {
            self.pending.push(event);
        }
    }

    /// A node finished building. Duplicate builds of one id are ignored.
    pub fn on_built(&mut self, node: NodeId, kind: &'static str) {
        if self.mounted.insert(node) {
            self.record(LifecycleEvent::Built { node, kind });
        }
    }

    /// A mounted node was updated; ignored for nodes that are not mounted.
    pub fn on_updated(&mut self, node: NodeId) {
        if self.mounted.contains(&node) {
            self.record(LifecycleEvent::Updated { node });
        }
    }

    /// A node was torn down; ignored for nodes that are not mounted.
    pub fn on_torn_down(&mut self, node: NodeId, kind: &'static str) {
        if self.mounted.remove(&node) {
            self.record(LifecycleEvent::TornDown { node, kind });
        }
    }

    pub fn is_mounted(&self, node: NodeId) -> bool {
        self.mounted.contains(&node)
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Drain queued events, oldest first.
    pub fn pending_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
