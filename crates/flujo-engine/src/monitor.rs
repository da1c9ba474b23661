//! Cross-thread observation of a running pipeline.
//!
//! Observers never touch live graph state. The engine publishes an immutable
//! [`PipelineSnapshot`] into an atomically swapped slot at the end of every
//! tick and after each lifecycle transition; [`Monitor`] handles load the
//! current one without blocking the tick loop. Writes go the other way
//! through a mutex-guarded queue the engine drains at the next tick boundary.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use flujo_block::Value;
use parking_lot::Mutex;

use crate::node::{NodeHealth, NodeId};
use crate::pipeline::{PipelineState, RunStats};

/// Immutable view of pipeline state at one tick boundary.
#[derive(Debug, Clone)]
pub struct PipelineSnapshot {
    /// Name from the manifest.
    pub pipeline_name: String,
    /// Lifecycle state when the snapshot was taken.
    pub state: PipelineState,
    /// Aggregate run statistics.
    pub stats: RunStats,
    /// Per-node state, in manifest order.
    pub nodes: Vec<NodeSnapshot>,
}

impl PipelineSnapshot {
    /// Looks up one node's snapshot by manifest id.
    pub fn node(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

/// One node's state within a snapshot.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    /// Manifest node id.
    pub id: NodeId,
    /// Block type name.
    pub block_type: String,
    /// Whether the node is still executing.
    pub health: NodeHealth,
    /// Execute failures recorded against this node.
    pub exec_errors: u64,
    /// The node's output cache as of the snapshot.
    pub outputs: BTreeMap<String, Value>,
}

/// A queued observer write, applied at the next tick boundary.
#[derive(Debug, Clone)]
pub(crate) struct InputWrite {
    pub node: NodeId,
    pub pin: String,
    pub value: Value,
}

struct MonitorShared {
    snapshot: ArcSwap<PipelineSnapshot>,
    writes: Mutex<Vec<InputWrite>>,
}

/// Clonable observer handle over one pipeline.
///
/// Reads are wait-free loads of the latest snapshot; writes queue and apply
/// when the engine starts its next tick. Dashboard-style collaborators get
/// exactly this handle and nothing else.
#[derive(Clone)]
pub struct Monitor {
    shared: Arc<MonitorShared>,
}

impl Monitor {
    pub(crate) fn new(initial: PipelineSnapshot) -> Self {
        Self {
            shared: Arc::new(MonitorShared {
                snapshot: ArcSwap::from_pointee(initial),
                writes: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<PipelineSnapshot> {
        self.shared.snapshot.load_full()
    }

    /// Aggregate statistics from the most recent snapshot.
    pub fn stats(&self) -> RunStats {
        self.shared.snapshot.load().stats
    }

    /// One node output from the most recent snapshot.
    pub fn node_output(&self, node: NodeId, pin: &str) -> Option<Value> {
        self.shared
            .snapshot
            .load()
            .node(node)
            .and_then(|snap| snap.outputs.get(pin).cloned())
    }

    /// Queues a value for a node's input pin.
    ///
    /// The write lands before the next tick executes. Writes naming unknown
    /// nodes or pins are dropped with a warning when the queue drains.
    pub fn set_node_input(&self, node: NodeId, pin: impl Into<String>, value: Value) {
        self.shared.writes.lock().push(InputWrite {
            node,
            pin: pin.into(),
            value,
        });
    }

    pub(crate) fn publish(&self, snapshot: PipelineSnapshot) {
        self.shared.snapshot.store(Arc::new(snapshot));
    }

    pub(crate) fn drain_writes(&self) -> Vec<InputWrite> {
        std::mem::take(&mut *self.shared.writes.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_snapshot(state: PipelineState) -> PipelineSnapshot {
        PipelineSnapshot {
            pipeline_name: "probe".into(),
            state,
            stats: RunStats::default(),
            nodes: Vec::new(),
        }
    }

    #[test]
    fn publish_replaces_the_visible_snapshot() {
        let monitor = Monitor::new(empty_snapshot(PipelineState::Uncompiled));
        let reader = monitor.clone();
        assert_eq!(reader.snapshot().state, PipelineState::Uncompiled);

        monitor.publish(empty_snapshot(PipelineState::Running));
        assert_eq!(reader.snapshot().state, PipelineState::Running);
    }

    #[test]
    fn old_snapshots_stay_valid_after_publish() {
        let monitor = Monitor::new(empty_snapshot(PipelineState::Built));
        let held = monitor.snapshot();
        monitor.publish(empty_snapshot(PipelineState::Running));
        assert_eq!(held.state, PipelineState::Built);
        assert_eq!(monitor.snapshot().state, PipelineState::Running);
    }

    #[test]
    fn writes_queue_until_drained() {
        let monitor = Monitor::new(empty_snapshot(PipelineState::Running));
        monitor.set_node_input(NodeId(3), "in", Value::Float(1.5));
        monitor.set_node_input(NodeId(4), "gate", Value::Bool(true));

        let writes = monitor.drain_writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].node, NodeId(3));
        assert_eq!(writes[0].pin, "in");
        assert_eq!(writes[1].value, Value::Bool(true));
        assert!(monitor.drain_writes().is_empty());
    }
}
