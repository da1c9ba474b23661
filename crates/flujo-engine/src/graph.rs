//! Graph compilation: node instantiation, connection validation, scheduling.
//!
//! Build walks the manifest in three passes. Nodes first: each node's type
//! resolves to a block reference and the provider mints a fresh instance.
//! Connections second: every endpoint must name an existing node and a
//! declared pin of the right direction, source and destination type tags
//! must agree, and no input pin may be wired twice. Ordering last: a
//! depth-first walk over the edge set produces the execution order and
//! rejects cycles.

use core::fmt;
use std::collections::{HashMap, HashSet};

use flujo_block::{BlockConfig, PinDirection, Value};
use flujo_manifest::PipelineManifest;
use tracing::{debug, error, trace};

use crate::error::BuildError;
use crate::node::{ExecutionNode, NodeHealth, NodeId};
use crate::provider::BlockProvider;

/// A validated connection, resolved to node slot indices.
#[derive(Debug, Clone)]
struct Edge {
    from: usize,
    from_pin: String,
    to: usize,
    to_pin: String,
}

/// Depth-first search colors for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Visited,
}

/// The compiled, executable form of a manifest.
pub struct ExecutionGraph {
    nodes: Vec<ExecutionNode>,
    index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    /// Edge indices grouped by source node slot.
    outgoing: Vec<Vec<usize>>,
    /// Node slots in execution order.
    order: Vec<usize>,
}

impl fmt::Debug for ExecutionGraph {
    // Manual: `ExecutionNode` owns a `Box<dyn Block>`, which carries no
    // `Debug` bound, so nodes print as ids only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionGraph")
            .field(
                "nodes",
                &self.nodes.iter().map(ExecutionNode::id).collect::<Vec<_>>(),
            )
            .field("edges", &self.edges)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl ExecutionGraph {
    /// A graph with no nodes; what an uncompiled pipeline holds.
    pub(crate) fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Compiles a manifest against a block provider.
    pub fn build(
        manifest: &PipelineManifest,
        provider: &mut dyn BlockProvider,
    ) -> Result<Self, BuildError> {
        let mut nodes = Vec::with_capacity(manifest.pipeline.nodes.len());
        let mut index = HashMap::new();

        for spec in &manifest.pipeline.nodes {
            let id = NodeId(spec.id);
            if index.contains_key(&id) {
                return Err(BuildError::DuplicateNode { node: id });
            }
            let reference =
                manifest
                    .reference_for(&spec.block_type)
                    .ok_or_else(|| BuildError::UnknownBlock {
                        node: id,
                        block_type: spec.block_type.clone(),
                    })?;
            let block = provider
                .provide(&reference.id, &reference.version)
                .map_err(|source| BuildError::Load {
                    node: id,
                    block_type: spec.block_type.clone(),
                    source,
                })?;
            debug!("graph_node: {id} '{}' v{}", reference.id, reference.version);
            index.insert(id, nodes.len());
            nodes.push(ExecutionNode::new(
                id,
                spec.block_type.clone(),
                block,
                BlockConfig::from(spec.config.clone()),
            ));
        }

        let mut edges = Vec::with_capacity(manifest.pipeline.connections.len());
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut claimed_inputs = HashSet::new();

        for conn in &manifest.pipeline.connections {
            let from_id = NodeId(conn.from_node_id);
            let to_id = NodeId(conn.to_node_id);
            let from = *index
                .get(&from_id)
                .ok_or(BuildError::MissingNode { node: from_id })?;
            let to = *index
                .get(&to_id)
                .ok_or(BuildError::MissingNode { node: to_id })?;

            let source =
                nodes[from]
                    .output_pin(&conn.from_pin)
                    .ok_or_else(|| BuildError::MissingPin {
                        node: from_id,
                        pin: conn.from_pin.clone(),
                        direction: PinDirection::Output,
                    })?;
            let dest =
                nodes[to]
                    .input_pin(&conn.to_pin)
                    .ok_or_else(|| BuildError::MissingPin {
                        node: to_id,
                        pin: conn.to_pin.clone(),
                        direction: PinDirection::Input,
                    })?;
            if source.kind != dest.kind {
                return Err(BuildError::PinTypeMismatch {
                    from: from_id,
                    from_pin: conn.from_pin.clone(),
                    produces: source.kind,
                    to: to_id,
                    to_pin: conn.to_pin.clone(),
                    expects: dest.kind,
                });
            }
            if !claimed_inputs.insert((to, conn.to_pin.clone())) {
                return Err(BuildError::DuplicateInputEdge {
                    to: to_id,
                    to_pin: conn.to_pin.clone(),
                });
            }

            debug!(
                "graph_edge: {from_id}.{} -> {to_id}.{}",
                conn.from_pin, conn.to_pin
            );
            outgoing[from].push(edges.len());
            edges.push(Edge {
                from,
                from_pin: conn.from_pin.clone(),
                to,
                to_pin: conn.to_pin.clone(),
            });
        }

        let order = topological_order(&nodes, &edges, &outgoing)?;
        Ok(Self {
            nodes,
            index,
            edges,
            outgoing,
            order,
        })
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of validated connections.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All nodes, in manifest order.
    pub fn nodes(&self) -> &[ExecutionNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [ExecutionNode] {
        &mut self.nodes
    }

    /// Looks up a node by manifest id.
    pub fn node(&self, id: NodeId) -> Option<&ExecutionNode> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Node ids in the order the tick loop executes them.
    pub fn execution_order(&self) -> Vec<NodeId> {
        self.order.iter().map(|&slot| self.nodes[slot].id()).collect()
    }

    /// Stages a value on a node's input pin, validating both names.
    ///
    /// Returns false when the node or pin does not exist; the caller decides
    /// how loudly to drop the write.
    pub(crate) fn stage_input(&mut self, node: NodeId, pin: &str, value: Value) -> bool {
        let Some(&slot) = self.index.get(&node) else {
            return false;
        };
        if self.nodes[slot].input_pin(pin).is_none() {
            return false;
        }
        self.nodes[slot].stage_input(pin, value);
        true
    }

    /// Executes every healthy node in order, pushing outputs downstream.
    ///
    /// Returns the number of node execute failures; the tick itself cannot
    /// fail.
    pub(crate) fn run_tick(&mut self) -> u32 {
        let mut errors = 0;
        for &slot in &self.order {
            if self.nodes[slot].health() == NodeHealth::Degraded {
                continue;
            }
            if let Err(err) = self.nodes[slot].execute() {
                errors += 1;
                error!(
                    "node {} ('{}') execute failed: {err}",
                    self.nodes[slot].id(),
                    self.nodes[slot].block_type()
                );
                continue;
            }
            transfer_outputs(&mut self.nodes, &self.edges, &self.outgoing[slot], slot);
        }
        errors
    }
}

/// Copies `slot`'s current outputs into downstream input caches.
fn transfer_outputs(nodes: &mut [ExecutionNode], edges: &[Edge], outgoing: &[usize], slot: usize) {
    for &edge in outgoing {
        let edge = &edges[edge];
        let Some(value) = nodes[slot].output(&edge.from_pin) else {
            continue;
        };
        let value = value.clone();
        trace!(
            "transfer: {}.{} -> {}.{}",
            nodes[slot].id(),
            edge.from_pin,
            nodes[edge.to].id(),
            edge.to_pin
        );
        nodes[edge.to].stage_input(edge.to_pin.clone(), value);
    }
}

/// Depth-first topological sort over the resolved edge set.
///
/// Revisiting a node that is still on the active path means the edge set
/// loops back on itself; the build fails naming that node.
fn topological_order(
    nodes: &[ExecutionNode],
    edges: &[Edge],
    outgoing: &[Vec<usize>],
) -> Result<Vec<usize>, BuildError> {
    let mut marks = vec![Mark::Unvisited; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());
    for slot in 0..nodes.len() {
        if marks[slot] == Mark::Unvisited {
            visit(slot, nodes, edges, outgoing, &mut marks, &mut order)?;
        }
    }
    // Postorder lists dependents before their sources; execution wants the
    // reverse.
    order.reverse();
    Ok(order)
}

fn visit(
    slot: usize,
    nodes: &[ExecutionNode],
    edges: &[Edge],
    outgoing: &[Vec<usize>],
    marks: &mut [Mark],
    order: &mut Vec<usize>,
) -> Result<(), BuildError> {
    marks[slot] = Mark::Visiting;
    for &edge in &outgoing[slot] {
        let next = edges[edge].to;
        match marks[next] {
            Mark::Visiting => {
                return Err(BuildError::CycleDetected {
                    node: nodes[next].id(),
                });
            }
            Mark::Unvisited => visit(next, nodes, edges, outgoing, marks, order)?,
            Mark::Visited => {}
        }
    }
    marks[slot] = Mark::Visited;
    order.push(slot);
    Ok(())
}
