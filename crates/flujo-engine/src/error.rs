//! Error types for graph compilation and pipeline lifecycle.

use flujo_block::{PinDirection, ValueKind};
use flujo_loader::LoaderError;
use thiserror::Error;

use crate::node::NodeId;
use crate::pipeline::PipelineState;

/// Errors raised while compiling a manifest into an executable graph.
///
/// All of these are fatal: a pipeline that fails to build never produces an
/// execution order and never runs.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Two node instances in the manifest share one id.
    #[error("duplicate node id {node} in manifest")]
    DuplicateNode {
        /// The repeated id.
        node: NodeId,
    },

    /// A node's type has no matching block reference in the manifest.
    #[error("node {node} references unknown block type '{block_type}'")]
    UnknownBlock {
        /// The node whose type failed to resolve.
        node: NodeId,
        /// The unresolved type name.
        block_type: String,
    },

    /// The provider failed to produce an instance for a node.
    #[error("failed to load block '{block_type}' for node {node}")]
    Load {
        /// The node being instantiated.
        node: NodeId,
        /// Its block type.
        block_type: String,
        /// The loader failure.
        #[source]
        source: LoaderError,
    },

    /// A connection endpoint names a node id absent from the manifest.
    #[error("connection references missing node {node}")]
    MissingNode {
        /// The unknown id.
        node: NodeId,
    },

    /// A connection endpoint names a pin its node does not declare.
    #[error("node {node} has no {direction} pin named '{pin}'")]
    MissingPin {
        /// The node at the endpoint.
        node: NodeId,
        /// The undeclared pin name.
        pin: String,
        /// Which side of the connection was checked.
        direction: PinDirection,
    },

    /// Source and destination pins disagree on the value type they carry.
    #[error(
        "connection {from}.{from_pin} -> {to}.{to_pin}: \
         source produces {produces}, destination expects {expects}"
    )]
    PinTypeMismatch {
        /// Source node.
        from: NodeId,
        /// Source output pin.
        from_pin: String,
        /// Type tag the source pin declares.
        produces: ValueKind,
        /// Destination node.
        to: NodeId,
        /// Destination input pin.
        to_pin: String,
        /// Type tag the destination pin declares.
        expects: ValueKind,
    },

    /// Two connections target the same input pin.
    #[error("input pin {to}.{to_pin} has more than one incoming connection")]
    DuplicateInputEdge {
        /// Destination node.
        to: NodeId,
        /// The doubly-wired input pin.
        to_pin: String,
    },

    /// The connection set contains a dependency cycle.
    #[error("pipeline graph contains a cycle through node {node}")]
    CycleDetected {
        /// A node on the cycle.
        node: NodeId,
    },
}

/// Errors raised by pipeline lifecycle operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Graph compilation failed.
    #[error("pipeline build failed")]
    Build(#[from] BuildError),

    /// An operation was invoked in a state that does not permit it.
    #[error("cannot {operation} a pipeline that is {actual} (expected {expected})")]
    State {
        /// The rejected operation.
        operation: &'static str,
        /// The state(s) the operation requires.
        expected: &'static str,
        /// The pipeline's actual state.
        actual: PipelineState,
    },
}
