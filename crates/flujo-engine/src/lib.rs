//! Pipeline compilation and execution.
//!
//! This crate turns a parsed [`PipelineManifest`](flujo_manifest::PipelineManifest)
//! into a live graph of block instances and drives it through its lifecycle:
//!
//! 1. [`Pipeline::build`] resolves every node's block type through a
//!    [`BlockProvider`], validates the connection set (endpoints, pin
//!    directions, value types, single writer per input pin), and computes a
//!    topological execution order, rejecting cycles.
//! 2. [`Pipeline::initialize`] configures each node; nodes that fail are
//!    marked degraded and skipped thereafter rather than aborting the run.
//! 3. [`Pipeline::tick`] executes nodes in order and pushes output values
//!    along connections into downstream input caches. Per-node execute
//!    failures are counted and logged, never fatal.
//! 4. [`Pipeline::shutdown`] releases every node; idempotent from any state.
//!
//! A fixed-rate loop lives in [`TickRunner`], cancelled cooperatively through
//! a [`CancelToken`]. Concurrent observers never touch live graph state: each
//! tick publishes an immutable [`PipelineSnapshot`] that [`Monitor`] handles
//! load atomically, and monitor writes queue until the next tick boundary.

pub mod error;
pub mod graph;
pub mod monitor;
pub mod node;
pub mod pipeline;
pub mod provider;
pub mod runner;

pub use error::{BuildError, PipelineError};
pub use graph::ExecutionGraph;
pub use monitor::{Monitor, NodeSnapshot, PipelineSnapshot};
pub use node::{ExecutionNode, NodeHealth, NodeId};
pub use pipeline::{InitReport, Pipeline, PipelineState, RunStats, TickOutcome};
pub use provider::BlockProvider;
pub use runner::{CancelToken, TickRunner};
