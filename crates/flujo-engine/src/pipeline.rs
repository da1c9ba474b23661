//! The pipeline lifecycle: build, initialize, tick, shutdown.

use core::fmt;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use flujo_block::Value;
use flujo_manifest::PipelineManifest;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::graph::ExecutionGraph;
use crate::monitor::{Monitor, NodeSnapshot, PipelineSnapshot};
use crate::node::{ExecutionNode, NodeId};
use crate::provider::BlockProvider;

/// Lifecycle states of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Fresh from a manifest; no graph exists yet.
    Uncompiled,
    /// Graph compiled and ordered; nodes not yet initialized.
    Built,
    /// Nodes initialized; ready for the first tick.
    Initialized,
    /// At least one tick has run.
    Running,
    /// Terminal; nodes have been shut down.
    Shutdown,
}

impl PipelineState {
    /// Lowercase state name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            PipelineState::Uncompiled => "uncompiled",
            PipelineState::Built => "built",
            PipelineState::Initialized => "initialized",
            PipelineState::Running => "running",
            PipelineState::Shutdown => "shut down",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregate run statistics, updated once per completed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    /// Completed ticks.
    pub total_executions: u64,
    /// Node execute failures accumulated across all ticks.
    pub total_errors: u64,
    /// Running mean of tick wall-clock latency, in milliseconds.
    pub avg_tick_ms: f64,
}

impl RunStats {
    fn record_tick(&mut self, errors: u32, elapsed: Duration) {
        self.total_executions += 1;
        self.total_errors += u64::from(errors);
        let sample = elapsed.as_secs_f64() * 1e3;
        self.avg_tick_ms += (sample - self.avg_tick_ms) / self.total_executions as f64;
    }
}

/// Outcome of the initialize phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    /// Nodes in the graph.
    pub total: usize,
    /// Ids of nodes whose initialize failed, in manifest order.
    pub degraded: Vec<NodeId>,
}

impl InitReport {
    /// Every node initialized.
    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty()
    }

    /// Every node failed; running the pipeline would execute nothing.
    pub fn is_total_failure(&self) -> bool {
        self.total > 0 && self.degraded.len() == self.total
    }
}

/// Result of one pipeline tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Node execute failures during this tick.
    pub errors: u32,
    /// Wall-clock duration of the tick.
    pub elapsed: Duration,
}

/// A manifest bound to a block provider and driven through its lifecycle.
///
/// State transitions are strict: `build` from `Uncompiled`, `initialize`
/// from `Built`, `tick` from `Initialized` or `Running`. `shutdown` is the
/// exception and is accepted (idempotently) from any state. Out-of-order
/// calls return [`PipelineError::State`].
pub struct Pipeline {
    manifest: PipelineManifest,
    graph: ExecutionGraph,
    state: PipelineState,
    stats: RunStats,
    monitor: Monitor,
}

impl Pipeline {
    /// Wraps a parsed manifest; no blocks are loaded yet.
    pub fn new(manifest: PipelineManifest) -> Self {
        let monitor = Monitor::new(PipelineSnapshot {
            pipeline_name: manifest.pipeline_name.clone(),
            state: PipelineState::Uncompiled,
            stats: RunStats::default(),
            nodes: Vec::new(),
        });
        Self {
            manifest,
            graph: ExecutionGraph::empty(),
            state: PipelineState::Uncompiled,
            stats: RunStats::default(),
            monitor,
        }
    }

    /// The manifest this pipeline was created from.
    pub fn manifest(&self) -> &PipelineManifest {
        &self.manifest
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Aggregate statistics so far.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// A clonable observer handle for this pipeline.
    pub fn monitor(&self) -> Monitor {
        self.monitor.clone()
    }

    /// Compiles the manifest into an executable graph.
    pub fn build(&mut self, provider: &mut dyn BlockProvider) -> Result<(), PipelineError> {
        self.guard("build", "uncompiled", &[PipelineState::Uncompiled])?;
        let graph = ExecutionGraph::build(&self.manifest, provider)?;
        info!(
            "pipeline_build: '{}' compiled ({} nodes, {} connections)",
            self.manifest.pipeline_name,
            graph.node_count(),
            graph.edge_count()
        );
        self.graph = graph;
        self.state = PipelineState::Built;
        self.publish_snapshot();
        Ok(())
    }

    /// Initializes every node with its manifest configuration.
    ///
    /// Failing nodes are marked degraded and reported; the pipeline still
    /// transitions to `Initialized` so callers can run in degraded mode or
    /// bail on the report.
    pub fn initialize(&mut self) -> Result<InitReport, PipelineError> {
        self.guard("initialize", "built", &[PipelineState::Built])?;
        let mut degraded = Vec::new();
        for node in self.graph.nodes_mut() {
            if let Err(err) = node.initialize() {
                warn!(
                    "node {} ('{}') initialize failed: {err}",
                    node.id(),
                    node.block_type()
                );
                degraded.push(node.id());
            }
        }
        let report = InitReport {
            total: self.graph.node_count(),
            degraded,
        };
        if report.is_clean() {
            info!("pipeline_init: all {} nodes initialized", report.total);
        } else {
            warn!(
                "pipeline_init: {}/{} nodes degraded",
                report.degraded.len(),
                report.total
            );
        }
        self.state = PipelineState::Initialized;
        self.publish_snapshot();
        Ok(report)
    }

    /// Runs one full pass over the graph.
    ///
    /// Queued monitor writes apply first, then every healthy node executes
    /// in topological order with its outputs pushed downstream. Node-level
    /// failures are counted, never propagated.
    pub fn tick(&mut self) -> Result<TickOutcome, PipelineError> {
        self.guard(
            "tick",
            "initialized or running",
            &[PipelineState::Initialized, PipelineState::Running],
        )?;
        self.state = PipelineState::Running;
        self.apply_queued_writes();

        let started = Instant::now();
        let errors = self.graph.run_tick();
        let elapsed = started.elapsed();

        self.stats.record_tick(errors, elapsed);
        self.publish_snapshot();
        Ok(TickOutcome { errors, elapsed })
    }

    /// Shuts down every built node and parks the pipeline.
    ///
    /// Safe from any state, including repeated calls and pipelines that were
    /// never built (there are no nodes to release yet).
    pub fn shutdown(&mut self) {
        if self.state == PipelineState::Shutdown {
            return;
        }
        for node in self.graph.nodes_mut() {
            node.shutdown();
        }
        info!("pipeline_shutdown: '{}'", self.manifest.pipeline_name);
        self.state = PipelineState::Shutdown;
        self.publish_snapshot();
    }

    /// All execution nodes, in manifest order.
    pub fn nodes(&self) -> &[ExecutionNode] {
        self.graph.nodes()
    }

    /// One node's current output value.
    pub fn node_output(&self, node: NodeId, pin: &str) -> Option<Value> {
        self.graph
            .node(node)
            .and_then(|n| n.output(pin).cloned())
    }

    /// One node's full output cache.
    pub fn node_outputs(&self, node: NodeId) -> Option<&BTreeMap<String, Value>> {
        self.graph.node(node).map(ExecutionNode::outputs)
    }

    /// Node ids in tick execution order.
    pub fn execution_order(&self) -> Vec<NodeId> {
        self.graph.execution_order()
    }

    fn guard(
        &self,
        operation: &'static str,
        expected: &'static str,
        allowed: &[PipelineState],
    ) -> Result<(), PipelineError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(PipelineError::State {
                operation,
                expected,
                actual: self.state,
            })
        }
    }

    fn apply_queued_writes(&mut self) {
        for write in self.monitor.drain_writes() {
            if !self.graph.stage_input(write.node, &write.pin, write.value) {
                warn!(
                    "monitor write dropped: node {} has no input pin '{}'",
                    write.node, write.pin
                );
            }
        }
    }

    fn publish_snapshot(&self) {
        let nodes = self
            .graph
            .nodes()
            .iter()
            .map(|node| NodeSnapshot {
                id: node.id(),
                block_type: node.block_type().to_string(),
                health: node.health(),
                exec_errors: node.exec_errors(),
                outputs: node.outputs().clone(),
            })
            .collect();
        self.monitor.publish(PipelineSnapshot {
            pipeline_name: self.manifest.pipeline_name.clone(),
            state: self.state,
            stats: self.stats,
            nodes,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_pipeline() -> Pipeline {
        let manifest = PipelineManifest::from_json(r#"{"pipeline_name": "empty"}"#).unwrap();
        Pipeline::new(manifest)
    }

    #[test]
    fn operations_out_of_order_are_state_errors() {
        let mut pipeline = empty_pipeline();
        assert_eq!(pipeline.state(), PipelineState::Uncompiled);

        let err = pipeline.initialize().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::State {
                operation: "initialize",
                ..
            }
        ));
        let err = pipeline.tick().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::State { operation: "tick", .. }
        ));
    }

    #[test]
    fn shutdown_is_idempotent_from_any_state() {
        let mut pipeline = empty_pipeline();
        pipeline.shutdown();
        assert_eq!(pipeline.state(), PipelineState::Shutdown);
        pipeline.shutdown();
        assert_eq!(pipeline.state(), PipelineState::Shutdown);

        // Everything but another shutdown is now rejected.
        assert!(pipeline.tick().is_err());
    }

    #[test]
    fn running_average_converges_on_the_samples() {
        let mut stats = RunStats::default();
        stats.record_tick(0, Duration::from_millis(10));
        stats.record_tick(2, Duration::from_millis(20));
        stats.record_tick(1, Duration::from_millis(30));

        assert_eq!(stats.total_executions, 3);
        assert_eq!(stats.total_errors, 3);
        assert!((stats.avg_tick_ms - 20.0).abs() < 1e-9, "{}", stats.avg_tick_ms);
    }

    #[test]
    fn total_failure_requires_at_least_one_node() {
        let clean = InitReport {
            total: 0,
            degraded: Vec::new(),
        };
        assert!(clean.is_clean());
        assert!(!clean.is_total_failure());

        let broken = InitReport {
            total: 2,
            degraded: vec![NodeId(1), NodeId(2)],
        };
        assert!(!broken.is_clean());
        assert!(broken.is_total_failure());
    }
}
