//! Full pipeline lifecycle tests over in-process mock blocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use flujo_block::{Block, BlockCategory, BlockConfig, BlockError, Pin, Value, ValueKind};
use flujo_engine::{
    BlockProvider, NodeHealth, NodeId, Pipeline, PipelineError, PipelineState,
};
use flujo_loader::LoaderError;
use flujo_manifest::PipelineManifest;

/// Emits a configured float on `out` every tick.
#[derive(Default)]
struct Emit {
    value: f64,
}

impl Block for Emit {
    fn id(&self) -> &str {
        "emit"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn category(&self) -> BlockCategory {
        BlockCategory::Sensor
    }
    fn input_pins(&self) -> Vec<Pin> {
        Vec::new()
    }
    fn output_pins(&self) -> Vec<Pin> {
        vec![Pin::output("out", ValueKind::Float)]
    }
    fn initialize(&mut self, config: &BlockConfig) -> Result<(), BlockError> {
        self.value = config.float_or("value", 0.0)?;
        Ok(())
    }
    fn execute(&mut self) -> Result<(), BlockError> {
        Ok(())
    }
    fn set_input(&mut self, _pin: &str, _value: Value) {}
    fn output(&self, pin: &str) -> Option<Value> {
        (pin == "out").then(|| Value::Float(self.value))
    }
}

/// Copies `in` to `echoed`.
#[derive(Default)]
struct Relay {
    last: Option<Value>,
}

impl Block for Relay {
    fn id(&self) -> &str {
        "relay"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn category(&self) -> BlockCategory {
        BlockCategory::Processing
    }
    fn input_pins(&self) -> Vec<Pin> {
        vec![Pin::input("in", ValueKind::Float)]
    }
    fn output_pins(&self) -> Vec<Pin> {
        vec![Pin::output("echoed", ValueKind::Float)]
    }
    fn initialize(&mut self, _config: &BlockConfig) -> Result<(), BlockError> {
        Ok(())
    }
    fn execute(&mut self) -> Result<(), BlockError> {
        Ok(())
    }
    fn set_input(&mut self, pin: &str, value: Value) {
        if pin == "in" {
            self.last = Some(value);
        }
    }
    fn output(&self, pin: &str) -> Option<Value> {
        (pin == "echoed").then(|| self.last.clone()).flatten()
    }
}

/// Accepts input but fails every execute.
#[derive(Default)]
struct Fail;

impl Block for Fail {
    fn id(&self) -> &str {
        "fail"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn category(&self) -> BlockCategory {
        BlockCategory::Processing
    }
    fn input_pins(&self) -> Vec<Pin> {
        vec![Pin::input("in", ValueKind::Float)]
    }
    fn output_pins(&self) -> Vec<Pin> {
        vec![Pin::output("out", ValueKind::Float)]
    }
    fn initialize(&mut self, _config: &BlockConfig) -> Result<(), BlockError> {
        Ok(())
    }
    fn execute(&mut self) -> Result<(), BlockError> {
        Err(BlockError::exec("always broken"))
    }
    fn set_input(&mut self, _pin: &str, _value: Value) {}
    fn output(&self, _pin: &str) -> Option<Value> {
        None
    }
}

/// Refuses to initialize.
#[derive(Default)]
struct Sulk;

impl Block for Sulk {
    fn id(&self) -> &str {
        "sulk"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn category(&self) -> BlockCategory {
        BlockCategory::Output
    }
    fn input_pins(&self) -> Vec<Pin> {
        vec![Pin::input("in", ValueKind::Float)]
    }
    fn output_pins(&self) -> Vec<Pin> {
        Vec::new()
    }
    fn initialize(&mut self, _config: &BlockConfig) -> Result<(), BlockError> {
        Err(BlockError::init("refusing"))
    }
    fn execute(&mut self) -> Result<(), BlockError> {
        Ok(())
    }
    fn set_input(&mut self, _pin: &str, _value: Value) {}
    fn output(&self, _pin: &str) -> Option<Value> {
        None
    }
}

/// Counts shutdown calls through a shared counter.
struct ShutdownProbe {
    hits: Arc<AtomicU32>,
}

impl Block for ShutdownProbe {
    fn id(&self) -> &str {
        "probe"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn category(&self) -> BlockCategory {
        BlockCategory::Output
    }
    fn input_pins(&self) -> Vec<Pin> {
        Vec::new()
    }
    fn output_pins(&self) -> Vec<Pin> {
        Vec::new()
    }
    fn initialize(&mut self, _config: &BlockConfig) -> Result<(), BlockError> {
        Ok(())
    }
    fn execute(&mut self) -> Result<(), BlockError> {
        Ok(())
    }
    fn shutdown(&mut self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }
    fn set_input(&mut self, _pin: &str, _value: Value) {}
    fn output(&self, _pin: &str) -> Option<Value> {
        None
    }
}

/// Provider stocked with every mock above.
#[derive(Default)]
struct Shelf {
    shutdown_hits: Arc<AtomicU32>,
}

impl BlockProvider for Shelf {
    fn is_available(&self, id: &str, _version: &str) -> bool {
        matches!(id, "emit" | "relay" | "fail" | "sulk" | "probe")
    }

    fn provide(&mut self, id: &str, version: &str) -> Result<Box<dyn Block>, LoaderError> {
        match id {
            "emit" => Ok(Box::new(Emit::default())),
            "relay" => Ok(Box::new(Relay::default())),
            "fail" => Ok(Box::new(Fail)),
            "sulk" => Ok(Box::new(Sulk)),
            "probe" => Ok(Box::new(ShutdownProbe {
                hits: Arc::clone(&self.shutdown_hits),
            })),
            _ => Err(LoaderError::module_not_found(id, version, "nowhere")),
        }
    }
}

fn manifest(nodes: &str, connections: &str) -> PipelineManifest {
    let text = format!(
        r#"{{
            "format_version": "1.0",
            "pipeline_name": "engine-test",
            "target_platform": "any",
            "blocks": [
                {{"id": "emit", "version": "1.0.0", "type": "sensor"}},
                {{"id": "relay", "version": "1.0.0", "type": "processing"}},
                {{"id": "fail", "version": "1.0.0", "type": "processing"}},
                {{"id": "sulk", "version": "1.0.0", "type": "output"}},
                {{"id": "probe", "version": "1.0.0", "type": "output"}}
            ],
            "pipeline": {{"nodes": [{nodes}], "connections": [{connections}]}}
        }}"#
    );
    PipelineManifest::from_json(&text).unwrap()
}

fn ready_pipeline(nodes: &str, connections: &str) -> Pipeline {
    let mut pipeline = Pipeline::new(manifest(nodes, connections));
    pipeline.build(&mut Shelf::default()).unwrap();
    let report = pipeline.initialize().unwrap();
    assert!(report.is_clean(), "degraded: {:?}", report.degraded);
    pipeline
}

#[test]
fn one_tick_carries_a_value_end_to_end() {
    let mut pipeline = ready_pipeline(
        r#"{"id": 1, "type": "emit", "config": {"value": 3.0}},
           {"id": 2, "type": "relay"}"#,
        r#"{"from_node_id": 1, "from_pin": "out", "to_node_id": 2, "to_pin": "in"}"#,
    );

    let outcome = pipeline.tick().unwrap();
    assert_eq!(outcome.errors, 0);
    assert_eq!(pipeline.state(), PipelineState::Running);
    assert_eq!(
        pipeline.node_output(NodeId(2), "echoed"),
        Some(Value::Float(3.0))
    );

    let stats = pipeline.stats();
    assert_eq!(stats.total_executions, 1);
    assert_eq!(stats.total_errors, 0);
}

#[test]
fn fan_out_reaches_every_destination() {
    let mut pipeline = ready_pipeline(
        r#"{"id": 1, "type": "emit", "config": {"value": 7.25}},
           {"id": 2, "type": "relay"},
           {"id": 3, "type": "relay"},
           {"id": 4, "type": "relay"}"#,
        r#"{"from_node_id": 1, "from_pin": "out", "to_node_id": 2, "to_pin": "in"},
           {"from_node_id": 1, "from_pin": "out", "to_node_id": 3, "to_pin": "in"},
           {"from_node_id": 1, "from_pin": "out", "to_node_id": 4, "to_pin": "in"}"#,
    );

    pipeline.tick().unwrap();
    for id in [2, 3, 4] {
        assert_eq!(
            pipeline.node_output(NodeId(id), "echoed"),
            Some(Value::Float(7.25)),
            "node {id}"
        );
    }
}

#[test]
fn failing_node_never_stalls_the_rest_of_the_graph() {
    // Two independent branches off one source; the failing branch's relay
    // must starve while the healthy branch keeps flowing.
    let mut pipeline = ready_pipeline(
        r#"{"id": 1, "type": "emit", "config": {"value": 3.0}},
           {"id": 2, "type": "relay"},
           {"id": 3, "type": "fail"},
           {"id": 4, "type": "relay"}"#,
        r#"{"from_node_id": 1, "from_pin": "out", "to_node_id": 2, "to_pin": "in"},
           {"from_node_id": 1, "from_pin": "out", "to_node_id": 3, "to_pin": "in"},
           {"from_node_id": 3, "from_pin": "out", "to_node_id": 4, "to_pin": "in"}"#,
    );

    for _ in 0..2 {
        let outcome = pipeline.tick().unwrap();
        assert_eq!(outcome.errors, 1);
    }

    assert_eq!(
        pipeline.node_output(NodeId(2), "echoed"),
        Some(Value::Float(3.0))
    );
    assert_eq!(pipeline.node_output(NodeId(4), "echoed"), None);
    assert_eq!(pipeline.stats().total_errors, 2);

    let snapshot = pipeline.monitor().snapshot();
    let broken = snapshot.node(NodeId(3)).unwrap();
    assert_eq!(broken.exec_errors, 2);
    // Execute failures do not degrade a node; it keeps being scheduled.
    assert_eq!(broken.health, NodeHealth::Ok);
}

#[test]
fn degraded_node_is_reported_and_skipped() {
    let mut pipeline = Pipeline::new(manifest(
        r#"{"id": 1, "type": "sulk"},
           {"id": 2, "type": "emit", "config": {"value": 1.0}}"#,
        "",
    ));
    pipeline.build(&mut Shelf::default()).unwrap();

    let report = pipeline.initialize().unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.degraded, vec![NodeId(1)]);
    assert!(!report.is_clean());
    assert!(!report.is_total_failure());

    // The degraded node is skipped, not executed into an error.
    let outcome = pipeline.tick().unwrap();
    assert_eq!(outcome.errors, 0);

    let snapshot = pipeline.monitor().snapshot();
    assert_eq!(snapshot.node(NodeId(1)).unwrap().health, NodeHealth::Degraded);
    assert_eq!(snapshot.node(NodeId(2)).unwrap().health, NodeHealth::Ok);
}

#[test]
fn every_node_degraded_is_a_total_failure() {
    let mut pipeline = Pipeline::new(manifest(
        r#"{"id": 1, "type": "sulk"}, {"id": 2, "type": "sulk"}"#,
        "",
    ));
    pipeline.build(&mut Shelf::default()).unwrap();
    let report = pipeline.initialize().unwrap();
    assert!(report.is_total_failure());
}

#[test]
fn monitor_snapshots_follow_the_lifecycle() {
    let mut pipeline = Pipeline::new(manifest(
        r#"{"id": 1, "type": "emit", "config": {"value": 2.0}},
           {"id": 2, "type": "relay"}"#,
        r#"{"from_node_id": 1, "from_pin": "out", "to_node_id": 2, "to_pin": "in"}"#,
    ));
    let monitor = pipeline.monitor();
    assert_eq!(monitor.snapshot().state, PipelineState::Uncompiled);
    assert_eq!(monitor.snapshot().pipeline_name, "engine-test");

    pipeline.build(&mut Shelf::default()).unwrap();
    assert_eq!(monitor.snapshot().state, PipelineState::Built);
    assert_eq!(monitor.snapshot().nodes.len(), 2);

    pipeline.initialize().unwrap();
    pipeline.tick().unwrap();

    let snapshot = monitor.snapshot();
    assert_eq!(snapshot.state, PipelineState::Running);
    assert_eq!(snapshot.stats.total_executions, 1);
    assert_eq!(
        snapshot.node(NodeId(2)).unwrap().outputs.get("echoed"),
        Some(&Value::Float(2.0))
    );
    assert_eq!(
        monitor.node_output(NodeId(2), "echoed"),
        Some(Value::Float(2.0))
    );

    pipeline.shutdown();
    assert_eq!(monitor.snapshot().state, PipelineState::Shutdown);
}

#[test]
fn queued_monitor_writes_apply_on_the_next_tick() {
    // Node 2 has no incoming connection; the monitor is its only source.
    let mut pipeline = ready_pipeline(r#"{"id": 2, "type": "relay"}"#, "");
    let monitor = pipeline.monitor();

    monitor.set_node_input(NodeId(2), "in", Value::Float(9.0));
    // Writes naming unknown targets are dropped at apply time.
    monitor.set_node_input(NodeId(99), "in", Value::Float(1.0));
    monitor.set_node_input(NodeId(2), "bogus", Value::Float(1.0));

    pipeline.tick().unwrap();
    assert_eq!(
        pipeline.node_output(NodeId(2), "echoed"),
        Some(Value::Float(9.0))
    );
}

#[test]
fn out_of_order_operations_are_rejected() {
    let mut pipeline = Pipeline::new(manifest(r#"{"id": 1, "type": "emit"}"#, ""));

    assert!(matches!(
        pipeline.tick().unwrap_err(),
        PipelineError::State { operation: "tick", .. }
    ));

    pipeline.build(&mut Shelf::default()).unwrap();
    assert!(matches!(
        pipeline.build(&mut Shelf::default()).unwrap_err(),
        PipelineError::State { operation: "build", .. }
    ));

    pipeline.initialize().unwrap();
    assert!(matches!(
        pipeline.initialize().unwrap_err(),
        PipelineError::State {
            operation: "initialize",
            ..
        }
    ));

    pipeline.shutdown();
    assert!(pipeline.tick().is_err());
}

#[test]
fn shutdown_reaches_each_node_exactly_once() {
    let mut shelf = Shelf::default();
    let hits = Arc::clone(&shelf.shutdown_hits);

    let mut pipeline = Pipeline::new(manifest(
        r#"{"id": 1, "type": "probe"}, {"id": 2, "type": "probe"}"#,
        "",
    ));
    pipeline.build(&mut shelf).unwrap();
    pipeline.initialize().unwrap();

    pipeline.shutdown();
    assert_eq!(hits.load(Ordering::Relaxed), 2);
    pipeline.shutdown();
    assert_eq!(hits.load(Ordering::Relaxed), 2);
}

#[test]
fn execution_order_follows_connections_not_manifest_order() {
    let pipeline = {
        let mut pipeline = Pipeline::new(manifest(
            r#"{"id": 1, "type": "relay"},
               {"id": 2, "type": "relay"},
               {"id": 3, "type": "emit", "config": {"value": 1.0}}"#,
            r#"{"from_node_id": 3, "from_pin": "out", "to_node_id": 1, "to_pin": "in"},
               {"from_node_id": 1, "from_pin": "echoed", "to_node_id": 2, "to_pin": "in"}"#,
        ));
        pipeline.build(&mut Shelf::default()).unwrap();
        pipeline
    };

    assert_eq!(
        pipeline.execution_order(),
        vec![NodeId(3), NodeId(1), NodeId(2)]
    );
}
