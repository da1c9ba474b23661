//! Runtime node state: one block instance plus its pin value caches.

use core::fmt;
use std::collections::BTreeMap;

use flujo_block::{Block, BlockConfig, BlockError, Pin, Value};

/// Manifest-scoped node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id)
    }
}

/// Whether a node participates in tick execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeHealth {
    /// Executing normally.
    Ok,
    /// `initialize` failed; the tick loop skips this node.
    Degraded,
}

/// One placement of a block in the executable graph.
///
/// The node exclusively owns its block instance and the two value caches
/// around it: inputs staged by upstream transfers (or queued monitor writes)
/// and outputs captured after each successful execute. Pin descriptor lists
/// are fetched once at construction; the contract requires them to be stable.
pub struct ExecutionNode {
    id: NodeId,
    block_type: String,
    block: Box<dyn Block>,
    config: BlockConfig,
    input_pins: Vec<Pin>,
    output_pins: Vec<Pin>,
    inputs: BTreeMap<String, Value>,
    outputs: BTreeMap<String, Value>,
    health: NodeHealth,
    exec_errors: u64,
}

impl ExecutionNode {
    pub(crate) fn new(
        id: NodeId,
        block_type: impl Into<String>,
        block: Box<dyn Block>,
        config: BlockConfig,
    ) -> Self {
        let input_pins = block.input_pins();
        let output_pins = block.output_pins();
        Self {
            id,
            block_type: block_type.into(),
            block,
            config,
            input_pins,
            output_pins,
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            health: NodeHealth::Ok,
            exec_errors: 0,
        }
    }

    /// The manifest id of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The block type name this node instantiates.
    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    /// Whether the node is still executing.
    pub fn health(&self) -> NodeHealth {
        self.health
    }

    /// Execute failures recorded against this node.
    pub fn exec_errors(&self) -> u64 {
        self.exec_errors
    }

    /// Input pins declared by the block.
    pub fn input_pins(&self) -> &[Pin] {
        &self.input_pins
    }

    /// Output pins declared by the block.
    pub fn output_pins(&self) -> &[Pin] {
        &self.output_pins
    }

    /// Looks up a declared input pin by name.
    pub fn input_pin(&self, name: &str) -> Option<&Pin> {
        self.input_pins.iter().find(|pin| pin.name == name)
    }

    /// Looks up a declared output pin by name.
    pub fn output_pin(&self, name: &str) -> Option<&Pin> {
        self.output_pins.iter().find(|pin| pin.name == name)
    }

    /// The most recent output value on `pin`, if the node has produced one.
    pub fn output(&self, pin: &str) -> Option<&Value> {
        self.outputs.get(pin)
    }

    /// The full output cache.
    pub fn outputs(&self) -> &BTreeMap<String, Value> {
        &self.outputs
    }

    /// The staged input cache.
    pub fn inputs(&self) -> &BTreeMap<String, Value> {
        &self.inputs
    }

    /// Stages a value for the block's next execute.
    pub(crate) fn stage_input(&mut self, pin: impl Into<String>, value: Value) {
        self.inputs.insert(pin.into(), value);
    }

    /// Runs the block's initialize; a failure marks the node degraded.
    pub(crate) fn initialize(&mut self) -> Result<(), BlockError> {
        match self.block.initialize(&self.config) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.health = NodeHealth::Degraded;
                Err(err)
            }
        }
    }

    /// Flushes staged inputs into the block, executes it, and on success
    /// refreshes the output cache from every declared output pin.
    ///
    /// On failure the error counter advances and the output cache keeps its
    /// previous (now stale) values.
    pub(crate) fn execute(&mut self) -> Result<(), BlockError> {
        for (pin, value) in &self.inputs {
            self.block.set_input(pin, value.clone());
        }
        match self.block.execute() {
            Ok(()) => {
                for pin in &self.output_pins {
                    if let Some(value) = self.block.output(&pin.name) {
                        self.outputs.insert(pin.name.clone(), value);
                    }
                }
                Ok(())
            }
            Err(err) => {
                self.exec_errors += 1;
                Err(err)
            }
        }
    }

    pub(crate) fn shutdown(&mut self) {
        self.block.shutdown();
    }
}
