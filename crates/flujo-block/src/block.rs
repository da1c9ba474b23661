//! The `Block` trait and related types.
//!
//! [`Block`] is the single contract between the pipeline runtime and every
//! plugin. The engine only ever sees `dyn Block`: blocks built into the
//! process (tests) and blocks loaded from compiled modules (production) are
//! indistinguishable behind it.
//!
//! ## Design Decisions
//!
//! - **Object-safe**: instances cross a binary boundary as trait objects; no
//!   generics, no associated types.
//!
//! - **Push-only data flow**: the engine pushes values in with
//!   [`Block::set_input`] before [`Block::execute`] and pulls results with
//!   [`Block::output`] after it. A block never reaches outside itself for
//!   data.
//!
//! - **Execute is side-effect-complete**: when `execute()` returns `Ok`,
//!   every declared output pin holds its value for this tick. Callers read
//!   outputs only after a successful `execute()`.

use core::fmt;

use crate::{BlockConfig, BlockError, Pin, Value};

/// Coarse role of a block within a pipeline.
///
/// Purely descriptive: the engine schedules by graph topology, not category.
/// Dashboards and manifests use it to group and label nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockCategory {
    /// Produces values from the outside world (accelerometer, GPIO, clock).
    Sensor,
    /// Transforms values (filter, scale, threshold, window).
    Processing,
    /// Runs model inference over its inputs.
    Model,
    /// Delivers values to the outside world (display, actuator, publisher).
    Output,
}

impl BlockCategory {
    /// Lowercase name used in manifests and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            BlockCategory::Sensor => "sensor",
            BlockCategory::Processing => "processing",
            BlockCategory::Model => "model",
            BlockCategory::Output => "output",
        }
    }
}

impl fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability contract every pipeline block implements.
///
/// One instance backs exactly one node in the execution graph and is owned
/// by it for the pipeline's lifetime. The engine drives the instance through
/// a fixed call sequence:
///
/// 1. `initialize(config)` — once, before the first tick. Parse
///    configuration eagerly here and fail closed; a failure marks the node
///    degraded for the rest of the run.
/// 2. Per tick: `set_input(..)` for each cached input, then `execute()`,
///    then `output(..)` for each declared output pin. An `execute` failure
///    is counted and logged; the tick continues with other nodes.
/// 3. `shutdown()` — once, at pipeline teardown. Must be idempotent.
///
/// `Send` is part of the contract: the engine may run the pipeline on a
/// thread other than the one that loaded the module.
pub trait Block: Send {
    /// Stable block type id, e.g. `"scale"`. Matches the manifest's block
    /// reference id and the compiled module's file name.
    fn id(&self) -> &str;

    /// Semantic version of this implementation, e.g. `"1.0.0"`.
    fn version(&self) -> &str;

    /// Coarse role tag.
    fn category(&self) -> BlockCategory;

    /// Declared input pins, in a stable order.
    fn input_pins(&self) -> Vec<Pin>;

    /// Declared output pins, in a stable order.
    fn output_pins(&self) -> Vec<Pin>;

    /// Parse configuration and acquire resources.
    ///
    /// Called exactly once before the first `execute()`. Configuration
    /// parsing must happen here (eager, fail-closed), not on first use.
    fn initialize(&mut self, config: &BlockConfig) -> Result<(), BlockError>;

    /// Run one pass: consume current inputs, produce all outputs.
    ///
    /// On `Ok`, every declared output pin must hold its value for this
    /// tick. Blocking I/O is permitted but stalls the whole tick.
    fn execute(&mut self) -> Result<(), BlockError>;

    /// Release resources. Idempotent; called at pipeline teardown.
    fn shutdown(&mut self) {}

    /// Store a value for an input pin, to be consumed by the next
    /// `execute()`. Unknown pin names are a no-op; the engine validates
    /// pin wiring at build time.
    fn set_input(&mut self, pin: &str, value: Value);

    /// Current value of an output pin, if `execute()` has produced one.
    /// Unknown pin names return `None`.
    fn output(&self, pin: &str) -> Option<Value>;
}
