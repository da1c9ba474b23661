//! Console block: terminal sink that reports whatever reaches its input.

use flujo_block::{
    Block, BlockCategory, BlockConfig, BlockError, Pin, Value, ValueKind, declare_block,
};

/// Output-category block that logs the most recent value on its `in` pin.
///
/// Config keys: `label` (text, default `"console"`) prefixes every report so
/// multiple sinks in one pipeline stay distinguishable. Ticks where no value
/// has arrived yet produce no output.
#[derive(Debug)]
pub struct ConsoleBlock {
    label: String,
    last: Option<Value>,
}

impl Default for ConsoleBlock {
    fn default() -> Self {
        Self {
            label: "console".to_string(),
            last: None,
        }
    }
}

impl ConsoleBlock {
    /// The value most recently written to `in`, if any.
    pub fn last_value(&self) -> Option<&Value> {
        self.last.as_ref()
    }
}

impl Block for ConsoleBlock {
    fn id(&self) -> &str {
        "console"
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

    fn initialize(&mut self, config: &BlockConfig) -> Result<(), BlockError> {
        if let Some(label) = config.get("label") {
            self.label = label.to_string();
        }
        Ok(())
    }

    fn execute(&mut self) -> Result<(), BlockError> {
        if let Some(value) = &self.last {
            tracing::info!("{}: {value}", self.label);
        }
        Ok(())
    }

    fn set_input(&mut self, pin: &str, value: Value) {
        if pin == "in" {
            self.last = Some(value);
        }
    }

    fn output(&self, _pin: &str) -> Option<Value> {
        None
    }
}

declare_block!(ConsoleBlock);
