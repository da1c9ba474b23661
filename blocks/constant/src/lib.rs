//! Constant source block: emits one configured float every tick.

use flujo_block::{
    Block, BlockCategory, BlockConfig, BlockError, Pin, Value, ValueKind, declare_block,
};

/// Sensor-category block producing a configured constant on its `out` pin.
///
/// Config keys: `value` (float, default `0.0`).
#[derive(Debug, Default)]
pub struct ConstantBlock {
    value: f64,
    out: Option<Value>,
}

impl Block for ConstantBlock {
    fn id(&self) -> &str {
        "constant"
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
        self.out = Some(Value::Float(self.value));
        Ok(())
    }

    fn set_input(&mut self, _pin: &str, _value: Value) {}

    fn output(&self, pin: &str) -> Option<Value> {
        (pin == "out").then(|| self.out.clone()).flatten()
    }
}

declare_block!(ConstantBlock);
