//! Scale block: multiplies its float input by a configured factor.

use flujo_block::{
    Block, BlockCategory, BlockConfig, BlockError, Pin, Value, ValueKind, declare_block,
};

/// Processing-category block computing `out = in × factor` every tick.
///
/// Config keys: `factor` (float, default `1.0`). An input that has never
/// been written reads as `0.0`.
#[derive(Debug)]
pub struct ScaleBlock {
    factor: f64,
    input: f64,
    out: Option<Value>,
}

impl Default for ScaleBlock {
    fn default() -> Self {
        Self {
            factor: 1.0,
            input: 0.0,
            out: None,
        }
    }
}

impl Block for ScaleBlock {
    fn id(&self) -> &str {
        "scale"
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

    fn initialize(&mut self, config: &BlockConfig) -> Result<(), BlockError> {
        self.factor = config.float_or("factor", 1.0)?;
        Ok(())
    }

    fn execute(&mut self) -> Result<(), BlockError> {
        self.out = Some(Value::Float(self.input * self.factor));
        Ok(())
    }

    fn set_input(&mut self, pin: &str, value: Value) {
        if pin == "in"
            && let Some(v) = value.as_float()
        {
            self.input = v;
        }
    }

    fn output(&self, pin: &str) -> Option<Value> {
        (pin == "out").then(|| self.out.clone()).flatten()
    }
}

declare_block!(ScaleBlock);
