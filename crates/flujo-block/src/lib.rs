//! Flujo Block Contract - the capability interface every pipeline block implements.
//!
//! This crate defines the narrow boundary between the pipeline runtime and the
//! block plugins it loads at runtime. It has no dependencies on the rest of the
//! workspace; both the host (loader, engine) and every plugin crate build
//! against it.
//!
//! # Core Abstractions
//!
//! ## The Contract
//!
//! - [`Block`] - Object-safe trait for all pipeline blocks
//! - [`BlockCategory`] - Coarse role tag (sensor / processing / model / output)
//!
//! ## Value Model
//!
//! - [`Value`] - Closed tagged union carried across pin connections
//! - [`ValueKind`] - The type tag a pin declares
//! - [`Pin`] - Immutable descriptor: name, type tag, direction
//!
//! ## Configuration
//!
//! - [`BlockConfig`] - String-keyed, string-valued map handed to
//!   [`Block::initialize`]; typed accessors parse eagerly and fail closed
//!
//! ## Plugin ABI
//!
//! - [`ffi`] - The two-symbol C entry-point surface a compiled block module
//!   exports, and the [`declare_block!`] macro that emits it
//!
//! # Example
//!
//! ```rust
//! use flujo_block::{Block, BlockCategory, BlockConfig, BlockError, Pin, Value, ValueKind};
//!
//! #[derive(Default)]
//! struct Doubler {
//!     input: f64,
//!     output: Option<Value>,
//! }
//!
//! impl Block for Doubler {
//!     fn id(&self) -> &str {
//!         "doubler"
//!     }
//!
//!     fn version(&self) -> &str {
//!         "1.0.0"
//!     }
//!
//!     fn category(&self) -> BlockCategory {
//!         BlockCategory::Processing
//!     }
//!
//!     fn input_pins(&self) -> Vec<Pin> {
//!         vec![Pin::input("in", ValueKind::Float)]
//!     }
//!
//!     fn output_pins(&self) -> Vec<Pin> {
//!         vec![Pin::output("out", ValueKind::Float)]
//!     }
//!
//!     fn initialize(&mut self, _config: &BlockConfig) -> Result<(), BlockError> {
//!         Ok(())
//!     }
//!
//!     fn execute(&mut self) -> Result<(), BlockError> {
//!         self.output = Some(Value::Float(self.input * 2.0));
//!         Ok(())
//!     }
//!
//!     fn set_input(&mut self, pin: &str, value: Value) {
//!         if pin == "in"
//!             && let Some(v) = value.as_float()
//!         {
//!             self.input = v;
//!         }
//!     }
//!
//!     fn output(&self, pin: &str) -> Option<Value> {
//!         (pin == "out").then(|| self.output.clone()).flatten()
//!     }
//! }
//! ```

pub mod block;
pub mod config;
pub mod error;
pub mod ffi;
pub mod pin;
pub mod value;

// Re-export main types at crate root
pub use block::{Block, BlockCategory};
pub use config::BlockConfig;
pub use error::BlockError;
pub use pin::{Pin, PinDirection};
pub use value::{Value, ValueKind};
