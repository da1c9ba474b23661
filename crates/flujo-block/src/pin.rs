//! Pin descriptors: the typed slots a block exposes.

use core::fmt;

use crate::ValueKind;

/// Which way data flows through a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinDirection {
    /// The pin consumes values written by an upstream connection.
    Input,
    /// The pin produces values read by downstream connections.
    Output,
}

impl PinDirection {
    /// Lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            PinDirection::Input => "input",
            PinDirection::Output => "output",
        }
    }
}

impl fmt::Display for PinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable descriptor for one input or output slot on a block.
///
/// Pins are metadata only: they carry no storage. The engine keeps the
/// actual values in per-node caches keyed by pin name, and uses the
/// descriptors to validate connections at build time. A pin name is unique
/// within its block and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    /// Name, unique within the owning block and direction.
    pub name: String,
    /// Type tag of every value this pin carries.
    pub kind: ValueKind,
    /// Data flow direction.
    pub direction: PinDirection,
}

impl Pin {
    /// Describe an input pin.
    pub fn input(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            direction: PinDirection::Input,
        }
    }

    /// Describe an output pin.
    pub fn output(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            direction: PinDirection::Output,
        }
    }
}
