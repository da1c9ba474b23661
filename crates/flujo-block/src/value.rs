//! The tagged value union transferred between pins.

use core::fmt;

/// A single value carried across a pin connection.
///
/// This is a closed union: every inter-block transfer in the pipeline is
/// exactly one `Value`. Blocks negotiate which variant a pin carries through
/// the [`ValueKind`] tag on their [`Pin`](crate::Pin) descriptors, and the
/// engine rejects connections whose tags disagree at build time, so a block
/// can rely on receiving the variant its pin declared.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit float scalar.
    Float(f64),
    /// 64-bit signed integer scalar.
    Integer(i64),
    /// Boolean flag.
    Bool(bool),
    /// UTF-8 text.
    Text(String),
    /// Ordered sequence of 32-bit floats (sample windows, feature vectors).
    FloatVector(Vec<f32>),
}

impl Value {
    /// The type tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Integer(_) => ValueKind::Integer,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
            Value::FloatVector(_) => ValueKind::FloatVector,
        }
    }

    /// The float payload, if this is a [`Value::Float`].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer payload, if this is a [`Value::Integer`].
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// The boolean payload, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The text payload, if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// The vector payload, if this is a [`Value::FloatVector`].
    pub fn as_float_vector(&self) -> Option<&[f32]> {
        match self {
            Value::FloatVector(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
            Value::FloatVector(v) => write!(f, "[{} floats]", v.len()),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<f32>> for Value {
    fn from(v: Vec<f32>) -> Self {
        Value::FloatVector(v)
    }
}

/// The type tag a pin declares for the values it produces or accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Tag for [`Value::Float`].
    Float,
    /// Tag for [`Value::Integer`].
    Integer,
    /// Tag for [`Value::Bool`].
    Bool,
    /// Tag for [`Value::Text`].
    Text,
    /// Tag for [`Value::FloatVector`].
    FloatVector,
}

impl ValueKind {
    /// Human-readable tag name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Float => "float",
            ValueKind::Integer => "integer",
            ValueKind::Bool => "bool",
            ValueKind::Text => "text",
            ValueKind::FloatVector => "float-vector",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
