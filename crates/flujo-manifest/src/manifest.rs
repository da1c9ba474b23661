//! Manifest data model and JSON parsing.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::ManifestError;

/// A fully parsed pipeline description.
///
/// Parsing is permissive about absent sections: every top-level field
/// defaults (empty string / empty collection) rather than failing, so a
/// minimal `{}` document is a valid, empty pipeline. Within the sections the
/// required fields are exactly what the format mandates: block references
/// need `id`, `version` and `type`; nodes need `id` and `type`; connections
/// need all four endpoint fields.
///
/// # Example
///
/// ```rust
/// use flujo_manifest::PipelineManifest;
///
/// let manifest = PipelineManifest::from_json(
///     r#"{
///         "pipeline_name": "demo",
///         "blocks": [
///             {"id": "constant", "version": "1.0.0", "type": "sensor"}
///         ],
///         "pipeline": {
///             "nodes": [
///                 {"id": 1, "type": "constant", "config": {"value": 3.0}}
///             ],
///             "connections": []
///         }
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(manifest.pipeline_name, "demo");
/// // Non-string config values arrive stringified.
/// assert_eq!(manifest.pipeline.nodes[0].config["value"], "3.0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PipelineManifest {
    /// Manifest format version tag, e.g. `"1.0"`.
    #[serde(default)]
    pub format_version: String,

    /// Human-readable pipeline name.
    #[serde(default)]
    pub pipeline_name: String,

    /// Target platform tag, e.g. `"linux-arm64"`. Informational.
    #[serde(default)]
    pub target_platform: String,

    /// Block types this pipeline requires, used for availability pre-checks
    /// and version resolution.
    #[serde(default)]
    pub blocks: Vec<BlockReference>,

    /// The graph itself: node placements and connections.
    #[serde(default)]
    pub pipeline: PipelineSection,
}

impl PipelineManifest {
    /// Load and parse a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ManifestError::read_file(path, e))?;
        Self::from_json(&text)
    }

    /// Parse a manifest from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(text).map_err(ManifestError::parse)
    }

    /// The block reference declaring a given block type, if any.
    ///
    /// Node `type` names a block id; the matching reference supplies the
    /// version the loader needs.
    pub fn reference_for(&self, block_type: &str) -> Option<&BlockReference> {
        self.blocks.iter().find(|b| b.id == block_type)
    }

    /// The node with a given manifest id, if any.
    pub fn node(&self, id: u32) -> Option<&NodeSpec> {
        self.pipeline.nodes.iter().find(|n| n.id == id)
    }
}

/// The `pipeline` object: nodes plus connections.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PipelineSection {
    /// Node placements, one per graph node.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,

    /// Directed pin-to-pin edges.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// Declares that a block type + version is required by the pipeline.
///
/// Used for availability pre-checks and node type resolution, never for
/// instantiation itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockReference {
    /// Block type id, e.g. `"scale"`. Node `type` fields refer to this.
    pub id: String,

    /// Semantic version of the required module, e.g. `"1.0.0"`.
    pub version: String,

    /// Category tag (`sensor` / `processing` / `model` / `output`).
    /// Informational.
    #[serde(rename = "type")]
    pub kind: String,

    /// Ids of other blocks this one depends on. Informational.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// One placement of a block type in the graph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeSpec {
    /// Node id, unique within the manifest.
    pub id: u32,

    /// Block type id this node instantiates.
    #[serde(rename = "type")]
    pub block_type: String,

    /// Block configuration. Values that are not JSON strings are
    /// stringified on parse; type coercion is the block's responsibility.
    #[serde(default, deserialize_with = "stringify_values")]
    pub config: BTreeMap<String, String>,

    /// Editor layout position. Presentation-only.
    #[serde(default)]
    pub position: Position,
}

/// Editor layout coordinates for a node. Not used by execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    #[serde(default)]
    pub x: f32,
    /// Vertical coordinate.
    #[serde(default)]
    pub y: f32,
}

/// A directed edge from one node's output pin to another node's input pin.
///
/// All four fields are required; a connection with a missing endpoint is a
/// parse error, not a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Connection {
    /// Source node id.
    pub from_node_id: u32,
    /// Output pin name on the source node.
    pub from_pin: String,
    /// Destination node id.
    pub to_node_id: u32,
    /// Input pin name on the destination node.
    pub to_pin: String,
}

/// Deserialize a config map accepting any JSON value, stringifying
/// non-strings (numbers, booleans, null, nested structures) via their
/// compact JSON form.
fn stringify_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}
