//! Flujo Manifest - the declarative pipeline description.
//!
//! A manifest is a JSON document naming the block types a pipeline needs
//! (with versions), the node instances placed in the graph (with string
//! configuration), and the directed pin-to-pin connections between them.
//! This crate only parses and holds that structure:
//!
//! - [`PipelineManifest`] - the parsed document, immutable once loaded
//! - [`BlockReference`] - required block type + version + dependency list
//! - [`NodeSpec`] - one placement of a block type, with config and layout
//! - [`Connection`] - a directed edge between two named pins
//! - [`ManifestError`] - read/parse failures
//!
//! Absent optional sections default to empty collections, and node
//! configuration values that are not JSON strings are stringified on the
//! way in — configuration is string-typed at this layer, and each block
//! parses its own keys.
//!
//! No cross-referential validation happens here (a connection may name a
//! node that does not exist); the execution engine validates the graph when
//! it builds.

pub mod error;
pub mod manifest;

pub use error::ManifestError;
pub use manifest::{BlockReference, Connection, NodeSpec, PipelineManifest, PipelineSection, Position};
