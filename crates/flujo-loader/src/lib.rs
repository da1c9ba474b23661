//! Flujo Loader - dynamic block module loading.
//!
//! Translates a `(block id, version)` pair into a live [`Block`] instance by
//! opening the compiled module from a search directory, resolving its two
//! exported entry points, and invoking the allocator. Modules are cached per
//! `(id, version)` key — every node of a block type shares one mapped module
//! — while instances are always freshly minted, one per call, never shared.
//!
//! - [`BlockLibrary`] - search directory + module cache, the loading API
//! - [`BlockModule`] - one opened module with validated entry points
//! - [`BlockHandle`] - an owned instance; implements [`Block`], destroys
//!   through the module's paired destroyer on drop, and keeps its module
//!   mapped for as long as it lives
//! - [`LoaderError`] - open/resolve/instantiation failures
//!
//! This is the only crate in the workspace that uses `unsafe`: every unsafe
//! block sits behind the safe [`BlockLibrary`] API and documents the
//! invariant it relies on.
//!
//! [`Block`]: flujo_block::Block

pub mod error;
pub mod library;
pub mod module;

pub use error::LoaderError;
pub use library::BlockLibrary;
pub use module::{BlockHandle, BlockModule, module_file_name};
