//! The loader seam used during graph construction.

use flujo_block::Block;
use flujo_loader::{BlockLibrary, LoaderError};

/// Source of block instances for graph build.
///
/// The engine resolves manifest block references through this trait rather
/// than calling the plugin loader directly, so tests can wire graphs from
/// in-process blocks. Production callers hand in a [`BlockLibrary`].
pub trait BlockProvider {
    /// Whether an implementation of `(id, version)` can be provided.
    fn is_available(&self, id: &str, version: &str) -> bool;

    /// Produces a fresh block instance.
    ///
    /// Every call must return an independent instance; instances are never
    /// shared between nodes.
    fn provide(&mut self, id: &str, version: &str) -> Result<Box<dyn Block>, LoaderError>;
}

impl BlockProvider for BlockLibrary {
    fn is_available(&self, id: &str, version: &str) -> bool {
        BlockLibrary::is_available(self, id, version)
    }

    fn provide(&mut self, id: &str, version: &str) -> Result<Box<dyn Block>, LoaderError> {
        self.load(id, version)
            .map(|handle| Box::new(handle) as Box<dyn Block>)
    }
}
