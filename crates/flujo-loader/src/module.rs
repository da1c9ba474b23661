//! One opened block module and the instance handles minted from it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use flujo_block::ffi::{BlockCell, CREATE_SYMBOL, CreateFn, DESTROY_SYMBOL, DestroyFn};
use flujo_block::{Block, BlockCategory, BlockConfig, BlockError, Pin, Value};
use libloading::Library;

use crate::LoaderError;

/// Platform file name for a block module: `{id}-v{version}` plus the
/// platform dynamic-library suffix (`.so` / `.dylib` / `.dll`).
pub fn module_file_name(id: &str, version: &str) -> String {
    format!("{id}-v{version}{}", std::env::consts::DLL_SUFFIX)
}

/// One opened block module.
///
/// Opening resolves and validates BOTH entry points eagerly, so a module
/// that is present but malformed fails at load time, not mid-pipeline.
/// The module stays mapped until the last clone of its `Arc` drops — the
/// cache in [`BlockLibrary`](crate::BlockLibrary) holds one clone, and every
/// [`BlockHandle`] minted from the module holds another.
#[derive(Debug)]
pub struct BlockModule {
    path: PathBuf,
    create: CreateFn,
    destroy: DestroyFn,
    /// Keeps the mapped library alive for as long as the resolved entry
    /// points (and any instance minted from them) can run.
    _library: Library,
}

impl BlockModule {
    /// Open a module file and resolve its two entry points.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LoaderError> {
        let path = path.into();

        // SAFETY: opening a library runs its initializers; block modules are
        // plain cdylibs built against the flujo-block ABI with no custom
        // initialization.
        let library = unsafe { Library::new(&path) }
            .map_err(|source| LoaderError::open_failed(&path, source))?;

        // SAFETY: the block ABI fixes the signatures behind these two symbol
        // names; the fn pointers are copied out of the Symbol borrows and
        // stay valid while `library` remains mapped, which `Self` guarantees
        // by holding it.
        let create = unsafe { library.get::<CreateFn>(CREATE_SYMBOL.as_bytes()) }
            .map(|symbol| *symbol)
            .map_err(|source| LoaderError::missing_symbol(&path, CREATE_SYMBOL, source))?;
        let destroy = unsafe { library.get::<DestroyFn>(DESTROY_SYMBOL.as_bytes()) }
            .map(|symbol| *symbol)
            .map_err(|source| LoaderError::missing_symbol(&path, DESTROY_SYMBOL, source))?;

        Ok(Self {
            path,
            create,
            destroy,
            _library: library,
        })
    }

    /// Path the module was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mint a fresh block instance from this module.
    ///
    /// Every call allocates a new instance; instances are never shared
    /// between nodes.
    pub fn instantiate(self: &Arc<Self>) -> Result<BlockHandle, LoaderError> {
        // SAFETY: `create` is this module's exported allocator and the
        // module is mapped (we hold it). The returned pointer is owned by
        // the new handle and destroyed exactly once, by the paired
        // destroyer, in `BlockHandle::drop`.
        let raw = unsafe { (self.create)() };
        if raw.is_null() {
            return Err(LoaderError::null_instance(&self.path));
        }
        tracing::debug!("module_instantiate: new instance from '{}'", self.path.display());
        Ok(BlockHandle {
            raw,
            destroy: self.destroy,
            module: Arc::clone(self),
        })
    }
}

/// An owned block instance minted from a [`BlockModule`].
///
/// Implements [`Block`] by delegating to the instance behind the pointer.
/// Dropping the handle destroys the instance through the same module's
/// destroyer — allocation and deallocation never cross the module boundary
/// — and only then releases its hold on the module. A handle therefore
/// remains valid even if the loader's cache entry for the module is removed
/// first.
#[derive(Debug)]
pub struct BlockHandle {
    raw: *mut BlockCell,
    destroy: DestroyFn,
    module: Arc<BlockModule>,
}

// SAFETY: the contract requires `Block: Send`, so the instance behind `raw`
// is Send; the handle owns the only pointer to it, and `module` keeps the
// code it points into mapped wherever the handle goes.
unsafe impl Send for BlockHandle {}

impl BlockHandle {
    /// The module this instance came from.
    pub fn module(&self) -> &Arc<BlockModule> {
        &self.module
    }

    fn cell(&self) -> &BlockCell {
        // SAFETY: `raw` is non-null (checked at instantiation), exclusively
        // owned by this handle, and valid until `drop` destroys it.
        unsafe { &*self.raw }
    }

    fn cell_mut(&mut self) -> &mut BlockCell {
        // SAFETY: as in `cell`; `&mut self` guarantees unique access.
        unsafe { &mut *self.raw }
    }
}

impl Block for BlockHandle {
    fn id(&self) -> &str {
        self.cell().block().id()
    }

    fn version(&self) -> &str {
        self.cell().block().version()
    }

    fn category(&self) -> BlockCategory {
        self.cell().block().category()
    }

    fn input_pins(&self) -> Vec<Pin> {
        self.cell().block().input_pins()
    }

    fn output_pins(&self) -> Vec<Pin> {
        self.cell().block().output_pins()
    }

    fn initialize(&mut self, config: &BlockConfig) -> Result<(), BlockError> {
        self.cell_mut().block_mut().initialize(config)
    }

    fn execute(&mut self) -> Result<(), BlockError> {
        self.cell_mut().block_mut().execute()
    }

    fn shutdown(&mut self) {
        self.cell_mut().block_mut().shutdown();
    }

    fn set_input(&mut self, pin: &str, value: Value) {
        self.cell_mut().block_mut().set_input(pin, value);
    }

    fn output(&self, pin: &str) -> Option<Value> {
        self.cell().block().output(pin)
    }
}

impl Drop for BlockHandle {
    fn drop(&mut self) {
        // SAFETY: `raw` came from this module's allocator and has not been
        // destroyed; the module is still mapped because `self.module` drops
        // after this call returns.
        unsafe { (self.destroy)(self.raw) };
    }
}
