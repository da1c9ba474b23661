//! The plugin ABI: what a compiled block module exports.
//!
//! A block module is a platform dynamic library exporting exactly two
//! C-callable symbols — an allocator and a destroyer — resolved by the host
//! loader. Everything else about the block is reached through the [`Block`]
//! trait object held inside the [`BlockCell`] those functions hand across.
//!
//! Allocation and destruction must stay paired within one module: the cell
//! is created by the plugin's allocator and freed by the same plugin's
//! destroyer, never by the host, so heap bookkeeping never crosses the
//! binary boundary.
//!
//! Plugin crates do not write these functions by hand; [`declare_block!`]
//! emits both for a `Default`-constructible block type:
//!
//! ```rust,ignore
//! use flujo_block::declare_block;
//!
//! #[derive(Default)]
//! struct ScaleBlock { /* ... */ }
//!
//! // impl Block for ScaleBlock ...
//!
//! declare_block!(ScaleBlock);
//! ```

use crate::Block;

/// Symbol name of the allocator every block module exports.
pub const CREATE_SYMBOL: &str = "flujo_block_create";

/// Symbol name of the destroyer every block module exports.
pub const DESTROY_SYMBOL: &str = "flujo_block_destroy";

/// Signature of the exported allocator: returns an owned, never-null cell
/// pointer (null signals allocation failure and is treated as a load error
/// by the host).
pub type CreateFn = unsafe extern "C" fn() -> *mut BlockCell;

/// Signature of the exported destroyer: consumes a cell pointer previously
/// returned by the same module's allocator. Null is a no-op.
pub type DestroyFn = unsafe extern "C" fn(*mut BlockCell);

/// Sized carrier for one block instance crossing the C boundary.
///
/// `*mut dyn Block` is a fat pointer with no stable C representation; the
/// cell wraps the trait object so only a thin `*mut BlockCell` crosses the
/// module boundary.
pub struct BlockCell {
    block: Box<dyn Block>,
}

impl BlockCell {
    /// Wrap a block instance for the trip across the ABI.
    pub fn new(block: Box<dyn Block>) -> Self {
        Self { block }
    }

    /// The wrapped block.
    pub fn block(&self) -> &dyn Block {
        self.block.as_ref()
    }

    /// The wrapped block, mutably.
    pub fn block_mut(&mut self) -> &mut dyn Block {
        self.block.as_mut()
    }
}

/// Emit the two exported entry points for a block type.
///
/// The type must implement [`Block`] and `Default`. Expands to
/// `flujo_block_create` / `flujo_block_destroy` with C linkage; a crate can
/// invoke this exactly once.
#[macro_export]
macro_rules! declare_block {
    ($block:ty) => {
        /// Allocate a fresh block instance for the host loader.
        #[unsafe(no_mangle)]
        pub extern "C" fn flujo_block_create() -> *mut $crate::ffi::BlockCell {
            let cell = $crate::ffi::BlockCell::new(::std::boxed::Box::new(
                <$block as ::core::default::Default>::default(),
            ));
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(cell))
        }

        /// Destroy an instance previously returned by `flujo_block_create`.
        ///
        /// # Safety
        ///
        /// `cell` must be a pointer obtained from this module's
        /// `flujo_block_create` that has not been destroyed yet, or null
        /// (tolerated as a no-op).
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn flujo_block_destroy(cell: *mut $crate::ffi::BlockCell) {
            if !cell.is_null() {
                drop(unsafe { ::std::boxed::Box::from_raw(cell) });
            }
        }
    };
}
