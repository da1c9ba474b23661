//! The block library: search directory + module cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::LoaderError;
use crate::module::{BlockHandle, BlockModule, module_file_name};

/// Loads block modules from a search directory, one module per distinct
/// `(id, version)` key.
///
/// The cache shares the *module* — the mapped code — across every node of a
/// block type; the *instances* minted by [`load`](Self::load) are always
/// fresh and independently stateful. Unloading only drops the cache entry:
/// live handles keep their module mapped until they drop.
///
/// # Example
///
/// ```rust,no_run
/// use flujo_loader::BlockLibrary;
///
/// let mut library = BlockLibrary::new("/opt/flujo/blocks");
/// if library.is_available("scale", "1.0.0") {
///     let block = library.load("scale", "1.0.0")?;
/// }
/// # Ok::<(), flujo_loader::LoaderError>(())
/// ```
pub struct BlockLibrary {
    search_dir: PathBuf,
    modules: HashMap<(String, String), Arc<BlockModule>>,
}

impl BlockLibrary {
    /// Create a library over a module search directory.
    pub fn new(search_dir: impl Into<PathBuf>) -> Self {
        Self {
            search_dir: search_dir.into(),
            modules: HashMap::new(),
        }
    }

    /// The current search directory.
    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    /// Change the search directory for subsequent loads. Already-cached
    /// modules are unaffected.
    pub fn set_search_dir(&mut self, dir: impl Into<PathBuf>) {
        self.search_dir = dir.into();
    }

    /// The file a block module is expected at, under the naming scheme
    /// `{id}-v{version}{platform-suffix}`.
    pub fn module_path(&self, id: &str, version: &str) -> PathBuf {
        self.search_dir.join(module_file_name(id, version))
    }

    /// Whether a module file exists for this block. Existence check only;
    /// nothing is loaded.
    pub fn is_available(&self, id: &str, version: &str) -> bool {
        self.module_path(id, version).is_file()
    }

    /// Mint a block instance, opening and caching the module on first use.
    ///
    /// A resident module is reused without touching the filesystem;
    /// otherwise the module file is opened, its two entry points validated,
    /// and the module cached. Each call returns a fresh instance.
    pub fn load(&mut self, id: &str, version: &str) -> Result<BlockHandle, LoaderError> {
        let key = (id.to_string(), version.to_string());
        if let Some(module) = self.modules.get(&key) {
            debug!("block_load: {id} v{version} (module resident)");
            return module.instantiate();
        }

        let path = self.module_path(id, version);
        if !path.is_file() {
            return Err(LoaderError::module_not_found(id, version, path));
        }

        let module = Arc::new(BlockModule::open(path)?);
        debug!("block_load: {id} v{version} opened from '{}'", module.path().display());
        let handle = module.instantiate()?;
        self.modules.insert(key, module);
        Ok(handle)
    }

    /// Drop the cached module for a key. No-op if it was never loaded.
    /// Live handles keep the module mapped regardless.
    pub fn unload(&mut self, id: &str, version: &str) {
        if self
            .modules
            .remove(&(id.to_string(), version.to_string()))
            .is_some()
        {
            debug!("block_unload: {id} v{version}");
        }
    }

    /// Drop every cached module.
    pub fn unload_all(&mut self) {
        if !self.modules.is_empty() {
            debug!("block_unload: all ({} modules)", self.modules.len());
        }
        self.modules.clear();
    }

    /// Number of currently cached modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_path_uses_naming_scheme() {
        let library = BlockLibrary::new("/opt/blocks");
        let path = library.module_path("imu", "2.0.1");
        assert_eq!(
            path,
            Path::new("/opt/blocks").join(module_file_name("imu", "2.0.1"))
        );
    }

    #[test]
    fn nothing_is_available_in_a_missing_dir() {
        let library = BlockLibrary::new("/no/such/dir");
        assert!(!library.is_available("imu", "1.0.0"));
        assert_eq!(library.module_count(), 0);
    }

    #[test]
    fn load_missing_module_names_the_block() {
        let mut library = BlockLibrary::new("/no/such/dir");
        let err = library.load("imu", "1.0.0").unwrap_err();
        assert!(matches!(err, LoaderError::ModuleNotFound { .. }));
        assert!(err.to_string().contains("imu v1.0.0"));
    }

    #[test]
    fn unload_is_noop_when_never_loaded() {
        let mut library = BlockLibrary::new("/no/such/dir");
        library.unload("imu", "1.0.0");
        library.unload_all();
        assert_eq!(library.module_count(), 0);
    }

    #[test]
    fn set_search_dir_redirects_lookups() {
        let mut library = BlockLibrary::new("/a");
        assert!(library.module_path("x", "1").starts_with("/a"));
        library.set_search_dir("/b");
        assert!(library.module_path("x", "1").starts_with("/b"));
        assert_eq!(library.search_dir(), Path::new("/b"));
    }
}
