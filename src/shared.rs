//! IndexCell - one-time load barrier for a process-wide index
//!
//! The store is loaded at most once; every caller afterwards receives a
//! clone of the same `Arc<IndexStore>`. The cell is an explicit value owned
//! by whoever sets up the process (typically behind a `static`), not an
//! ambient global the library reaches for.
//!
//! # Usage
//!
//! ```no_run
//! use apidoc_index::{IndexCell, QueryService};
//!
//! static INDEX: IndexCell = IndexCell::new();
//!
//! let store = INDEX.get_or_load_path("target/api/index.js").unwrap();
//! let query = QueryService::new(&store);
//! let _ = query.resolve("org.saddle.Vec");
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::{debug, warn};

use crate::error::Result;
use crate::store::IndexStore;

pub struct IndexCell {
    store: OnceLock<Arc<IndexStore>>,
    /// Serializes the first load so concurrent callers parse only once
    init: Mutex<()>,
}

impl IndexCell {
    pub const fn new() -> Self {
        Self {
            store: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// The loaded store, if a load has succeeded.
    pub fn get(&self) -> Option<Arc<IndexStore>> {
        self.store.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.store.get().is_some()
    }

    /// Run `load` unless a store is already present.
    ///
    /// A failed load leaves the cell empty and returns the error to this
    /// caller; a later call may try again.
    pub fn get_or_try_load<F>(&self, load: F) -> Result<Arc<IndexStore>>
    where
        F: FnOnce() -> Result<IndexStore>,
    {
        if let Some(store) = self.store.get() {
            return Ok(Arc::clone(store));
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = self.store.get() {
            return Ok(Arc::clone(store));
        }

        match load() {
            Ok(store) => {
                debug!(packages = store.package_count(), "index cell initialized");
                // The init lock is held, so this closure is the one that runs
                let store = self.store.get_or_init(|| Arc::new(store));
                Ok(Arc::clone(store))
            }
            Err(e) => {
                warn!(error = %e, "index load failed");
                Err(e)
            }
        }
    }

    pub fn get_or_load_path(&self, path: impl AsRef<Path>) -> Result<Arc<IndexStore>> {
        self.get_or_try_load(|| IndexStore::load_path(path))
    }
}

impl Default for IndexCell {
    fn default() -> Self {
        Self::new()
    }
}
