//! Load Cache Module
//! Memoizes load results per source path for as long as the cache lives.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{DataLoader, LoadedDatasets, LoaderError};

/// Caller-owned memo of loaded workbooks.
///
/// Entries are never invalidated: the same path keeps returning the same
/// result until the cache is dropped. Failed loads are not stored.
#[derive(Debug, Default)]
pub struct LoadCache {
    loader: DataLoader,
    entries: HashMap<PathBuf, Arc<LoadedDatasets>>,
}

impl LoadCache {
    pub fn new(loader: DataLoader) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
        }
    }

    /// Return the cached result for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> Result<Arc<LoadedDatasets>, LoaderError> {
        let path = path.as_ref();
        if let Some(hit) = self.entries.get(path) {
            tracing::debug!(source = %path.display(), "load cache hit");
            return Ok(Arc::clone(hit));
        }

        let loaded = Arc::new(self.loader.load(path)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&loaded));
        Ok(loaded)
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<LoadedDatasets>> {
        self.entries.get(path.as_ref()).cloned()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries.contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }
}
