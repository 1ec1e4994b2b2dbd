use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use intellidocs_store::schema::store_file_name;
use tracing::debug;

use crate::store::DocStore;

/// Process-wide cache of family stores, loaded on first use.
///
/// A family missing on disk is cached as an empty store. Entries stay until
/// [`StoreRegistry::invalidate`] drops them, which an ingest does for the family
/// it rewrote.
#[derive(Debug)]
pub struct StoreRegistry {
    db_dir: PathBuf,
    entries: RwLock<HashMap<String, Arc<DocStore>>>,
}

impl StoreRegistry {
    #[must_use]
    pub fn new(db_dir: impl Into<PathBuf>) -> Self {
        Self {
            db_dir: db_dir.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn store_path(&self, family: &str) -> PathBuf {
        self.db_dir.join(store_file_name(family))
    }

    /// Returns the cached store for `family`, reading it from disk on first use.
    #[must_use]
    pub fn get_or_load(&self, family: &str) -> Arc<DocStore> {
        if let Some(store) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(family)
        {
            return Arc::clone(store);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // another caller may have loaded it between the two locks
        if let Some(store) = entries.get(family) {
            return Arc::clone(store);
        }

        let path = self.store_path(family);
        let store = Arc::new(DocStore::load_or_default(&path));
        debug!(family, records = store.len(), path = %path.display(), "loaded family store");
        entries.insert(family.to_string(), Arc::clone(&store));
        store
    }

    /// Drops the cached store so the next lookup reads the file again.
    pub fn invalidate(&self, family: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(family)
            .is_some()
    }

    #[must_use]
    pub fn loaded_families(&self) -> Vec<String> {
        let mut families: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        families.sort();
        families
    }
}
