//! Named mount points binding a store to a source descriptor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use super::{SharedStore, StoreBackend, StoreError};
use crate::source::SourceDescriptor;

struct MountEntry {
    backend_id: String,
    source: SourceDescriptor,
    store: SharedStore,
}

/// Table of mounted stores keyed by mount name.
///
/// Mounting a name again with the same backend and descriptor returns the
/// store already there, so its cache is reused; anything else replaces it.
#[derive(Default)]
pub struct MountTable {
    mounts: Mutex<HashMap<String, MountEntry>>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide table. Mounts in it are never removed implicitly.
    pub fn global() -> &'static MountTable {
        static GLOBAL: OnceLock<MountTable> = OnceLock::new();
        GLOBAL.get_or_init(MountTable::new)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, MountEntry>> {
        // Entries are replaced whole, so a poisoned map is still consistent.
        self.mounts.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mount `source` under `name` using `backend`, or reuse the identical existing mount.
    pub fn mount<B: StoreBackend>(
        &self,
        name: &str,
        source: &SourceDescriptor,
        backend: &B,
    ) -> Result<SharedStore, StoreError> {
        let backend_id = backend.backend_id();
        let mut mounts = self.lock();
        if let Some(entry) = mounts.get(name) {
            if entry.backend_id == backend_id && entry.source == *source {
                tracing::debug!(mount = name, repo = source.repo(), "reusing existing mount");
                return Ok(Arc::clone(&entry.store));
            }
        }

        let store: SharedStore = Arc::new(backend.open(source)?);
        tracing::debug!(
            mount = name,
            driver = store.driver_name(),
            repo = source.repo(),
            branch = source.branch(),
            dir = source.dir(),
            "mounted store"
        );
        mounts.insert(
            name.to_string(),
            MountEntry {
                backend_id,
                source: source.clone(),
                store: Arc::clone(&store),
            },
        );
        Ok(store)
    }

    pub fn get(&self, name: &str) -> Option<SharedStore> {
        self.lock().get(name).map(|e| Arc::clone(&e.store))
    }

    pub fn unmount(&self, name: &str) -> Option<SharedStore> {
        self.lock().remove(name).map(|e| e.store)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
