//! In-process store backed by a map.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::{AssetStore, StoreBackend, StoreError};
use crate::key::StoreKey;
use crate::source::SourceDescriptor;
use crate::value::ItemValue;

/// Map-backed store. Clones share the same items.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<RwLock<BTreeMap<StoreKey, ItemValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<StoreKey>,
        V: Into<ItemValue>,
    {
        let store = Self::new();
        for (k, v) in items {
            store.set_item(k, v);
        }
        store
    }

    pub fn set_item(&self, key: impl Into<StoreKey>, value: impl Into<ItemValue>) {
        self.items
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value.into());
    }

    pub fn remove_item(&self, key: &StoreKey) -> Option<ItemValue> {
        self.items
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
    }
}

impl AssetStore for MemoryStore {
    fn driver_name(&self) -> &'static str {
        "memory"
    }

    fn list_keys(&self) -> Result<Vec<StoreKey>, StoreError> {
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());
        Ok(items.keys().cloned().collect())
    }

    fn get_item(&self, key: &StoreKey) -> Result<Option<ItemValue>, StoreError> {
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }
}

impl StoreBackend for MemoryStore {
    type Store = MemoryStore;

    fn backend_id(&self) -> String {
        format!("memory:{:p}", Arc::as_ptr(&self.items))
    }

    fn open(&self, _source: &SourceDescriptor) -> Result<MemoryStore, StoreError> {
        Ok(self.clone())
    }
}
