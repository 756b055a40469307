//! Virtual key/value stores over remote sources.
//!
//! The materializer depends only on [`AssetStore`]. Backends implement
//! [`StoreBackend`] to be mountable by name through a [`MountTable`]; the
//! GitHub tree/raw-content backend is one variant, the in-memory store
//! another.

mod error;
pub mod github;
pub mod memory;
mod mount;

use std::sync::Arc;

use crate::key::StoreKey;
use crate::source::SourceDescriptor;
use crate::value::ItemValue;

pub use error::StoreError;
pub use mount::MountTable;

/// A mounted store shared between the materializer and its fetch tasks.
pub type SharedStore = Arc<dyn AssetStore>;

/// Key/value view of a remote source.
///
/// Methods block (network I/O); async callers run them via `spawn_blocking`.
pub trait AssetStore: Send + Sync {
    /// Short backend name for logs.
    fn driver_name(&self) -> &'static str;

    /// All keys visible under the mount. Order is unspecified.
    fn list_keys(&self) -> Result<Vec<StoreKey>, StoreError>;

    /// Value for `key`, or `None` when the key no longer resolves.
    fn get_item(&self, key: &StoreKey) -> Result<Option<ItemValue>, StoreError>;
}

/// Something that can open a store for a source descriptor.
pub trait StoreBackend {
    type Store: AssetStore + 'static;

    /// Identity of the backend configuration. Two mounts of the same name are
    /// only considered identical if both this and the descriptor match.
    fn backend_id(&self) -> String;

    /// Open a store for `source`. Must not perform network I/O.
    fn open(&self, source: &SourceDescriptor) -> Result<Self::Store, StoreError>;
}
