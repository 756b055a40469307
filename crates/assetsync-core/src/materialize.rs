//! Asset materialization: fetch the selected store items and write them to disk.
//!
//! Keys are listed once, filtered by extension, fetched concurrently, and
//! only then written, one after another, under the destination root. Each
//! key maps to its own path, so writes never overlap.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::config::AssetsConfig;
use crate::filter::ExtensionFilter;
use crate::key::StoreKey;
use crate::source::SourceDescriptor;
use crate::store::{MountTable, SharedStore};
use crate::value::ItemValue;

/// Mount name used for GitHub sources in the process-wide mount table.
pub const GITHUB_MOUNT: &str = "gh";

/// Fetch every file of `source` whose name ends in one of `extensions` and
/// write it under `destination_root` at the same relative path.
///
/// Returns the absolute paths written, in the order they were processed.
/// Store and filesystem errors abort the call; files already written stay.
pub async fn materialize_remote_assets<S: AsRef<str>>(
    source: &SourceDescriptor,
    destination_root: &Path,
    extensions: &[S],
    cfg: &AssetsConfig,
) -> Result<Vec<PathBuf>> {
    let store = MountTable::global()
        .mount(GITHUB_MOUNT, source, &cfg.github_options())
        .with_context(|| format!("failed to mount {}@{}", source.repo(), source.branch()))?;
    let filter = ExtensionFilter::new(extensions.iter().map(|e| e.as_ref()));
    materialize_from_store(store, destination_root, &filter, cfg.max_concurrent_fetches).await
}

/// Store-level materialization; see [`materialize_remote_assets`].
///
/// At most `max_concurrent` fetches run at once (0 is treated as 1).
/// Items that vanish between listing and fetching are skipped.
pub async fn materialize_from_store(
    store: SharedStore,
    destination_root: &Path,
    filter: &ExtensionFilter,
    max_concurrent: usize,
) -> Result<Vec<PathBuf>> {
    let root = std::path::absolute(destination_root).with_context(|| {
        format!(
            "failed to resolve destination {}",
            destination_root.display()
        )
    })?;

    let keys = tokio::task::spawn_blocking({
        let store = Arc::clone(&store);
        move || store.list_keys()
    })
    .await
    .context("list task join")?
    .context("failed to list store keys")?;

    let listed = keys.len();
    let selected = filter.select(keys);
    tracing::debug!(
        driver = store.driver_name(),
        listed,
        selected = selected.len(),
        "filtered store keys"
    );

    let fetched = fetch_all(&store, selected, max_concurrent).await?;

    let mut paths = Vec::with_capacity(fetched.len());
    for (key, value) in fetched {
        let Some(value) = value else {
            tracing::debug!(key = %key, "item no longer resolves, skipping");
            continue;
        };
        if let Some(path) = write_item(&root, &key, value).await? {
            paths.push(path);
        }
    }

    tracing::info!(
        written = paths.len(),
        root = %root.display(),
        "materialized assets"
    );
    Ok(paths)
}

/// Fetch all keys with a bounded number in flight. Waits for every fetch;
/// the first failure aborts the whole call.
async fn fetch_all(
    store: &SharedStore,
    keys: Vec<StoreKey>,
    max_concurrent: usize,
) -> Result<Vec<(StoreKey, Option<ItemValue>)>> {
    let max_concurrent = max_concurrent.max(1);
    let mut pending = keys.into_iter();
    let mut join_set = JoinSet::new();
    let mut fetched = Vec::new();

    loop {
        while join_set.len() < max_concurrent {
            let Some(key) = pending.next() else {
                break;
            };
            let store = Arc::clone(store);
            join_set.spawn_blocking(move || {
                let value = store.get_item(&key);
                (key, value)
            });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let (key, value) = res.context("fetch task join")?;
        let value = value.with_context(|| format!("failed to fetch {}", key))?;
        fetched.push((key, value));
    }

    Ok(fetched)
}

/// Write one item under `root`. Returns `None` for keys that do not map to a
/// path inside `root`.
async fn write_item(root: &Path, key: &StoreKey, value: ItemValue) -> Result<Option<PathBuf>> {
    let Some(relative) = key.to_relative_path() else {
        tracing::warn!(key = %key, "key does not map to a path under the destination, skipping");
        return Ok(None);
    };
    let path = root.join(relative);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let kind = value.kind();
    let bytes = value
        .into_bytes()
        .with_context(|| format!("failed to serialize {}", key))?;
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::debug!(key = %key, kind, bytes = bytes.len(), path = %path.display(), "wrote asset");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::{AssetStore, StoreError};
    use serde_json::json;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn shared(store: MemoryStore) -> SharedStore {
        Arc::new(store)
    }

    #[tokio::test]
    async fn only_matching_keys_are_written() {
        let store = MemoryStore::with_items([
            ("docs:readme.md", "# Readme"),
            ("src:index.ts", "export {}"),
        ]);
        let dir = tempdir().unwrap();
        let filter = ExtensionFilter::new(["md"]);

        let paths = materialize_from_store(shared(store), dir.path(), &filter, 4)
            .await
            .unwrap();

        let expected = dir.path().join("docs").join("readme.md");
        assert_eq!(paths, vec![expected.clone()]);
        assert_eq!(std::fs::read_to_string(&expected).unwrap(), "# Readme");
        assert!(!dir.path().join("src").join("index.ts").exists());
        assert!(!dir.path().join("src").exists());
    }

    #[tokio::test]
    async fn structured_value_written_as_indented_json() {
        let store = MemoryStore::new();
        store.set_item("a:b:c.json", ItemValue::from_json(json!({"x": 1})).unwrap());
        let dir = tempdir().unwrap();

        let filter = ExtensionFilter::new(["json"]);

        let paths = materialize_from_store(shared(store), dir.path(), &filter, 1)
            .await
            .unwrap();

        let path = dir.path().join("a").join("b").join("c.json");
        assert_eq!(paths, vec![path.clone()]);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"x\": 1\n}");
        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json!({"x": 1}));
    }

    #[tokio::test]
    async fn blob_bytes_and_overwrite() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let store = MemoryStore::with_items([("img:logo.png", bytes.clone())]);
        let dir = tempdir().unwrap();
        let target = dir.path().join("img").join("logo.png");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"stale content that is longer than nothing").unwrap();

        materialize_from_store(shared(store), dir.path(), &ExtensionFilter::new(["png"]), 2)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), bytes);
    }

    #[tokio::test]
    async fn rerun_produces_identical_bytes() {
        let store = MemoryStore::new();
        let cfg = ItemValue::from_json(json!({"k": [1, 2, {"z": null}]})).unwrap();
        store.set_item("data:cfg.json", cfg);
        store.set_item("data:raw.bin", vec![9u8, 8, 7]);
        let store = shared(store);
        let dir = tempdir().unwrap();
        let filter = ExtensionFilter::new(["json", "bin"]);

        let first = materialize_from_store(Arc::clone(&store), dir.path(), &filter, 8)
            .await
            .unwrap();
        let snapshot: Vec<Vec<u8>> = {
            let mut sorted = first.clone();
            sorted.sort();
            sorted.iter().map(|p| std::fs::read(p).unwrap()).collect()
        };

        let mut second = materialize_from_store(store, dir.path(), &filter, 8)
            .await
            .unwrap();
        second.sort();
        let again: Vec<Vec<u8>> = second.iter().map(|p| std::fs::read(p).unwrap()).collect();
        assert_eq!(snapshot, again);
    }

    /// Lists keys but reports some of them as gone at fetch time.
    struct VanishingStore {
        inner: MemoryStore,
        gone: HashSet<StoreKey>,
    }

    impl AssetStore for VanishingStore {
        fn driver_name(&self) -> &'static str {
            "vanishing"
        }

        fn list_keys(&self) -> Result<Vec<StoreKey>, StoreError> {
            self.inner.list_keys()
        }

        fn get_item(&self, key: &StoreKey) -> Result<Option<ItemValue>, StoreError> {
            if self.gone.contains(key) {
                return Ok(None);
            }
            self.inner.get_item(key)
        }
    }

    #[tokio::test]
    async fn absent_items_are_skipped_not_counted() {
        let inner = MemoryStore::with_items([
            ("a.md", "a"),
            ("b.md", "b"),
            ("c.md", "c"),
            ("d.txt", "d"),
        ]);
        let store: SharedStore = Arc::new(VanishingStore {
            inner,
            gone: [StoreKey::new("b.md")].into_iter().collect(),
        });
        let dir = tempdir().unwrap();

        let mut paths = materialize_from_store(store, dir.path(), &ExtensionFilter::new(["md"]), 3)
            .await
            .unwrap();
        paths.sort();
        assert_eq!(paths, vec![dir.path().join("a.md"), dir.path().join("c.md")]);
        assert!(!dir.path().join("b.md").exists());
    }

    struct FailingStore;

    impl AssetStore for FailingStore {
        fn driver_name(&self) -> &'static str {
            "failing"
        }

        fn list_keys(&self) -> Result<Vec<StoreKey>, StoreError> {
            Ok(vec![StoreKey::new("x.md")])
        }

        fn get_item(&self, _key: &StoreKey) -> Result<Option<ItemValue>, StoreError> {
            Err(StoreError::Http {
                url: "http://example.invalid/x.md".into(),
                status: 500,
            })
        }
    }

    #[tokio::test]
    async fn fetch_error_is_fatal() {
        let dir = tempdir().unwrap();
        let filter = ExtensionFilter::new(["md"]);
        let err = materialize_from_store(Arc::new(FailingStore), dir.path(), &filter, 1)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("x.md"));
    }

    #[tokio::test]
    async fn traversal_keys_are_skipped() {
        let store = MemoryStore::with_items([("..:escape.md", "no"), ("ok.md", "yes")]);
        let dir = tempdir().unwrap();
        let root = dir.path().join("out");

        let paths = materialize_from_store(shared(store), &root, &ExtensionFilter::new(["md"]), 2)
            .await
            .unwrap();
        assert_eq!(paths, vec![root.join("ok.md")]);
        assert!(!dir.path().join("escape.md").exists());
    }

    #[tokio::test]
    async fn write_failure_is_fatal() {
        let store = MemoryStore::with_items([("docs:readme.md", "x")]);
        let dir = tempdir().unwrap();
        // A file where the `docs` directory needs to go.
        std::fs::write(dir.path().join("docs"), b"not a dir").unwrap();

        let filter = ExtensionFilter::new(["md"]);
        let res = materialize_from_store(shared(store), dir.path(), &filter, 1).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn zero_concurrency_still_fetches() {
        let store = MemoryStore::with_items([("a.md", "a"), ("b.md", "b")]);
        let dir = tempdir().unwrap();
        let filter = ExtensionFilter::new(["md"]);
        let paths = materialize_from_store(shared(store), dir.path(), &filter, 0)
            .await
            .unwrap();
        assert_eq!(paths.len(), 2);
    }
}
