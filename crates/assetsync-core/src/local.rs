//! Local-filesystem assets: the `<path>/**/*.{ext,...}` expansion.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::filter::ExtensionFilter;

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Files under `path` (recursively) whose name ends in `.` + one of `extensions`.
///
/// Hidden files and directories below `path` are not descended into or
/// returned. A missing path, a non-directory, or no matches give an empty
/// list. Unreadable entries are skipped. The result is sorted.
pub fn list_local_assets<S: AsRef<str>>(path: &Path, extensions: &[S]) -> Vec<PathBuf> {
    let filter = ExtensionFilter::new(extensions.iter().map(|e| e.as_ref()));
    if !path.is_dir() {
        return Vec::new();
    }

    let mut found: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.path().is_file())
        .filter(|e| filter.is_match(&e.file_name().to_string_lossy()))
        .map(DirEntry::into_path)
        .collect();
    found.sort();
    found
}
