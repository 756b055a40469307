//! `assetsync local <PATH> --ext EXT...`

use anyhow::Result;
use assetsync_core::local::list_local_assets;
use std::path::Path;

pub fn run_local(path: &Path, extensions: &[String]) -> Result<()> {
    let found = list_local_assets(path, extensions);
    tracing::info!(path = %path.display(), matches = found.len(), "local asset scan");
    for p in &found {
        println!("{}", p.display());
    }
    Ok(())
}
