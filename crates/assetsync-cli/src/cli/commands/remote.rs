//! `assetsync remote <owner/repo> --out DIR --ext EXT...`

use anyhow::Result;
use assetsync_core::config::AssetsConfig;
use assetsync_core::materialize::materialize_remote_assets;
use assetsync_core::source::{SourceDescriptor, SourceOptions};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RemoteArgs {
    pub repo: String,
    pub branch: Option<String>,
    pub dir: Option<String>,
    pub ttl: Option<u64>,
    pub out: PathBuf,
    pub extensions: Vec<String>,
}

impl RemoteArgs {
    /// Source descriptor with unset fields filled from config.
    pub fn source(&self, cfg: &AssetsConfig) -> SourceDescriptor {
        SourceDescriptor::with_defaults(
            SourceOptions {
                repo: self.repo.clone(),
                branch: self.branch.clone(),
                dir: self.dir.clone(),
                ttl_secs: self.ttl,
            },
            &cfg.default_branch,
            cfg.default_ttl_secs,
        )
    }
}

/// Materialize the assets and print one absolute path per line.
pub async fn run_remote(cfg: &AssetsConfig, args: RemoteArgs) -> Result<()> {
    let source = args.source(cfg);
    tracing::info!(
        repo = source.repo(),
        branch = source.branch(),
        dir = source.dir(),
        extensions = ?args.extensions,
        "remote materialization"
    );
    let paths = materialize_remote_assets(&source, &args.out, &args.extensions, cfg).await?;
    for p in &paths {
        println!("{}", p.display());
    }
    Ok(())
}
