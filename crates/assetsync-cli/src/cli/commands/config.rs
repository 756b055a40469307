//! `assetsync config` – show where the config lives and what is in effect.

use anyhow::Result;
use assetsync_core::config::{self, AssetsConfig};

pub fn run_config(cfg: &AssetsConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
