//! CLI for assetsync.

mod commands;

use anyhow::Result;
use assetsync_core::config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_config, run_local, run_remote, RemoteArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "assetsync")]
#[command(about = "Fetch asset files by extension from GitHub or a local tree", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Materialize matching files of a GitHub repository under a local directory.
    Remote {
        /// Repository as owner/name.
        repo: String,

        /// Branch to read (default from config, normally "main").
        #[arg(long)]
        branch: Option<String>,

        /// Sub-directory of the repository to mount (default: repository root).
        #[arg(long)]
        dir: Option<String>,

        /// Cache time-to-live in seconds for the listing and fetched items.
        #[arg(long, value_name = "SECS")]
        ttl: Option<u64>,

        /// Destination directory; created if missing.
        #[arg(long, short = 'o', value_name = "DIR")]
        out: PathBuf,

        /// Extensions to select, without the dot. Repeat or comma-separate.
        #[arg(long = "ext", short = 'e', value_delimiter = ',', required = true)]
        extensions: Vec<String>,
    },

    /// List matching files under a local directory.
    Local {
        /// Directory to search recursively.
        path: PathBuf,

        /// Extensions to select, without the dot. Repeat or comma-separate.
        #[arg(long = "ext", short = 'e', value_delimiter = ',', required = true)]
        extensions: Vec<String>,
    },

    /// Show the config file location and effective settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Remote {
                repo,
                branch,
                dir,
                ttl,
                out,
                extensions,
            } => {
                let args = RemoteArgs {
                    repo,
                    branch,
                    dir,
                    ttl,
                    out,
                    extensions,
                };
                run_remote(&cfg, args).await?
            }
            CliCommand::Local { path, extensions } => run_local(&path, &extensions)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
