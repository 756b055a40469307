//! CLI command handlers, one per file.

mod config;
mod local;
mod remote;

pub use config::run_config;
pub use local::run_local;
pub use remote::{run_remote, RemoteArgs};
