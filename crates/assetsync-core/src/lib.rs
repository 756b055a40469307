pub mod config;
pub mod logging;

pub mod filter;
pub mod key;
pub mod local;
pub mod materialize;
pub mod retry;
pub mod source;
pub mod store;
pub mod value;
