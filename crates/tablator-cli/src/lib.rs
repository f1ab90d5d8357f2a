//! Shared plumbing for the Tablator command-line tools.

/// Config file and environment handling.
pub mod config;
/// Tracing subscriber set-up.
pub mod logging;

pub use config::Config;
