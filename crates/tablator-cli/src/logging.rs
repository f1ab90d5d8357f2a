//! Diagnostic output on stderr.

use std::io::IsTerminal;
use std::sync::Once;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding filter directives; overrides the flags.
pub const LOG_ENV: &str = "TABLATOR_LOG";

/// Level selected by the `--verbose` / `--trace` switches.
pub fn level(verbose: bool, trace: bool) -> LevelFilter {
    if trace {
        LevelFilter::TRACE
    } else if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbose: bool, trace: bool) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(level(verbose, trace).into())
            .with_env_var(LOG_ENV)
            .from_env_lossy();

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .init();
    });
}
