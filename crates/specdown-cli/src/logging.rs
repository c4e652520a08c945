//! Structured logging setup
//!
//! Verbosity flags map onto an `EnvFilter`; `SPECDOWN_LOG` overrides both
//! when set, so repeat runs can be narrowed without touching flags.

use tracing_subscriber::EnvFilter;

/// Map a `-v` count to a default filter directive
fn directive_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the global subscriber. Logs go to stderr so they never mix
/// with Markdown written to stdout.
pub fn init(verbosity: u8, quiet: bool) {
    let default = if quiet { "error" } else { directive_for(verbosity) };
    let filter = EnvFilter::try_from_env("SPECDOWN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
