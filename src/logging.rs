//! Diagnostics setup. Everything goes to stderr; stdout carries only `bulk:` lines.

use tracing_subscriber::EnvFilter;

/// Default directive for a `-v` count: 0 → warn, 1 → debug, 2+ → trace.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "bulk=debug,warn",
        _ => "bulk=trace,warn",
    }
}

pub fn init_tracing(verbosity: u8) {
    // RUST_LOG=bulk=trace
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
