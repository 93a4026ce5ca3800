//! Diagnostic logging setup

use tracing_subscriber::EnvFilter;

/// Environment variable taking precedence over `RUST_LOG`
pub const LOG_ENV: &str = "OPBUNDLE_LOG";

/// Install the global subscriber, writing to stderr
///
/// The filter comes from `OPBUNDLE_LOG`, then `RUST_LOG`, then defaults to
/// `warn` (`debug` with `--debug`).
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .init();
}
