//! Logger setup shared by both binaries.
//!
//! Logs go to stderr so stdout stays reserved for confirmation lines and the
//! bridge protocol. The filter comes from `PIXELBLAZE_LOG` (env_logger
//! syntax) and defaults to `warn`, or `debug` with `--verbose`.

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PIXELBLAZE_LOG";

/// Initialize `env_logger`. Call once, at the top of `main`.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(LOG_ENV, default_filter),
    )
    .target(env_logger::Target::Stderr)
    .format_timestamp_millis()
    .init();
}
