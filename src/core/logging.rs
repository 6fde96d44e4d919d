//! Logging initialization

/// Initializes the logger.
///
/// Writes to stdout with a default filter of `info`; override with the
/// `RUST_LOG` environment variable. Calling it twice is harmless, the
/// second call is ignored.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .try_init();
}
