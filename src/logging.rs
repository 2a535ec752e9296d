use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber used by the binary.
///
/// `RUST_LOG` wins when set; otherwise the level is `warn`, or `debug`
/// when `debug` is true.
pub fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
