use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes console logging on stderr so stdout stays reserved for reports.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` applies.
pub fn init_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // A second init (e.g. from tests) is not an error worth surfacing.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
