//! Tracing setup for the binary.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Install a global subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Records go to stderr; stdout carries the streamed transcript only.
/// Calling this more than once is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let _ = Registry::default().with(filter).with(fmt_layer).try_init();
}
