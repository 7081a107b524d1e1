//! Tracing subscriber setup shared by the binaries.
//!
//! Logs go to stderr so that replies printed on stdout stay clean. The
//! filter comes from `RUST_LOG` when set, otherwise from the caller's
//! default directive.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install a global `fmt` subscriber filtered by `RUST_LOG` or `default_directive`.
///
/// Returns `Err` if a global subscriber is already installed.
pub fn init(default_directive: &str) -> Result<(), String> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| format!("failed to install tracing subscriber: {e}"))
}
