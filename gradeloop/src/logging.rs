//! Diagnostic tracing for the grading loop.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. The banner and the
//! final `passed/iterations` summary are plain stdout and never filtered.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset.
///
/// # Example
/// ```bash
/// RUST_LOG=gradeloop=info gradeloop --projects echo,gfserver
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
