//! Logging setup utilities for the Hyoshi binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the library crates and the binary itself. The level can be
/// overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "hyoshi-server", "hyoshi-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use hyoshi_shared::logger::setup_logger;
///
/// setup_logger("hyoshi-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    ["hyoshi_shared", "hyoshi_server", "hyoshi_client"]
        .iter()
        .map(|krate| format!("{}={}", krate, default_log_level))
        .chain(std::iter::once(format!(
            "{}={}",
            binary_name.replace('-', "_"),
            default_log_level
        )))
        .collect::<Vec<_>>()
        .join(",")
}
