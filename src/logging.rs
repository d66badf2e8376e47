//! Logging and tracing setup.
//!
//! Logs always go to **stderr**; stdout belongs to the host process driving
//! the provider. Filtering follows `RUST_LOG`.
//!
//! ```bash
//! # Trace every page request of a name lookup
//! RUST_LOG=logzio_provider=debug ./provider
//! ```
//!
//! Token secrets and the API token never appear in log output: both
//! [`LogShippingToken`](crate::types::LogShippingToken) and
//! [`ProviderConfig`](crate::config::ProviderConfig) redact them in `Debug`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging at `info` unless `RUST_LOG` says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a custom default level, used when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Try to initialize logging, returning false if a subscriber is already set.
///
/// Handy in tests, where several cases may race to install one.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("logzio_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,logzio_provider::resolver=trace").is_ok());
    }

    #[test]
    fn test_try_init_is_idempotent() {
        // Only the first call in this process can win.
        let _ = try_init_logging();
        assert!(!try_init_logging());
    }
}
