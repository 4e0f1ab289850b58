//! Opt-in tracing setup for hosts embedding `brushmap`.
//!
//! Hosts that already install a `tracing` subscriber can ignore this module;
//! every engine component only emits through the `tracing` macros.

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_TRACING_FILTER: &str = "brushmap=info";

/// Installs a compact subscriber with [`DEFAULT_TRACING_FILTER`].
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_filter(DEFAULT_TRACING_FILTER)
}

/// Installs a compact subscriber, preferring `RUST_LOG` over `fallback_filter`.
///
/// Returns `false` when the `telemetry` feature is disabled, when
/// `fallback_filter` does not parse, or when a global subscriber is already
/// set by the host.
#[must_use]
pub fn init_tracing_with_filter(fallback_filter: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => match tracing_subscriber::EnvFilter::try_new(fallback_filter) {
                Ok(filter) => filter,
                Err(_) => return false,
            },
        };

        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback_filter;
        false
    }
}
