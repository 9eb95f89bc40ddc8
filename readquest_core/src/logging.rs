//! Tracing setup for the readquest binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter applied when `RUST_LOG` is unset: engine and CLI modules at
/// info, everything else at warn. The store and log modules emit their
/// lock and file activity at debug; raise with `RUST_LOG` when
/// diagnosing a stuck rollup or commit.
const DEFAULT_DIRECTIVES: &str = "warn,readquest_core=info,readquest=info";

/// Initialize tracing for a binary. `RUST_LOG` overrides the default
/// directives entirely.
pub fn init() {
    init_with_directives(DEFAULT_DIRECTIVES);
}

/// Initialize tracing with explicit default directives
pub fn init_with_directives(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Capture-friendly init for unit tests; safe to call repeatedly
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("readquest_core=debug"))
        .try_init();
}
