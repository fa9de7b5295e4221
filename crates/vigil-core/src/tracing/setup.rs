//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the filter directives.
pub const LOG_ENV_VAR: &str = "VIGIL_LOG";

/// Filter used when `VIGIL_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "vigil=info";

/// Initialize the Vigil logging system.
///
/// Format: `VIGIL_LOG=vigil_analysis=debug,vigil_storage=warn`.
/// Idempotent; later calls are no-ops, as is a call made after another
/// global subscriber was installed.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
