//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the filter directives,
/// e.g. `REMCLI_LOG=remcli=debug,tower_http=debug`.
pub const LOG_ENV: &str = "REMCLI_LOG";

const DEFAULT_FILTER: &str = "remcli=info";

static INIT: Once = Once::new();

/// Installs the global subscriber. Later calls do nothing.
///
/// Falls back to `remcli=info` when [`LOG_ENV`] is unset or unparseable.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_line_number(true))
            .with(filter)
            .try_init();
    });
}
