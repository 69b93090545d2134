use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info,contacts_server=debug";

/// JSON logs to stdout. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // try_init also bridges `log` records from actix's Logger.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .json()
        .try_init();
}
