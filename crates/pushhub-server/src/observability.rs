//! Log setup. `RUST_LOG` wins over `[logging] level` whenever it is set.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Installs the global subscriber at `info`.
///
/// Called before the config is read so that config errors are logged; the
/// configured level is applied afterwards with [`apply_logging_level`].
pub fn init_tracing() {
    init_tracing_with_level("info");
}

pub fn init_tracing_with_level(level: &str) {
    let (filter, handle) = reload::Layer::new(startup_filter(level));
    let _ = FILTER_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

fn startup_filter(level: &str) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        Err(_) => EnvFilter::new(level),
    }
}

/// Swaps in the configured level. No-op when `RUST_LOG` is set or tracing
/// was not initialized through this module.
pub fn apply_logging_level(level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Some(handle) = FILTER_HANDLE.get()
        && let Err(e) = handle.modify(|f| *f = EnvFilter::new(level))
    {
        tracing::warn!(error = %e, level, "Failed to apply log level");
    }
}
