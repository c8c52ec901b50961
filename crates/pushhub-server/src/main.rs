use std::env;

use pushhub_notifications::VapidKeys;
use pushhub_server::ServerBuilder;
use pushhub_server::config::loader::load_config;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From PUSHHUB_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (pushhub.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (PUSHHUB_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    if env::args().skip(1).any(|arg| arg == "--generate-vapid-keys") {
        let keys = VapidKeys::generate();
        println!("VAPID_PUBLIC_KEY={}", keys.public_key_base64url());
        println!("VAPID_PRIVATE_KEY={}", keys.private_key_base64url());
        return;
    }

    // Initialize tracing early with the default level
    pushhub_server::observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    pushhub_server::observability::apply_logging_level(&cfg.logging.level);

    if !pushhub_server::metrics::init_metrics() {
        tracing::warn!("Prometheus recorder not installed, /metrics disabled");
    }

    let server = match ServerBuilder::new().with_config(cfg).build().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Server initialization failed: {e}");
            std::process::exit(2);
        }
    };

    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
        std::process::exit(1);
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: PUSHHUB_CONFIG
/// 3. Default: pushhub.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config"
            && let Some(path) = args.next()
        {
            return (path, ConfigSource::CliArgument);
        }
    }

    if let Ok(path) = env::var("PUSHHUB_CONFIG")
        && !path.is_empty()
    {
        return (path, ConfigSource::EnvironmentVariable);
    }

    ("pushhub.toml".to_string(), ConfigSource::Default)
}
