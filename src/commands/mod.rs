pub mod classify;
pub mod doctor;
pub mod status;
pub mod up;

use clap::ArgMatches;
use docqc_runtime::config::{Config, ConfigError, LogFormat, LoggingConfig};
use std::path::Path;

/// Load configuration from `--config` (if given) and the environment.
pub fn load_config(matches: &ArgMatches) -> Result<Config, ConfigError> {
    let path = matches.get_one::<String>("config").map(Path::new);
    Config::load(path)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(e) = result {
        eprintln!("⚠️  Logging already initialised: {}", e);
    }
}
